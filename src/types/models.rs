use serde::{Deserialize, Serialize};

use super::Tier;

pub type UserId = i64;
pub type ChannelId = i64;
pub type DmId = i64;
pub type MessageId = i64;

/// Sentinel for "no container" in share targets and notifications.
pub const NO_CONTAINER: i64 = -1;

pub const REMOVED_USER_MARKER: &str = "Removed user";
pub const REMOVED_NAME_FIRST: &str = "Removed";
pub const REMOVED_NAME_LAST: &str = "user";

/// The only reaction kind the workspace accepts.
pub const THUMBS_UP_REACT_ID: i64 = 1;

/// A registered user, or a tombstone once removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub u_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub tier: Option<Tier>,
    pub stats: UserStats,
    pub profile_img_url: String,
}

impl User {
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            u_id: self.u_id,
            email: self.email.clone(),
            name_first: self.name_first.clone(),
            name_last: self.name_last.clone(),
            handle_str: self.handle_str.clone(),
            profile_img_url: self.profile_img_url.clone(),
        }
    }

    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.tier.is_some_and(Tier::is_elevated)
    }

    /// Tombstones keep their id and history but hold no tier.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.tier.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub u_id: UserId,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub profile_img_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub auth_user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct React {
    pub react_id: i64,
    pub u_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    pub time_sent: i64,
    pub reacts: Vec<React>,
    pub is_pinned: bool,
}

impl Message {
    #[must_use]
    pub fn new(message_id: MessageId, u_id: UserId, message: String, time_sent: i64) -> Self {
        Self {
            message_id,
            u_id,
            message,
            time_sent,
            reacts: Vec::new(),
            is_pinned: false,
        }
    }

    /// Renders the message for a particular viewer, marking their own reactions.
    #[must_use]
    pub fn view_for(&self, viewer: UserId) -> MessageView {
        MessageView {
            message_id: self.message_id,
            u_id: self.u_id,
            message: self.message.clone(),
            time_sent: self.time_sent,
            reacts: self
                .reacts
                .iter()
                .map(|r| ReactView {
                    react_id: r.react_id,
                    u_ids: r.u_ids.clone(),
                    is_this_user_reacted: r.u_ids.contains(&viewer),
                })
                .collect(),
            is_pinned: self.is_pinned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactView {
    pub react_id: i64,
    pub u_ids: Vec<UserId>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    pub time_sent: i64,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<MessageView>,
    pub start: i64,
    /// `start + 50`, or -1 once the page reaches the oldest message.
    pub end: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub channel_id: ChannelId,
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dm {
    pub dm_id: DmId,
    pub name: String,
    pub creator: UserId,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    pub messages: Vec<Message>,
}

/// Identifies the container that owns a message sub-ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerRef {
    Channel(ChannelId),
    Dm(DmId),
}

impl ContainerRef {
    /// Returns the (channelId, dmId) pair with the sentinel in the unused slot.
    #[must_use]
    pub const fn id_pair(self) -> (ChannelId, DmId) {
        match self {
            ContainerRef::Channel(id) => (id, NO_CONTAINER),
            ContainerRef::Dm(id) => (NO_CONTAINER, id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBrief {
    pub channel_id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmBrief {
    pub dm_id: DmId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetails {
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserProfile>,
    pub all_members: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmDetails {
    pub name: String,
    pub members: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub channel_id: ChannelId,
    pub dm_id: DmId,
    pub notification_message: String,
}

/// An open standup buffering digest lines for one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standup {
    pub channel_id: ChannelId,
    pub starter: UserId,
    pub time_finish: i64,
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupStatus {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}

/// A message accepted by send-later that has not materialized yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDelivery {
    pub message_id: MessageId,
    pub author: UserId,
    pub target: ContainerRef,
    pub body: String,
    pub deliver_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatPoint {
    pub count: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub channels_joined: Vec<StatPoint>,
    pub dms_joined: Vec<StatPoint>,
    pub messages_sent: Vec<StatPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStats {
    pub channels_exist: Vec<StatPoint>,
    pub dms_exist: Vec<StatPoint>,
    pub messages_exist: Vec<StatPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsReport {
    pub channels_joined: Vec<StatPoint>,
    pub dms_joined: Vec<StatPoint>,
    pub messages_sent: Vec<StatPoint>,
    pub involvement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatsReport {
    pub channels_exist: Vec<StatPoint>,
    pub dms_exist: Vec<StatPoint>,
    pub messages_exist: Vec<StatPoint>,
    pub utilization_rate: f64,
}
