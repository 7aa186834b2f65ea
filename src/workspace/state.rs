use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::*;

/// The single authoritative state tree. Every workspace operation runs as one
/// critical section over this value; it serializes verbatim for snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Live users and tombstones. Tombstones keep their id and have no tier.
    pub users: BTreeMap<UserId, User>,
    /// Session token digest -> user.
    pub sessions: BTreeMap<String, UserId>,
    /// Reset code -> email.
    pub reset_codes: BTreeMap<String, String>,
    pub channels: BTreeMap<ChannelId, Channel>,
    pub dms: BTreeMap<DmId, Dm>,
    pub standups: BTreeMap<ChannelId, Standup>,
    /// Per-user notifications, oldest first.
    pub notifications: BTreeMap<UserId, Vec<Notification>>,
    pub pending: BTreeMap<MessageId, PendingDelivery>,
    pub workspace_stats: WorkspaceStats,
    pub next_user_id: UserId,
    pub next_channel_id: ChannelId,
    pub next_dm_id: DmId,
    pub next_message_id: MessageId,

    #[serde(skip)]
    message_index: HashMap<MessageId, ContainerRef>,
}

/// Shared view over the two container kinds.
pub(crate) trait Container {
    fn name(&self) -> &str;
    fn owners(&self) -> &[UserId];
    fn members(&self) -> &[UserId];
    fn messages(&self) -> &[Message];
    fn messages_mut(&mut self) -> &mut Vec<Message>;
    fn owners_mut(&mut self) -> &mut Vec<UserId>;
    fn members_mut(&mut self) -> &mut Vec<UserId>;

    /// Drops `user` from both the owner and member sets.
    fn remove_member(&mut self, user: UserId) {
        self.owners_mut().retain(|u| *u != user);
        self.members_mut().retain(|u| *u != user);
    }

    fn is_member(&self, user: UserId) -> bool {
        self.members().contains(&user)
    }

    fn is_owner(&self, user: UserId) -> bool {
        self.owners().contains(&user)
    }
}

impl Container for Channel {
    fn name(&self) -> &str {
        &self.name
    }
    fn owners_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.owner_members
    }
    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.all_members
    }
    fn owners(&self) -> &[UserId] {
        &self.owner_members
    }
    fn members(&self) -> &[UserId] {
        &self.all_members
    }
    fn messages(&self) -> &[Message] {
        &self.messages
    }
    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
}

impl Container for Dm {
    fn name(&self) -> &str {
        &self.name
    }
    fn owners_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.owner_members
    }
    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.all_members
    }
    fn owners(&self) -> &[UserId] {
        &self.owner_members
    }
    fn members(&self) -> &[UserId] {
        &self.all_members
    }
    fn messages(&self) -> &[Message] {
        &self.messages
    }
    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
}

impl WorkspaceState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_user_id: 1,
            next_channel_id: 1,
            next_dm_id: 1,
            next_message_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds derived lookup structures after deserialization.
    pub fn rebuild_index(&mut self) {
        self.message_index.clear();
        for (id, channel) in &self.channels {
            for message in &channel.messages {
                self.message_index
                    .insert(message.message_id, ContainerRef::Channel(*id));
            }
        }
        for (id, dm) in &self.dms {
            for message in &dm.messages {
                self.message_index
                    .insert(message.message_id, ContainerRef::Dm(*id));
            }
        }
    }

    pub(crate) fn allocate_user_id(&mut self) -> UserId {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id
    }

    pub(crate) fn allocate_channel_id(&mut self) -> ChannelId {
        let id = self.next_channel_id;
        self.next_channel_id += 1;
        id
    }

    pub(crate) fn allocate_dm_id(&mut self) -> DmId {
        let id = self.next_dm_id;
        self.next_dm_id += 1;
        id
    }

    pub(crate) fn allocate_message_id(&mut self) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    // Users

    pub(crate) fn live_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id).filter(|u| !u.is_removed())
    }

    pub(crate) fn live_users(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_removed())
    }

    pub(crate) fn user_by_email(&self, email: &str) -> Option<&User> {
        self.live_users().find(|u| u.email == email)
    }

    pub(crate) fn user_by_handle(&self, handle: &str) -> Option<&User> {
        self.live_users().find(|u| u.handle_str == handle)
    }

    pub(crate) fn tier_of(&self, id: UserId) -> Option<Tier> {
        self.live_user(id).and_then(|u| u.tier)
    }

    pub(crate) fn elevated_count(&self) -> usize {
        self.live_users().filter(|u| u.is_elevated()).count()
    }

    /// Fails `Forbidden` unless `id` names a live user.
    pub(crate) fn require_actor(&self, id: UserId) -> Result<&User> {
        self.live_user(id)
            .ok_or_else(|| Error::forbidden("invalid session"))
    }

    pub(crate) fn handle_of(&self, id: UserId) -> String {
        self.users
            .get(&id)
            .map(|u| u.handle_str.clone())
            .unwrap_or_default()
    }

    pub(crate) fn profiles(&self, ids: &[UserId]) -> Vec<UserProfile> {
        ids.iter()
            .filter_map(|id| self.users.get(id))
            .map(User::profile)
            .collect()
    }

    // Containers

    pub(crate) fn container(&self, target: ContainerRef) -> Option<&dyn Container> {
        match target {
            ContainerRef::Channel(id) => self.channels.get(&id).map(|c| c as &dyn Container),
            ContainerRef::Dm(id) => self.dms.get(&id).map(|d| d as &dyn Container),
        }
    }

    pub(crate) fn container_mut(&mut self, target: ContainerRef) -> Option<&mut dyn Container> {
        match target {
            ContainerRef::Channel(id) => self
                .channels
                .get_mut(&id)
                .map(|c| c as &mut dyn Container),
            ContainerRef::Dm(id) => self.dms.get_mut(&id).map(|d| d as &mut dyn Container),
        }
    }

    pub(crate) fn is_member(&self, user: UserId, target: ContainerRef) -> bool {
        self.container(target).is_some_and(|c| c.is_member(user))
    }

    /// Owner permission inside a container. Channels also grant it to
    /// elevated-tier members; DMs only to their owner.
    pub(crate) fn has_owner_permission(&self, user: UserId, target: ContainerRef) -> bool {
        let Some(container) = self.container(target) else {
            return false;
        };
        match target {
            ContainerRef::Channel(_) => has_channel_owner_permission(
                self.tier_of(user),
                container.is_owner(user),
                container.is_member(user),
            ),
            ContainerRef::Dm(_) => has_dm_owner_permission(container.is_owner(user)),
        }
    }

    pub(crate) fn container_name(&self, target: ContainerRef) -> String {
        self.container(target)
            .map(|c| c.name().to_string())
            .unwrap_or_default()
    }

    // Messages

    pub(crate) fn locate_message(&self, id: MessageId) -> Option<ContainerRef> {
        self.message_index.get(&id).copied()
    }

    /// Finds a message in a container the caller currently belongs to.
    pub(crate) fn reachable_message(
        &self,
        caller: UserId,
        id: MessageId,
    ) -> Option<(ContainerRef, &Message)> {
        let target = self.locate_message(id)?;
        let container = self.container(target)?;
        if !container.is_member(caller) {
            return None;
        }
        container
            .messages()
            .iter()
            .find(|m| m.message_id == id)
            .map(|m| (target, m))
    }

    pub(crate) fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let target = self.locate_message(id)?;
        self.container_mut(target)?
            .messages_mut()
            .iter_mut()
            .find(|m| m.message_id == id)
    }

    pub(crate) fn insert_message(&mut self, target: ContainerRef, message: Message) -> bool {
        let id = message.message_id;
        let Some(container) = self.container_mut(target) else {
            return false;
        };
        container.messages_mut().push(message);
        self.message_index.insert(id, target);
        true
    }

    pub(crate) fn delete_message(&mut self, id: MessageId) -> Option<Message> {
        let target = self.message_index.remove(&id)?;
        let messages = self.container_mut(target)?.messages_mut();
        let pos = messages.iter().position(|m| m.message_id == id)?;
        Some(messages.remove(pos))
    }

    pub(crate) fn forget_messages(&mut self, ids: impl IntoIterator<Item = MessageId>) {
        for id in ids {
            self.message_index.remove(&id);
        }
    }
}
