use std::cmp::Reverse;

use super::notifications::NotificationKind;
use super::state::Container;
use super::stats::{UserMetric, WorkspaceMetric};
use super::validation::{MAX_MESSAGE_LEN, validate_message_body, validate_message_max};
use super::{Workspace, WorkspaceState};
use crate::error::{Error, Result};
use crate::types::*;

pub const PAGE_SIZE: usize = 50;

/// Text inserted between the original body and the extra text of a share.
const SHARE_SEPARATOR: &str = "\nReply:";

fn unknown_message() -> Error {
    Error::invalid("Message not found in any conversation you belong to")
}

impl WorkspaceState {
    /// Materializes a message into `target` and records its statistics.
    /// Tag notifications are raised from `tag_source` only; `None` skips them.
    /// Returns false if the container no longer exists.
    pub(crate) fn post_message(
        &mut self,
        message_id: MessageId,
        author: UserId,
        target: ContainerRef,
        body: String,
        time_sent: i64,
        tag_source: Option<&str>,
        now: i64,
    ) -> bool {
        let stored = body.clone();
        if !self.insert_message(target, Message::new(message_id, author, body, time_sent)) {
            return false;
        }

        self.record_workspace(WorkspaceMetric::MessagesExist, 1, now);
        self.record_user(author, UserMetric::MessagesSent, 1, now);
        if let Some(source) = tag_source {
            self.notify_tags(author, target, source, &stored);
        }
        true
    }

    fn discard_message(&mut self, message_id: MessageId, now: i64) {
        if self.delete_message(message_id).is_some() {
            self.record_workspace(WorkspaceMetric::MessagesExist, -1, now);
        }
    }

    /// Finds a message the caller can reach and checks they may modify it:
    /// its author, or a holder of owner permission in its container.
    fn editable_message(&self, caller: UserId, message_id: MessageId) -> Result<ContainerRef> {
        let (target, message) = self
            .reachable_message(caller, message_id)
            .ok_or_else(unknown_message)?;
        if message.u_id != caller && !self.has_owner_permission(caller, target) {
            return Err(Error::forbidden(
                "Only the author or a conversation owner may change this message",
            ));
        }
        Ok(target)
    }
}

impl Workspace {
    /// Sends a message to a channel or DM the author belongs to.
    pub fn send(&self, author: UserId, target: ContainerRef, body: &str) -> Result<MessageId> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(author)?;

        if state.container(target).is_none() {
            return Err(Error::invalid("Unknown conversation"));
        }
        validate_message_body(body)?;
        state.member_container(author, target)?;

        let message_id = state.allocate_message_id();
        state.post_message(
            message_id,
            author,
            target,
            body.to_string(),
            now,
            Some(body),
            now,
        );
        Ok(message_id)
    }

    /// Replaces a message body. An empty body deletes the message.
    pub fn edit(&self, actor: UserId, message_id: MessageId, new_body: &str) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(actor)?;

        validate_message_max(new_body)?;
        let target = state.editable_message(actor, message_id)?;

        if new_body.is_empty() {
            state.discard_message(message_id, now);
            return Ok(());
        }

        if let Some(message) = state.message_mut(message_id) {
            message.message = new_body.to_string();
        }
        state.notify_tags(actor, target, new_body, new_body);
        Ok(())
    }

    pub fn remove(&self, actor: UserId, message_id: MessageId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(actor)?;

        state.editable_message(actor, message_id)?;
        state.discard_message(message_id, now);
        Ok(())
    }

    /// Up to 50 messages, newest first, starting `start` messages from the newest.
    pub fn messages(&self, caller: UserId, target: ContainerRef, start: i64) -> Result<MessagePage> {
        let state = self.lock();
        state.require_actor(caller)?;

        let container = state
            .container(target)
            .ok_or_else(|| Error::invalid("Unknown conversation"))?;
        let total = container.messages().len();
        let offset = usize::try_from(start)
            .ok()
            .filter(|s| *s <= total)
            .ok_or_else(|| Error::invalid(format!("Start {start} is out of range")))?;
        if !container.is_member(caller) {
            return Err(Error::forbidden("Not a member of this conversation"));
        }

        let mut ordered: Vec<&Message> = container.messages().iter().collect();
        ordered.sort_by_key(|m| Reverse(m.time_sent));

        let messages = ordered
            .into_iter()
            .skip(offset)
            .take(PAGE_SIZE)
            .map(|m| m.view_for(caller))
            .collect();
        let end = if offset + PAGE_SIZE >= total {
            -1
        } else {
            start + PAGE_SIZE as i64
        };

        Ok(MessagePage {
            messages,
            start,
            end,
        })
    }

    pub fn react(&self, user: UserId, message_id: MessageId, react_id: i64) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(user)?;

        let (target, message) = state
            .reachable_message(user, message_id)
            .ok_or_else(unknown_message)?;
        if react_id != THUMBS_UP_REACT_ID {
            return Err(Error::invalid(format!("Invalid react id {react_id}")));
        }
        let already = message
            .reacts
            .iter()
            .any(|r| r.react_id == react_id && r.u_ids.contains(&user));
        if already {
            return Err(Error::invalid("Already reacted to this message"));
        }
        let author = message.u_id;

        if let Some(message) = state.message_mut(message_id) {
            match message.reacts.iter_mut().find(|r| r.react_id == react_id) {
                Some(react) => react.u_ids.push(user),
                None => message.reacts.push(React {
                    react_id,
                    u_ids: vec![user],
                }),
            }
        }

        if state.is_member(author, target) {
            state.notify(author, user, target, NotificationKind::Reacted);
        }
        Ok(())
    }

    pub fn unreact(&self, user: UserId, message_id: MessageId, react_id: i64) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(user)?;

        let (_, message) = state
            .reachable_message(user, message_id)
            .ok_or_else(unknown_message)?;
        if react_id != THUMBS_UP_REACT_ID {
            return Err(Error::invalid(format!("Invalid react id {react_id}")));
        }
        let reacted = message
            .reacts
            .iter()
            .any(|r| r.react_id == react_id && r.u_ids.contains(&user));
        if !reacted {
            return Err(Error::invalid("No reaction to remove"));
        }

        if let Some(message) = state.message_mut(message_id) {
            for react in message.reacts.iter_mut().filter(|r| r.react_id == react_id) {
                react.u_ids.retain(|u| *u != user);
            }
            message.reacts.retain(|r| !r.u_ids.is_empty());
        }
        Ok(())
    }

    pub fn pin(&self, user: UserId, message_id: MessageId) -> Result<()> {
        self.set_pinned(user, message_id, true)
    }

    pub fn unpin(&self, user: UserId, message_id: MessageId) -> Result<()> {
        self.set_pinned(user, message_id, false)
    }

    fn set_pinned(&self, user: UserId, message_id: MessageId, pinned: bool) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(user)?;

        let (target, message) = state
            .reachable_message(user, message_id)
            .ok_or_else(unknown_message)?;
        if message.is_pinned == pinned {
            let current = if pinned { "pinned" } else { "unpinned" };
            return Err(Error::invalid(format!("Message is already {current}")));
        }
        if !state.has_owner_permission(user, target) {
            return Err(Error::forbidden("Conversation owner permission required"));
        }

        if let Some(message) = state.message_mut(message_id) {
            message.is_pinned = pinned;
        }
        Ok(())
    }

    /// Copies a reachable message into a channel (`dm_id == -1`) or a DM
    /// (`channel_id == -1`), followed by optional extra text. Only the extra
    /// text is scanned for tags.
    pub fn share(
        &self,
        user: UserId,
        og_message_id: MessageId,
        extra: &str,
        channel_id: ChannelId,
        dm_id: DmId,
    ) -> Result<MessageId> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(user)?;

        if !state.channels.contains_key(&channel_id) && !state.dms.contains_key(&dm_id) {
            return Err(Error::invalid("Both channel and DM ids are invalid"));
        }
        if channel_id != NO_CONTAINER && dm_id != NO_CONTAINER {
            return Err(Error::invalid("One of channel or DM id must be -1"));
        }
        validate_message_max(extra)?;
        let original = state
            .reachable_message(user, og_message_id)
            .map(|(_, m)| m.message.clone())
            .ok_or_else(unknown_message)?;

        let target = if channel_id == NO_CONTAINER {
            ContainerRef::Dm(dm_id)
        } else {
            ContainerRef::Channel(channel_id)
        };
        state.member_container(user, target)?;

        let message_id = state.allocate_message_id();
        state.post_message(
            message_id,
            user,
            target,
            format!("{original}{SHARE_SEPARATOR}{extra}"),
            now,
            Some(extra),
            now,
        );
        Ok(message_id)
    }

    /// Case-insensitive substring search over every conversation the caller belongs to.
    pub fn search(&self, caller: UserId, query: &str) -> Result<Vec<MessageView>> {
        let state = self.lock();
        state.require_actor(caller)?;

        let len = query.chars().count();
        if len == 0 || len > MAX_MESSAGE_LEN {
            return Err(Error::invalid(format!(
                "Query must be between 1 and {MAX_MESSAGE_LEN} characters"
            )));
        }
        let needle = query.to_lowercase();

        let channel_messages = state
            .channels
            .values()
            .filter(|c| c.all_members.contains(&caller))
            .flat_map(|c| c.messages.iter());
        let dm_messages = state
            .dms
            .values()
            .filter(|d| d.all_members.contains(&caller))
            .flat_map(|d| d.messages.iter());

        Ok(channel_messages
            .chain(dm_messages)
            .filter(|m| m.message.to_lowercase().contains(&needle))
            .map(|m| m.view_for(caller))
            .collect())
    }
}
