use std::time::Duration;

use super::state::Container;
use super::validation::{validate_message_body, validate_message_max};
use super::{Workspace, WorkspaceState};
use crate::error::{Error, Result};
use crate::types::*;

impl WorkspaceState {
    fn active_standup(&self, channel_id: ChannelId) -> Option<&Standup> {
        self.standups.get(&channel_id)
    }
}

impl Workspace {
    /// Accepts a message for delivery at `time_sent` and returns its id at
    /// once. The message appears in the conversation only when the time comes,
    /// and only if the conversation still exists then.
    pub fn send_later(
        &self,
        author: UserId,
        target: ContainerRef,
        body: &str,
        time_sent: i64,
    ) -> Result<MessageId> {
        let now = self.now();
        let message_id = {
            let mut state = self.lock();
            state.require_actor(author)?;

            if state.container(target).is_none() {
                return Err(Error::invalid("Unknown conversation"));
            }
            validate_message_body(body)?;
            if time_sent <= now {
                return Err(Error::invalid("Delivery time must be in the future"));
            }
            state.member_container(author, target)?;

            let message_id = state.allocate_message_id();
            state.pending.insert(
                message_id,
                PendingDelivery {
                    message_id,
                    author,
                    target,
                    body: body.to_string(),
                    deliver_at: time_sent,
                },
            );
            message_id
        };

        self.arm_delivery(message_id, time_sent, time_sent - now);
        tracing::debug!("Message {} scheduled for {}", message_id, time_sent);
        Ok(message_id)
    }

    /// Opens a standup in a channel and returns its finish time.
    pub fn standup_start(&self, user: UserId, channel_id: ChannelId, length: i64) -> Result<i64> {
        let now = self.now();
        let time_finish = {
            let mut state = self.lock();
            state.require_actor(user)?;

            let channel = state.channel(channel_id)?;
            if length < 0 {
                return Err(Error::invalid("Standup length cannot be negative"));
            }
            if state.active_standup(channel_id).is_some() {
                return Err(Error::invalid("A standup is already active in this channel"));
            }
            if !channel.is_member(user) {
                return Err(Error::forbidden("Not a member of this channel"));
            }

            let time_finish = now
                .checked_add(length)
                .ok_or_else(|| Error::invalid("Standup length is too large"))?;
            if length == 0 {
                return Ok(time_finish);
            }
            state.standups.insert(
                channel_id,
                Standup {
                    channel_id,
                    starter: user,
                    time_finish,
                    buffer: String::new(),
                },
            );
            time_finish
        };

        self.arm_standup(channel_id, time_finish, length);
        tracing::info!("Standup started in channel {} until {}", channel_id, time_finish);
        Ok(time_finish)
    }

    /// Buffers one line for the channel's active standup digest.
    pub fn standup_send(&self, user: UserId, channel_id: ChannelId, line: &str) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(user)?;

        let channel = state.channel(channel_id)?;
        validate_message_max(line)?;
        if state.active_standup(channel_id).is_none() {
            return Err(Error::invalid("No standup is active in this channel"));
        }
        if !channel.is_member(user) {
            return Err(Error::forbidden("Not a member of this channel"));
        }

        let handle = state.handle_of(user);
        if let Some(standup) = state.standups.get_mut(&channel_id) {
            standup.buffer.push_str(&format!("{handle}: {line}\n"));
        }
        Ok(())
    }

    pub fn standup_active(&self, user: UserId, channel_id: ChannelId) -> Result<StandupStatus> {
        let state = self.lock();
        state.require_actor(user)?;

        let channel = state.channel(channel_id)?;
        if !channel.is_member(user) {
            return Err(Error::forbidden("Not a member of this channel"));
        }

        Ok(match state.active_standup(channel_id) {
            Some(standup) => StandupStatus {
                is_active: true,
                time_finish: Some(standup.time_finish),
            },
            None => StandupStatus {
                is_active: false,
                time_finish: None,
            },
        })
    }

    /// Materializes the pending delivery `message_id` scheduled for
    /// `deliver_at`. Returns false if it was already delivered or cancelled,
    /// if the id now belongs to a different delivery, or if its conversation
    /// no longer exists.
    pub fn fire_delivery(&self, message_id: MessageId, deliver_at: i64) -> bool {
        let now = self.now();
        let mut state = self.lock();

        let matches = state
            .pending
            .get(&message_id)
            .is_some_and(|d| d.deliver_at == deliver_at);
        if !matches {
            return false;
        }
        let Some(delivery) = state.pending.remove(&message_id) else {
            return false;
        };

        let body = delivery.body.clone();
        let delivered = state.post_message(
            delivery.message_id,
            delivery.author,
            delivery.target,
            delivery.body,
            delivery.deliver_at,
            Some(&body),
            now,
        );
        if delivered {
            tracing::info!("Delivered scheduled message {}", message_id);
        } else {
            tracing::debug!(
                "Dropped scheduled message {}: conversation no longer exists",
                message_id
            );
        }
        delivered
    }

    /// Closes the channel's standup if it is the one finishing at
    /// `time_finish`, posting the digest when any lines were buffered.
    pub fn finish_standup(&self, channel_id: ChannelId, time_finish: i64) -> Option<MessageId> {
        let now = self.now();
        let mut state = self.lock();

        let matches = state
            .active_standup(channel_id)
            .is_some_and(|s| s.time_finish == time_finish);
        if !matches {
            return None;
        }
        let standup = state.standups.remove(&channel_id)?;

        let digest = standup.buffer.trim_end_matches('\n');
        if digest.is_empty() {
            tracing::debug!("Standup in channel {} finished with no lines", channel_id);
            return None;
        }

        let message_id = state.allocate_message_id();
        let posted = state.post_message(
            message_id,
            standup.starter,
            ContainerRef::Channel(channel_id),
            digest.to_string(),
            standup.time_finish,
            None,
            now,
        );

        tracing::info!("Standup in channel {} posted digest {}", channel_id, message_id);
        posted.then_some(message_id)
    }

    /// Fires every delivery and standup whose time has come. Returns how many
    /// messages were materialized.
    pub fn deliver_due(&self) -> usize {
        let now = self.now();
        let (deliveries, standups): (Vec<(MessageId, i64)>, Vec<(ChannelId, i64)>) = {
            let state = self.lock();
            (
                state
                    .pending
                    .values()
                    .filter(|d| d.deliver_at <= now)
                    .map(|d| (d.message_id, d.deliver_at))
                    .collect(),
                state
                    .standups
                    .values()
                    .filter(|s| s.time_finish <= now)
                    .map(|s| (s.channel_id, s.time_finish))
                    .collect(),
            )
        };

        let delivered = deliveries
            .into_iter()
            .filter(|(id, deliver_at)| self.fire_delivery(*id, *deliver_at))
            .count();
        let digests = standups
            .into_iter()
            .filter_map(|(channel_id, finish)| self.finish_standup(channel_id, finish))
            .count();
        delivered + digests
    }

    /// Arms timers for everything pending in the state tree, typically after
    /// loading a snapshot. Overdue work fires immediately.
    pub fn rearm(&self) {
        let now = self.now();
        let (deliveries, standups): (Vec<(MessageId, i64)>, Vec<(ChannelId, i64)>) = {
            let state = self.lock();
            (
                state
                    .pending
                    .values()
                    .map(|d| (d.message_id, d.deliver_at))
                    .collect(),
                state
                    .standups
                    .values()
                    .map(|s| (s.channel_id, s.time_finish))
                    .collect(),
            )
        };

        for (message_id, deliver_at) in &deliveries {
            self.arm_delivery(*message_id, *deliver_at, deliver_at - now);
        }
        for (channel_id, time_finish) in &standups {
            self.arm_standup(*channel_id, *time_finish, time_finish - now);
        }
        tracing::info!(
            "Re-armed {} scheduled messages and {} standups",
            deliveries.len(),
            standups.len()
        );
    }

    fn arm_delivery(&self, message_id: MessageId, deliver_at: i64, delay_secs: i64) {
        self.spawn_after(delay_secs, move |workspace| {
            workspace.fire_delivery(message_id, deliver_at);
        });
    }

    fn arm_standup(&self, channel_id: ChannelId, time_finish: i64, delay_secs: i64) {
        self.spawn_after(delay_secs, move |workspace| {
            workspace.finish_standup(channel_id, time_finish);
        });
    }

    /// One-shot timer. Without a runtime the work stays pending until
    /// `deliver_due` or `rearm` picks it up.
    fn spawn_after<F>(&self, delay_secs: i64, task: F)
    where
        F: FnOnce(Workspace) + Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available; scheduled work left pending");
            return;
        };

        let workspace = self.clone();
        let delay = Duration::from_secs(u64::try_from(delay_secs).unwrap_or(0));
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task(workspace);
        });
    }
}
