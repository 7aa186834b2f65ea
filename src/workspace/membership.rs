use std::collections::BTreeSet;

use super::notifications::NotificationKind;
use super::state::Container;
use super::stats::{UserMetric, WorkspaceMetric};
use super::validation::validate_channel_name;
use super::{Workspace, WorkspaceState};
use crate::error::{Error, Result};
use crate::types::*;

impl WorkspaceState {
    pub(crate) fn channel(&self, id: ChannelId) -> Result<&Channel> {
        self.channels
            .get(&id)
            .ok_or_else(|| Error::invalid(format!("Unknown channel {id}")))
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        self.channels
            .get_mut(&id)
            .ok_or_else(|| Error::invalid(format!("Unknown channel {id}")))
    }

    fn dm(&self, id: DmId) -> Result<&Dm> {
        self.dms
            .get(&id)
            .ok_or_else(|| Error::invalid(format!("Unknown DM {id}")))
    }

    /// Resolves a container and requires `caller` to belong to it.
    /// Unknown containers are `InvalidArgument`, non-members `Forbidden`.
    pub(crate) fn member_container(
        &self,
        caller: UserId,
        target: ContainerRef,
    ) -> Result<&dyn Container> {
        let container = match target {
            ContainerRef::Channel(id) => self.channel(id)? as &dyn Container,
            ContainerRef::Dm(id) => self.dm(id)? as &dyn Container,
        };
        if !container.is_member(caller) {
            return Err(Error::forbidden("Not a member of this conversation"));
        }
        Ok(container)
    }

    fn brief_channels(&self, filter: impl Fn(&Channel) -> bool) -> Vec<ChannelBrief> {
        self.channels
            .values()
            .filter(|c| filter(c))
            .map(|c| ChannelBrief {
                channel_id: c.channel_id,
                name: c.name.clone(),
            })
            .collect()
    }
}

impl Workspace {
    // Channels

    pub fn create_channel(&self, owner: UserId, name: &str, is_public: bool) -> Result<ChannelId> {
        validate_channel_name(name)?;
        let now = self.now();

        let mut state = self.lock();
        state.require_actor(owner)?;

        let channel_id = state.allocate_channel_id();
        state.channels.insert(
            channel_id,
            Channel {
                channel_id,
                name: name.to_string(),
                is_public,
                owner_members: vec![owner],
                all_members: vec![owner],
                messages: Vec::new(),
            },
        );
        state.record_user(owner, UserMetric::ChannelsJoined, 1, now);
        state.record_workspace(WorkspaceMetric::ChannelsExist, 1, now);

        tracing::info!("Channel {} ({}) created by {}", channel_id, name, owner);
        Ok(channel_id)
    }

    /// Channels the caller belongs to.
    pub fn channels_list(&self, caller: UserId) -> Result<Vec<ChannelBrief>> {
        let state = self.lock();
        state.require_actor(caller)?;
        Ok(state.brief_channels(|c| c.is_member(caller)))
    }

    /// Every channel, public or private.
    pub fn channels_list_all(&self, caller: UserId) -> Result<Vec<ChannelBrief>> {
        let state = self.lock();
        state.require_actor(caller)?;
        Ok(state.brief_channels(|_| true))
    }

    pub fn channel_details(&self, caller: UserId, channel_id: ChannelId) -> Result<ChannelDetails> {
        let state = self.lock();
        state.require_actor(caller)?;

        let channel = state.channel(channel_id)?;
        if !channel.is_member(caller) {
            return Err(Error::forbidden("Not a member of this channel"));
        }

        Ok(ChannelDetails {
            name: channel.name.clone(),
            is_public: channel.is_public,
            owner_members: state.profiles(&channel.owner_members),
            all_members: state.profiles(&channel.all_members),
        })
    }

    pub fn join_channel(&self, user: UserId, channel_id: ChannelId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        let tier = state.require_actor(user)?.tier;

        let channel = state.channel(channel_id)?;
        if channel.is_member(user) {
            return Err(Error::conflict("Already a member of this channel"));
        }
        if !may_join(tier, channel.is_public) {
            return Err(Error::forbidden("Channel is private"));
        }

        state.channel_mut(channel_id)?.all_members.push(user);
        state.record_user(user, UserMetric::ChannelsJoined, 1, now);

        tracing::debug!("User {} joined channel {}", user, channel_id);
        Ok(())
    }

    /// Adds `invitee` to a channel regardless of its visibility.
    pub fn invite(&self, inviter: UserId, channel_id: ChannelId, invitee: UserId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(inviter)?;

        let channel = state.channel(channel_id)?;
        if state.live_user(invitee).is_none() {
            return Err(Error::invalid(format!("Unknown user {invitee}")));
        }
        if channel.is_member(invitee) {
            return Err(Error::invalid("User is already a member of this channel"));
        }
        if !channel.is_member(inviter) {
            return Err(Error::forbidden("Not a member of this channel"));
        }

        state.channel_mut(channel_id)?.all_members.push(invitee);
        state.record_user(invitee, UserMetric::ChannelsJoined, 1, now);
        state.notify(
            invitee,
            inviter,
            ContainerRef::Channel(channel_id),
            NotificationKind::Added,
        );

        tracing::debug!("User {} invited {} to channel {}", inviter, invitee, channel_id);
        Ok(())
    }

    /// Leaves a channel. The last owner may leave; the channel lives on ownerless.
    pub fn leave_channel(&self, user: UserId, channel_id: ChannelId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(user)?;

        let channel = state.channel_mut(channel_id)?;
        if !channel.is_member(user) {
            return Err(Error::forbidden("Not a member of this channel"));
        }
        channel.remove_member(user);
        state.record_user(user, UserMetric::ChannelsJoined, -1, now);
        Ok(())
    }

    pub fn add_owner(&self, actor: UserId, channel_id: ChannelId, target: UserId) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(actor)?;

        let channel = state.channel(channel_id)?;
        if state.live_user(target).is_none() {
            return Err(Error::invalid(format!("Unknown user {target}")));
        }
        if !channel.is_member(target) {
            return Err(Error::invalid("User is not a member of this channel"));
        }
        if channel.is_owner(target) {
            return Err(Error::conflict("User is already an owner of this channel"));
        }
        if !state.has_owner_permission(actor, ContainerRef::Channel(channel_id)) {
            return Err(Error::forbidden("Channel owner permission required"));
        }

        state.channel_mut(channel_id)?.owner_members.push(target);
        Ok(())
    }

    pub fn remove_owner(&self, actor: UserId, channel_id: ChannelId, target: UserId) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(actor)?;

        let channel = state.channel(channel_id)?;
        if state.live_user(target).is_none() {
            return Err(Error::invalid(format!("Unknown user {target}")));
        }
        if !channel.is_owner(target) {
            return Err(Error::invalid("User is not an owner of this channel"));
        }
        if channel.owner_members.len() == 1 {
            return Err(Error::conflict("Cannot remove the only channel owner"));
        }
        if !state.has_owner_permission(actor, ContainerRef::Channel(channel_id)) {
            return Err(Error::forbidden("Channel owner permission required"));
        }

        state
            .channel_mut(channel_id)?
            .owner_members
            .retain(|u| *u != target);
        Ok(())
    }

    // DMs

    /// Creates a DM between `owner` and `members`. The name is the sorted,
    /// comma-separated handles of everyone present at creation and never changes.
    pub fn create_dm(&self, owner: UserId, members: &[UserId]) -> Result<DmId> {
        let now = self.now();
        let mut state = self.lock();

        if let Some(unknown) = members.iter().find(|u| state.live_user(**u).is_none()) {
            return Err(Error::invalid(format!("Unknown user {unknown}")));
        }
        state.require_actor(owner)?;

        let mut all_members = Vec::with_capacity(members.len() + 1);
        all_members.push(owner);
        all_members.extend_from_slice(members);
        let distinct: BTreeSet<UserId> = all_members.iter().copied().collect();
        if distinct.len() != all_members.len() {
            return Err(Error::invalid("Duplicate members in DM"));
        }

        let mut handles: Vec<String> = all_members.iter().map(|u| state.handle_of(*u)).collect();
        handles.sort();
        let name = handles.join(", ");

        let dm_id = state.allocate_dm_id();
        state.dms.insert(
            dm_id,
            Dm {
                dm_id,
                name: name.clone(),
                creator: owner,
                owner_members: vec![owner],
                all_members: all_members.clone(),
                messages: Vec::new(),
            },
        );

        for member in members {
            state.notify(*member, owner, ContainerRef::Dm(dm_id), NotificationKind::Added);
        }
        for member in &all_members {
            state.record_user(*member, UserMetric::DmsJoined, 1, now);
        }
        state.record_workspace(WorkspaceMetric::DmsExist, 1, now);

        tracing::info!("DM {} ({}) created by {}", dm_id, name, owner);
        Ok(dm_id)
    }

    pub fn dm_list(&self, caller: UserId) -> Result<Vec<DmBrief>> {
        let state = self.lock();
        state.require_actor(caller)?;

        Ok(state
            .dms
            .values()
            .filter(|d| d.is_member(caller))
            .map(|d| DmBrief {
                dm_id: d.dm_id,
                name: d.name.clone(),
            })
            .collect())
    }

    pub fn dm_details(&self, caller: UserId, dm_id: DmId) -> Result<DmDetails> {
        let state = self.lock();
        state.require_actor(caller)?;

        let dm = state.dm(dm_id)?;
        if !dm.is_member(caller) {
            return Err(Error::invalid("Not a member of this DM"));
        }

        Ok(DmDetails {
            name: dm.name.clone(),
            members: state.profiles(&dm.all_members),
        })
    }

    /// Leaves a DM. The name is kept even though the member set shrinks.
    pub fn leave_dm(&self, user: UserId, dm_id: DmId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(user)?;

        let dm = state
            .dms
            .get_mut(&dm_id)
            .ok_or_else(|| Error::invalid(format!("Unknown DM {dm_id}")))?;
        if !dm.is_member(user) {
            return Err(Error::invalid("Not a member of this DM"));
        }
        dm.remove_member(user);
        state.record_user(user, UserMetric::DmsJoined, -1, now);
        Ok(())
    }

    /// Deletes a DM and its messages. Only the creator, while still a member,
    /// may do this. Pending deliveries into the DM are voided at fire time.
    pub fn remove_dm(&self, actor: UserId, dm_id: DmId) -> Result<()> {
        let now = self.now();
        let mut state = self.lock();
        state.require_actor(actor)?;

        let dm = state.dm(dm_id)?;
        if !dm.is_member(actor) {
            return Err(Error::invalid("Not a member of this DM"));
        }
        if !has_dm_owner_permission(dm.is_owner(actor)) {
            return Err(Error::invalid("Only the DM creator may remove it"));
        }

        let Some(dm) = state.dms.remove(&dm_id) else {
            return Ok(());
        };
        let message_count = dm.messages.len() as i64;
        state.forget_messages(dm.messages.iter().map(|m| m.message_id));

        for member in &dm.all_members {
            state.record_user(*member, UserMetric::DmsJoined, -1, now);
        }
        state.record_workspace(WorkspaceMetric::DmsExist, -1, now);
        if message_count > 0 {
            state.record_workspace(WorkspaceMetric::MessagesExist, -message_count, now);
        }

        tracing::info!("DM {} removed by {}", dm_id, actor);
        Ok(())
    }
}
