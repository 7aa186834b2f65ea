use super::state::Container;
use super::validation::{
    handle_base, validate_email, validate_handle, validate_password, validate_person_name,
};
use super::{Workspace, WorkspaceState};
use crate::error::{Error, Result};
use crate::types::*;

/// Used when a user's names contain no alphanumerics at all.
const FALLBACK_HANDLE_BASE: &str = "user";

impl WorkspaceState {
    /// Picks `base` if free among live users, else `base0`, `base1`, ...
    fn unique_handle(&self, base: &str) -> String {
        let base = if base.is_empty() {
            FALLBACK_HANDLE_BASE
        } else {
            base
        };
        if self.user_by_handle(base).is_none() {
            return base.to_string();
        }
        (0u64..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| self.user_by_handle(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn require_administrator(&self, actor: UserId) -> Result<()> {
        let actor = self.require_actor(actor)?;
        if !may_administer(actor.tier) {
            return Err(Error::forbidden("Workspace owner permission required"));
        }
        Ok(())
    }
}

impl Workspace {
    /// Registers a new user and signs them in.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name_first: &str,
        name_last: &str,
    ) -> Result<AuthSession> {
        validate_email(email)?;
        if self.lock().user_by_email(email).is_some() {
            return Err(Error::invalid("Email address already in use"));
        }
        validate_password(password)?;
        validate_person_name(name_first, "First name")?;
        validate_person_name(name_last, "Last name")?;

        let password_hash = self.hasher().hash(password)?;
        let now = self.now();

        let mut state = self.lock();
        // Re-check: another registration may have claimed the email while hashing.
        if state.user_by_email(email).is_some() {
            return Err(Error::invalid("Email address already in use"));
        }

        let tier = if state.users.is_empty() {
            Tier::Owner
        } else {
            Tier::Member
        };
        let handle_str = state.unique_handle(&handle_base(name_first, name_last));
        let u_id = state.allocate_user_id();

        state.ensure_workspace_series(now);
        state.users.insert(
            u_id,
            User {
                u_id,
                email: email.to_string(),
                password_hash,
                name_first: name_first.to_string(),
                name_last: name_last.to_string(),
                handle_str: handle_str.clone(),
                tier: Some(tier),
                stats: UserStats::starting_at(now),
                profile_img_url: self.config().default_avatar_url.clone(),
            },
        );
        let token = state.issue_session(u_id);

        tracing::info!("Registered user {} ({}) as {}", u_id, handle_str, tier);
        Ok(AuthSession {
            token,
            auth_user_id: u_id,
        })
    }

    /// Checks credentials without creating a session.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserId> {
        let (u_id, hash) = {
            let state = self.lock();
            let user = state
                .user_by_email(email)
                .ok_or(Error::InvalidCredentials)?;
            (user.u_id, user.password_hash.clone())
        };

        if !self.hasher().verify(password, &hash)? {
            return Err(Error::InvalidCredentials);
        }
        Ok(u_id)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let u_id = self.authenticate(email, password)?;

        let mut state = self.lock();
        if state.live_user(u_id).is_none() {
            return Err(Error::InvalidCredentials);
        }
        let token = state.issue_session(u_id);
        Ok(AuthSession {
            token,
            auth_user_id: u_id,
        })
    }

    /// Profile of any user ever registered, including tombstones.
    pub fn profile(&self, caller: UserId, u_id: UserId) -> Result<UserProfile> {
        let state = self.lock();
        state.require_actor(caller)?;

        state
            .users
            .get(&u_id)
            .map(User::profile)
            .ok_or_else(|| Error::invalid("Unknown user"))
    }

    pub fn users_all(&self, caller: UserId) -> Result<Vec<UserProfile>> {
        let state = self.lock();
        state.require_actor(caller)?;
        Ok(state.live_users().map(User::profile).collect())
    }

    pub fn set_name(&self, actor: UserId, name_first: &str, name_last: &str) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(actor)?;
        validate_person_name(name_first, "First name")?;
        validate_person_name(name_last, "Last name")?;

        if let Some(user) = state.users.get_mut(&actor) {
            user.name_first = name_first.to_string();
            user.name_last = name_last.to_string();
        }
        Ok(())
    }

    pub fn set_email(&self, actor: UserId, email: &str) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(actor)?;
        validate_email(email)?;
        if state.user_by_email(email).is_some() {
            return Err(Error::conflict("Email address already in use"));
        }

        if let Some(user) = state.users.get_mut(&actor) {
            user.email = email.to_string();
        }
        Ok(())
    }

    pub fn set_handle(&self, actor: UserId, handle: &str) -> Result<()> {
        let mut state = self.lock();
        state.require_actor(actor)?;
        validate_handle(handle)?;
        if state.user_by_handle(handle).is_some() {
            return Err(Error::conflict("Handle already taken"));
        }

        if let Some(user) = state.users.get_mut(&actor) {
            user.handle_str = handle.to_string();
        }
        Ok(())
    }

    /// Resets the whole workspace on behalf of a workspace owner.
    pub fn clear_by(&self, actor: UserId) -> Result<()> {
        let mut state = self.lock();
        state.require_administrator(actor)?;
        *state = WorkspaceState::new();

        tracing::info!("Workspace cleared by user {}", actor);
        Ok(())
    }

    /// Tombstones a user: their id and statistics survive, their personal
    /// details, sessions, memberships and pending work do not. Messages they
    /// authored are rewritten to the removed-user marker.
    pub fn remove_user(&self, actor: UserId, target: UserId) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.require_administrator(actor)?;

        let target_user = state
            .live_user(target)
            .ok_or_else(|| Error::invalid("Unknown user"))?;
        if target_user.is_elevated() && state.elevated_count() == 1 {
            return Err(Error::conflict("Cannot remove the only workspace owner"));
        }
        let email = target_user.email.clone();

        state.revoke_all_sessions(target);
        state.reset_codes.retain(|_, e| *e != email);
        state.pending.retain(|_, d| d.author != target);

        let containers = state
            .channels
            .values_mut()
            .map(|c| c as &mut dyn Container)
            .chain(state.dms.values_mut().map(|d| d as &mut dyn Container));
        for container in containers {
            container.remove_member(target);
            for message in container.messages_mut() {
                if message.u_id == target {
                    message.message = REMOVED_USER_MARKER.to_string();
                }
            }
        }

        if let Some(user) = state.users.get_mut(&target) {
            user.email.clear();
            user.handle_str.clear();
            user.password_hash.clear();
            user.name_first = REMOVED_NAME_FIRST.to_string();
            user.name_last = REMOVED_NAME_LAST.to_string();
            user.tier = None;
        }

        tracing::info!("User {} removed by {}", target, actor);
        Ok(())
    }

    /// Changes a user's workspace tier. `permission_id` is 1 (owner) or 2 (member).
    pub fn change_permission(
        &self,
        actor: UserId,
        target: UserId,
        permission_id: i64,
    ) -> Result<()> {
        let mut state = self.lock();
        state.require_administrator(actor)?;

        let current = state
            .live_user(target)
            .ok_or_else(|| Error::invalid("Unknown user"))?
            .tier;
        let tier = Tier::from_permission_id(permission_id)
            .ok_or_else(|| Error::invalid(format!("Invalid permission id {permission_id}")))?;

        if current == Some(tier) {
            return Err(Error::conflict(format!("User is already a workspace {tier}")));
        }
        if !tier.is_elevated() && state.elevated_count() == 1 {
            return Err(Error::conflict("Cannot demote the only workspace owner"));
        }

        if let Some(user) = state.users.get_mut(&target) {
            user.tier = Some(tier);
        }

        tracing::info!("User {} is now a workspace {} (changed by {})", target, tier, actor);
        Ok(())
    }
}
