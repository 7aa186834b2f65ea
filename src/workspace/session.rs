use super::validation::validate_password;
use super::{Workspace, WorkspaceState};
use crate::auth::{digest_token, generate_reset_code, generate_session_token, parse_token};
use crate::error::{Error, Result};
use crate::types::*;

/// Hands a reset code to whoever delivers it to the user. Called outside the
/// workspace lock.
pub trait ResetDelivery: Send + Sync {
    fn deliver(&self, email: &str, code: &str);
}

/// Records reset codes in the log instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogResetDelivery;

impl ResetDelivery for LogResetDelivery {
    fn deliver(&self, email: &str, code: &str) {
        tracing::info!("Password reset code for {}: {}", email, code);
    }
}

impl WorkspaceState {
    /// Issues a new session for `user` and returns the raw token.
    pub(crate) fn issue_session(&mut self, user: UserId) -> String {
        let token = generate_session_token();
        self.sessions.insert(token.digest, user);
        token.raw
    }

    pub(crate) fn revoke_all_sessions(&mut self, user: UserId) {
        self.sessions.retain(|_, owner| *owner != user);
    }
}

impl Workspace {
    pub fn issue_session(&self, user: UserId) -> Result<String> {
        let mut state = self.lock();
        state.require_actor(user)?;
        Ok(state.issue_session(user))
    }

    /// Maps a raw token to its user. Malformed or unknown tokens give `None`.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        parse_token(token).ok()?;
        let digest = digest_token(token);

        let state = self.lock();
        let user = *state.sessions.get(&digest)?;
        state.live_user(user).map(|u| u.u_id)
    }

    /// Ends one session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        let digest = digest_token(token);
        self.lock().sessions.remove(&digest);
    }

    /// Ends every session belonging to `user`.
    pub fn revoke_all(&self, user: UserId) {
        self.lock().revoke_all_sessions(user);
    }

    /// Starts a password reset. Unknown emails silently produce nothing;
    /// otherwise every session of the user is revoked and a code is returned
    /// for out-of-band delivery.
    pub fn request_password_reset(&self, email: &str) -> Option<String> {
        let mut state = self.lock();
        let user = state.user_by_email(email)?.u_id;

        state.revoke_all_sessions(user);
        let code = generate_reset_code();
        state.reset_codes.insert(code.clone(), email.to_string());

        tracing::info!("Password reset requested for user {}", user);
        Some(code)
    }

    /// Consumes a reset code and sets a new password.
    pub fn reset_password(&self, code: &str, new_password: &str) -> Result<()> {
        if !self.lock().reset_codes.contains_key(code) {
            return Err(Error::invalid("Invalid reset code"));
        }
        validate_password(new_password)?;

        let hash = self.hasher().hash(new_password)?;

        let mut state = self.lock();
        let email = state
            .reset_codes
            .remove(code)
            .ok_or_else(|| Error::invalid("Invalid reset code"))?;
        let user = state
            .user_by_email(&email)
            .map(|u| u.u_id)
            .ok_or_else(|| Error::invalid("Invalid reset code"))?;
        if let Some(user) = state.users.get_mut(&user) {
            user.password_hash = hash;
        }

        Ok(())
    }
}
