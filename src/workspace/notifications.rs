use super::{Workspace, WorkspaceState};
use crate::error::Result;
use crate::types::*;

/// Notifications returned per read.
pub const NOTIFICATION_PAGE_SIZE: usize = 20;

const TAG_PREVIEW_LEN: usize = 20;

pub(crate) enum NotificationKind<'a> {
    Added,
    Reacted,
    /// `body` is the stored message body, previewed in the text.
    Tagged { body: &'a str },
}

/// Extracts tag candidates: each `@` followed by a maximal run of non-space
/// characters. Duplicates are dropped, first occurrence wins.
pub(crate) fn scan_tags(body: &str) -> Vec<&str> {
    let mut tags: Vec<&str> = Vec::new();
    let mut rest = body;

    while let Some(at) = rest.find('@') {
        let after = &rest[at + 1..];
        let end = after.find(' ').unwrap_or(after.len());
        let tag = &after[..end];
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        rest = &after[end..];
    }

    tags
}

impl WorkspaceState {
    pub(crate) fn notify(
        &mut self,
        recipient: UserId,
        actor: UserId,
        target: ContainerRef,
        kind: NotificationKind<'_>,
    ) {
        let actor_handle = self.handle_of(actor);
        let container = self.container_name(target);
        let notification_message = match kind {
            NotificationKind::Added => format!("{actor_handle} added you to {container}"),
            NotificationKind::Reacted => {
                format!("{actor_handle} reacted to your message in {container}")
            }
            NotificationKind::Tagged { body } => {
                let preview: String = body.chars().take(TAG_PREVIEW_LEN).collect();
                format!("{actor_handle} tagged you in {container}: {preview}")
            }
        };

        let (channel_id, dm_id) = target.id_pair();
        self.notifications
            .entry(recipient)
            .or_default()
            .push(Notification {
                channel_id,
                dm_id,
                notification_message,
            });
    }

    /// Notifies every live user whose handle is tagged in `scanned`.
    pub(crate) fn notify_tags(
        &mut self,
        actor: UserId,
        target: ContainerRef,
        scanned: &str,
        stored_body: &str,
    ) {
        let recipients: Vec<UserId> = scan_tags(scanned)
            .into_iter()
            .filter_map(|handle| self.user_by_handle(handle).map(|u| u.u_id))
            .collect();

        for recipient in recipients {
            self.notify(
                recipient,
                actor,
                target,
                NotificationKind::Tagged { body: stored_body },
            );
        }
    }
}

impl Workspace {
    /// The caller's most recent notifications, newest first.
    pub fn notifications(&self, caller: UserId) -> Result<Vec<Notification>> {
        let state = self.lock();
        state.require_actor(caller)?;

        Ok(state
            .notifications
            .get(&caller)
            .map(|all| {
                all.iter()
                    .rev()
                    .take(NOTIFICATION_PAGE_SIZE)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
