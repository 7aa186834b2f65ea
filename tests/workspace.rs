mod common;

use beans::error::Error;
use beans::types::{ContainerRef, REMOVED_USER_MARKER};
use common::{PASSWORD, TestWorkspace};

fn is_invalid<T>(result: Result<T, Error>) -> bool {
    matches!(result, Err(Error::InvalidArgument(_)))
}

fn is_forbidden<T>(result: Result<T, Error>) -> bool {
    matches!(result, Err(Error::Forbidden(_)))
}

fn is_conflict<T>(result: Result<T, Error>) -> bool {
    matches!(result, Err(Error::Conflict(_)))
}

// Identity

#[test]
fn test_handles_get_increasing_suffixes() {
    let ws = TestWorkspace::new();
    let ids: Vec<_> = (0..3)
        .map(|n| {
            ws.workspace
                .register(&format!("ada{n}@example.com"), PASSWORD, "Ada", "Lovelace")
                .unwrap()
                .auth_user_id
        })
        .collect();

    let handles: Vec<String> = ids
        .iter()
        .map(|id| ws.workspace.profile(ids[0], *id).unwrap().handle_str)
        .collect();
    assert_eq!(handles, ["adalovelace", "adalovelace0", "adalovelace1"]);
}

#[test]
fn test_handle_is_truncated_before_suffix() {
    let ws = TestWorkspace::new();
    let first = ws
        .workspace
        .register("a@example.com", PASSWORD, "Abcdefghijkl", "Mnopqrstuvwx")
        .unwrap()
        .auth_user_id;
    let second = ws
        .workspace
        .register("b@example.com", PASSWORD, "Abcdefghijkl", "Mnopqrstuvwx")
        .unwrap()
        .auth_user_id;

    let profile = |id| ws.workspace.profile(first, id).unwrap().handle_str;
    assert_eq!(profile(first), "abcdefghijklmnopqrst");
    assert_eq!(profile(second), "abcdefghijklmnopqrst0");
}

#[test]
fn test_register_rejects_bad_input() {
    let ws = TestWorkspace::new();
    ws.register("Ada", "Lovelace");
    let long_name = "x".repeat(51);

    let register = |email: &str, password: &str, first: &str, last: &str| {
        ws.workspace.register(email, password, first, last)
    };
    assert!(is_invalid(register("not-an-email", PASSWORD, "A", "B")));
    assert!(is_invalid(register("ada@example.com", PASSWORD, "A", "B")));
    assert!(is_invalid(register("new@example.com", "short", "A", "B")));
    assert!(is_invalid(register("new@example.com", PASSWORD, "", "B")));
    assert!(is_invalid(register("new@example.com", PASSWORD, "A", &long_name)));
}

#[test]
fn test_authenticate_never_reveals_which_part_failed() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");

    assert_eq!(
        ws.workspace.authenticate("ada@example.com", PASSWORD).unwrap(),
        ada
    );
    assert!(matches!(
        ws.workspace.authenticate("ada@example.com", "wrong-password"),
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        ws.workspace.authenticate("nobody@example.com", PASSWORD),
        Err(Error::InvalidCredentials)
    ));
}

#[test]
fn test_profile_updates() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    ws.workspace.set_name(ada, "Augusta", "King").unwrap();
    ws.workspace.set_email(ada, "augusta@example.com").unwrap();
    ws.workspace.set_handle(ada, "countess").unwrap();

    let profile = ws.workspace.profile(bob, ada).unwrap();
    assert_eq!(profile.name_first, "Augusta");
    assert_eq!(profile.email, "augusta@example.com");
    assert_eq!(profile.handle_str, "countess");

    assert!(is_conflict(ws.workspace.set_email(bob, "augusta@example.com")));
    assert!(is_conflict(ws.workspace.set_handle(bob, "countess")));
    assert!(is_invalid(ws.workspace.set_handle(bob, "ab")));
    assert!(is_invalid(ws.workspace.set_handle(bob, "no spaces")));
    assert!(is_invalid(ws.workspace.set_name(bob, "", "Smith")));
}

#[test]
fn test_first_user_is_the_workspace_owner() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    assert!(is_forbidden(ws.workspace.change_permission(bob, ada, 2)));
    ws.workspace.change_permission(ada, bob, 1).unwrap();
    ws.workspace.change_permission(bob, ada, 2).unwrap();
}

#[test]
fn test_change_permission_errors() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    assert!(is_invalid(ws.workspace.change_permission(ada, 999, 1)));
    assert!(is_invalid(ws.workspace.change_permission(ada, bob, 3)));
    assert!(is_conflict(ws.workspace.change_permission(ada, bob, 2)));
    assert!(is_conflict(ws.workspace.change_permission(ada, ada, 2)));
}

#[test]
fn test_sole_owner_cannot_be_removed() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    assert!(is_conflict(ws.workspace.remove_user(ada, ada)));
    assert!(is_forbidden(ws.workspace.remove_user(bob, ada)));
    assert!(is_invalid(ws.workspace.remove_user(ada, 999)));

    ws.workspace.change_permission(ada, bob, 1).unwrap();
    ws.workspace.remove_user(bob, ada).unwrap();
}

#[test]
fn test_removed_user_becomes_tombstone() {
    let ws = TestWorkspace::new();
    let owner = ws.user("Ada", "Lovelace");
    let target = ws.register("Bob", "Smith");
    let channel = ws.workspace.create_channel(owner, "general", true).unwrap();
    ws.workspace.join_channel(target.auth_user_id, channel).unwrap();
    ws.workspace
        .send(target.auth_user_id, ContainerRef::Channel(channel), "hi all")
        .unwrap();

    ws.workspace.remove_user(owner, target.auth_user_id).unwrap();

    let profile = ws.workspace.profile(owner, target.auth_user_id).unwrap();
    assert_eq!(profile.name_first, "Removed");
    assert_eq!(profile.name_last, "user");

    let page = ws
        .workspace
        .messages(owner, ContainerRef::Channel(channel), 0)
        .unwrap();
    assert_eq!(page.messages[0].message, REMOVED_USER_MARKER);
    assert_eq!(page.messages[0].u_id, target.auth_user_id);

    let details = ws.workspace.channel_details(owner, channel).unwrap();
    assert_eq!(details.all_members.len(), 1);
    assert_eq!(ws.workspace.resolve(&target.token), None);
    assert_eq!(ws.workspace.users_all(owner).unwrap().len(), 1);

    // The email and handle are free again.
    let again = ws.register("Bob", "Smith");
    assert_eq!(
        ws.workspace
            .profile(owner, again.auth_user_id)
            .unwrap()
            .handle_str,
        "bobsmith"
    );
}

// Sessions

#[test]
fn test_issue_and_revoke_all_sessions() {
    let ws = TestWorkspace::new();
    let ada = ws.register("Ada", "Lovelace");
    let bob = ws.register("Bob", "Smith");

    let extra = ws.workspace.issue_session(ada.auth_user_id).unwrap();
    assert_ne!(extra, ada.token);
    assert_eq!(ws.workspace.resolve(&extra), Some(ada.auth_user_id));
    assert!(is_forbidden(ws.workspace.issue_session(99)));

    ws.workspace.revoke_all(ada.auth_user_id);
    assert_eq!(ws.workspace.resolve(&extra), None);
    assert_eq!(ws.workspace.resolve(&ada.token), None);
    assert_eq!(ws.workspace.resolve(&bob.token), Some(bob.auth_user_id));
}

#[test]
fn test_sessions_resolve_until_logout() {
    let ws = TestWorkspace::new();
    let session = ws.register("Ada", "Lovelace");
    let second = ws.workspace.login("ada@example.com", PASSWORD).unwrap();
    assert_ne!(session.token, second.token);

    assert_eq!(ws.workspace.resolve(&session.token), Some(session.auth_user_id));
    ws.workspace.logout(&session.token);
    assert_eq!(ws.workspace.resolve(&session.token), None);
    assert_eq!(ws.workspace.resolve(&second.token), Some(session.auth_user_id));

    ws.workspace.logout(&session.token);
    assert_eq!(ws.workspace.resolve("garbage"), None);
}

#[test]
fn test_password_reset_flow() {
    let ws = TestWorkspace::new();
    let session = ws.register("Ada", "Lovelace");

    assert!(ws.workspace.request_password_reset("nobody@example.com").is_none());

    let code = ws
        .workspace
        .request_password_reset("ada@example.com")
        .unwrap();
    assert_eq!(ws.workspace.resolve(&session.token), None);

    assert!(is_invalid(ws.workspace.reset_password("WRONGCODE", "new-password")));
    assert!(is_invalid(ws.workspace.reset_password(&code, "short")));
    ws.workspace.reset_password(&code, "new-password").unwrap();
    assert!(is_invalid(ws.workspace.reset_password(&code, "another-one")));

    assert!(ws.workspace.login("ada@example.com", PASSWORD).is_err());
    ws.workspace
        .login("ada@example.com", "new-password")
        .unwrap();
}

// Membership

#[test]
fn test_scenario_invite_then_message() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    let channel = ws.workspace.create_channel(ada, "general", true).unwrap();
    ws.workspace.invite(ada, channel, bob).unwrap();
    ws.workspace
        .send(bob, ContainerRef::Channel(channel), "hello ada")
        .unwrap();

    let page = ws
        .workspace
        .messages(ada, ContainerRef::Channel(channel), 0)
        .unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].u_id, bob);

    let notifications = ws.workspace.notifications(bob).unwrap();
    assert_eq!(
        notifications[0].notification_message,
        "adalovelace added you to general"
    );
    assert_eq!(notifications[0].channel_id, channel);
    assert_eq!(notifications[0].dm_id, -1);
}

#[test]
fn test_join_rules() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let cat = ws.user("Cat", "Jones");

    let public = ws.workspace.create_channel(bob, "public", true).unwrap();
    let private = ws.workspace.create_channel(bob, "private", false).unwrap();

    assert!(is_invalid(ws.workspace.join_channel(cat, 999)));
    assert!(is_forbidden(ws.workspace.join_channel(cat, private)));
    ws.workspace.join_channel(cat, public).unwrap();
    assert!(is_conflict(ws.workspace.join_channel(cat, public)));

    // Workspace owners may join private channels.
    ws.workspace.join_channel(ada, private).unwrap();
    assert_eq!(ws.workspace.channels_list(ada).unwrap().len(), 1);
    assert_eq!(ws.workspace.channels_list_all(cat).unwrap().len(), 2);
}

#[test]
fn test_invite_errors() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let cat = ws.user("Cat", "Jones");
    let channel = ws.workspace.create_channel(ada, "private", false).unwrap();

    assert!(is_invalid(ws.workspace.invite(ada, 999, bob)));
    assert!(is_invalid(ws.workspace.invite(ada, channel, 999)));
    assert!(is_invalid(ws.workspace.invite(ada, channel, ada)));
    assert!(is_forbidden(ws.workspace.invite(bob, channel, cat)));

    ws.workspace.invite(ada, channel, bob).unwrap();
    ws.workspace.invite(bob, channel, cat).unwrap();
}

#[test]
fn test_channel_queries_require_membership() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let channel = ws.workspace.create_channel(ada, "general", true).unwrap();

    assert!(is_forbidden(ws.workspace.channel_details(bob, channel)));
    assert!(is_forbidden(ws.workspace.leave_channel(bob, channel)));
    assert!(is_forbidden(
        ws.workspace.messages(bob, ContainerRef::Channel(channel), 0)
    ));
    assert!(is_forbidden(
        ws.workspace.send(bob, ContainerRef::Channel(channel), "hi")
    ));
    assert!(is_invalid(ws.workspace.channel_details(bob, 999)));
}

#[test]
fn test_last_owner_may_leave() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let channel = ws.workspace.create_channel(bob, "general", true).unwrap();
    ws.workspace.join_channel(ada, channel).unwrap();

    ws.workspace.leave_channel(bob, channel).unwrap();

    let details = ws.workspace.channel_details(ada, channel).unwrap();
    assert!(details.owner_members.is_empty());
    assert_eq!(details.all_members.len(), 1);
    ws.workspace
        .send(ada, ContainerRef::Channel(channel), "still here")
        .unwrap();
}

#[test]
fn test_owner_management() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let cat = ws.user("Cat", "Jones");
    let channel = ws.workspace.create_channel(bob, "general", true).unwrap();
    ws.workspace.join_channel(cat, channel).unwrap();

    assert!(is_invalid(ws.workspace.add_owner(bob, channel, ada)));
    assert!(is_conflict(ws.workspace.add_owner(bob, channel, bob)));
    assert!(is_forbidden(ws.workspace.add_owner(cat, channel, cat)));
    assert!(is_conflict(ws.workspace.remove_owner(bob, channel, bob)));

    ws.workspace.add_owner(bob, channel, cat).unwrap();
    assert!(is_invalid(ws.workspace.remove_owner(bob, channel, ada)));

    // Ada is a workspace owner, but only counts once she is a member.
    assert!(is_forbidden(ws.workspace.remove_owner(ada, channel, cat)));
    ws.workspace.join_channel(ada, channel).unwrap();
    ws.workspace.remove_owner(ada, channel, cat).unwrap();

    let details = ws.workspace.channel_details(bob, channel).unwrap();
    assert_eq!(details.owner_members.len(), 1);
    assert_eq!(details.owner_members[0].u_id, bob);
}

#[test]
fn test_scenario_dm_name_is_sorted_handles() {
    let ws = TestWorkspace::new();
    let cat = ws.user("Cat", "Jones");
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    let dm = ws.workspace.create_dm(cat, &[bob, ada]).unwrap();
    let details = ws.workspace.dm_details(ada, dm).unwrap();
    assert_eq!(details.name, "adalovelace, bobsmith, catjones");
    assert_eq!(details.members.len(), 3);

    // Leaving never renames.
    ws.workspace.leave_dm(bob, dm).unwrap();
    let details = ws.workspace.dm_details(ada, dm).unwrap();
    assert_eq!(details.name, "adalovelace, bobsmith, catjones");
    assert_eq!(details.members.len(), 2);

    let notifications = ws.workspace.notifications(ada).unwrap();
    assert_eq!(
        notifications[0].notification_message,
        "catjones added you to adalovelace, bobsmith, catjones"
    );
}

#[test]
fn test_dm_errors() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let cat = ws.user("Cat", "Jones");

    assert!(is_invalid(ws.workspace.create_dm(ada, &[999])));
    assert!(is_invalid(ws.workspace.create_dm(ada, &[bob, bob])));
    assert!(is_invalid(ws.workspace.create_dm(ada, &[ada])));

    let dm = ws.workspace.create_dm(ada, &[bob]).unwrap();
    assert!(is_invalid(ws.workspace.dm_details(cat, dm)));
    assert!(is_invalid(ws.workspace.leave_dm(cat, dm)));
    assert!(is_invalid(ws.workspace.remove_dm(cat, dm)));
    assert!(is_invalid(ws.workspace.remove_dm(bob, dm)));
    assert!(is_forbidden(
        ws.workspace.send(cat, ContainerRef::Dm(dm), "hi")
    ));

    assert_eq!(ws.workspace.dm_list(bob).unwrap().len(), 1);
    assert!(ws.workspace.dm_list(cat).unwrap().is_empty());
}

#[test]
fn test_remove_dm_drops_its_messages() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");
    let dm = ws.workspace.create_dm(ada, &[bob]).unwrap();
    let message = ws.workspace.send(bob, ContainerRef::Dm(dm), "secret").unwrap();

    ws.workspace.remove_dm(ada, dm).unwrap();

    assert!(ws.workspace.dm_list(bob).unwrap().is_empty());
    assert!(is_invalid(ws.workspace.react(bob, message, 1)));
    assert!(is_invalid(ws.workspace.dm_details(ada, dm)));

    let stats = ws.workspace.workspace_stats(ada).unwrap();
    assert_eq!(stats.dms_exist.last().unwrap().count, 0);
    assert_eq!(stats.messages_exist.last().unwrap().count, 0);
    let bob_stats = ws.workspace.user_stats(bob).unwrap();
    assert_eq!(bob_stats.dms_joined.last().unwrap().count, 0);
    // Messages sent are history, not existence.
    assert_eq!(bob_stats.messages_sent.last().unwrap().count, 1);
}

// Statistics

#[test]
fn test_statistics_series_and_rates() {
    let ws = TestWorkspace::new();
    let ada = ws.user("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    let stats = ws.workspace.workspace_stats(ada).unwrap();
    assert_eq!(stats.channels_exist.len(), 1);
    assert_eq!(stats.channels_exist[0].count, 0);
    assert_eq!(stats.utilization_rate, 0.0);
    assert_eq!(ws.workspace.user_stats(ada).unwrap().involvement_rate, 0.0);

    ws.advance(10);
    let channel = ws.workspace.create_channel(ada, "general", true).unwrap();
    ws.workspace
        .send(ada, ContainerRef::Channel(channel), "one")
        .unwrap();
    ws.workspace
        .send(ada, ContainerRef::Channel(channel), "two")
        .unwrap();

    let stats = ws.workspace.workspace_stats(bob).unwrap();
    assert_eq!(stats.channels_exist.len(), 2);
    assert_eq!(stats.channels_exist[1].count, 1);
    assert_eq!(stats.channels_exist[1].time_stamp, ws.now());
    assert_eq!(stats.messages_exist.last().unwrap().count, 2);
    assert_eq!(stats.utilization_rate, 0.5);

    let report = ws.workspace.user_stats(ada).unwrap();
    assert_eq!(report.channels_joined.last().unwrap().count, 1);
    assert_eq!(report.messages_sent.last().unwrap().count, 2);
    assert_eq!(report.involvement_rate, 1.0);

    ws.workspace.join_channel(bob, channel).unwrap();
    let report = ws.workspace.user_stats(bob).unwrap();
    assert!((report.involvement_rate - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(ws.workspace.workspace_stats(bob).unwrap().utilization_rate, 1.0);
}

#[test]
fn test_clear_by_requires_workspace_owner() {
    let ws = TestWorkspace::new();
    let ada = ws.register("Ada", "Lovelace");
    let bob = ws.user("Bob", "Smith");

    assert!(is_forbidden(ws.workspace.clear_by(bob)));
    assert!(is_forbidden(ws.workspace.clear_by(99)));
    assert_eq!(ws.workspace.resolve(&ada.token), Some(ada.auth_user_id));

    ws.workspace.clear_by(ada.auth_user_id).unwrap();
    assert_eq!(ws.workspace.resolve(&ada.token), None);
}

#[test]
fn test_clear_empties_workspace() {
    let ws = TestWorkspace::new();
    let session = ws.register("Ada", "Lovelace");
    ws.workspace
        .create_channel(session.auth_user_id, "general", true)
        .unwrap();

    ws.workspace.clear();

    assert_eq!(ws.workspace.resolve(&session.token), None);
    let again = ws.register("Ada", "Lovelace");
    assert_eq!(again.auth_user_id, 1);
    assert!(ws
        .workspace
        .channels_list_all(again.auth_user_id)
        .unwrap()
        .is_empty());
}
