use perch_core::Workspace;
use perch_types::Error;
use perch_types::models::REACT_ID;

fn workspace() -> Workspace {
    Workspace::new("test-secret")
}

fn register(ws: &Workspace, n: u32) -> (u64, String) {
    let auth = ws
        .auth_register(
            &format!("user{n}@mail.com"),
            "password",
            &format!("First{n}"),
            &format!("Last{n}"),
        )
        .unwrap();
    (auth.u_id, auth.token)
}

/// A channel created by user 2 (an ordinary member), with user 1 holding
/// the workspace-owner role.
fn channel_fixture(ws: &Workspace) -> (String, String, u64) {
    let (_, owner_token) = register(ws, 1);
    let (_, creator_token) = register(ws, 2);
    let channel_id = ws.channels_create(&creator_token, "general", true).unwrap().channel_id;
    (owner_token, creator_token, channel_id)
}

#[test]
fn send_validates_length_channel_and_membership() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let (_, outsider_token) = register(&ws, 3);

    let exactly_max = "a".repeat(1000);
    ws.message_send(&creator_token, channel_id, &exactly_max).unwrap();

    let too_long = "a".repeat(1001);
    assert!(matches!(
        ws.message_send(&creator_token, channel_id, &too_long).unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.message_send(&creator_token, 99, "hello").unwrap_err(),
        Error::Access(_)
    ));
    assert!(matches!(
        ws.message_send(&outsider_token, channel_id, "hello").unwrap_err(),
        Error::Access(_)
    ));
}

#[test]
fn message_ids_are_globally_sequential_across_channels() {
    let ws = workspace();
    let (_, token1) = register(&ws, 1);

    let first_channel = ws.channels_create(&token1, "one", true).unwrap().channel_id;
    let second_channel = ws.channels_create(&token1, "two", true).unwrap().channel_id;

    let a = ws.message_send(&token1, first_channel, "a").unwrap().message_id;
    let b = ws.message_send(&token1, second_channel, "b").unwrap().message_id;
    let c = ws.message_send(&token1, first_channel, "c").unwrap().message_id;

    assert_eq!((a, b, c), (1, 2, 3));
}

#[test]
fn author_and_moderators_can_edit() {
    let ws = workspace();
    let (owner_token, creator_token, channel_id) = channel_fixture(&ws);
    let (_, member_token) = register(&ws, 3);
    ws.channel_join(&member_token, channel_id).unwrap();

    let message_id = ws.message_send(&member_token, channel_id, "draft").unwrap().message_id;

    // Author edit
    ws.message_edit(&member_token, message_id, "author edit").unwrap();
    // Channel-owner edit
    ws.message_edit(&creator_token, message_id, "owner edit").unwrap();
    // Workspace-owner edit, without channel membership
    ws.message_edit(&owner_token, message_id, "admin edit").unwrap();

    let page = ws.channel_messages(&member_token, channel_id, 0).unwrap();
    assert_eq!(page.messages[0].message, "admin edit");
}

#[test]
fn plain_members_cannot_edit_or_remove_others_messages() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let (_, member_token) = register(&ws, 3);
    ws.channel_join(&member_token, channel_id).unwrap();

    let message_id = ws.message_send(&creator_token, channel_id, "hands off").unwrap().message_id;

    assert!(matches!(
        ws.message_edit(&member_token, message_id, "vandalism").unwrap_err(),
        Error::Access(_)
    ));
    assert!(matches!(
        ws.message_remove(&member_token, message_id).unwrap_err(),
        Error::Access(_)
    ));
}

#[test]
fn edit_to_empty_keeps_the_message() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);

    let message_id = ws.message_send(&creator_token, channel_id, "something").unwrap().message_id;
    ws.message_edit(&creator_token, message_id, "").unwrap();

    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message_id, message_id);
    assert_eq!(page.messages[0].message, "");
}

#[test]
fn edit_and_remove_validate_the_message_id() {
    let ws = workspace();
    let (_, creator_token, _) = channel_fixture(&ws);

    assert!(matches!(ws.message_edit(&creator_token, 99, "x").unwrap_err(), Error::Input(_)));
    assert!(matches!(ws.message_remove(&creator_token, 99).unwrap_err(), Error::Input(_)));
}

#[test]
fn removed_messages_leave_the_feed() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);

    let keep = ws.message_send(&creator_token, channel_id, "keep").unwrap().message_id;
    let drop = ws.message_send(&creator_token, channel_id, "drop").unwrap().message_id;

    ws.message_remove(&creator_token, drop).unwrap();

    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    let ids: Vec<u64> = page.messages.iter().map(|m| m.message_id).collect();
    assert_eq!(ids, vec![keep]);
}

#[test]
fn react_round_trip() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let message_id = ws.message_send(&creator_token, channel_id, "nice").unwrap().message_id;

    ws.message_react(&creator_token, message_id, REACT_ID).unwrap();
    assert!(matches!(
        ws.message_react(&creator_token, message_id, REACT_ID).unwrap_err(),
        Error::Input(_)
    ));

    ws.message_unreact(&creator_token, message_id, REACT_ID).unwrap();
    assert!(matches!(
        ws.message_unreact(&creator_token, message_id, REACT_ID).unwrap_err(),
        Error::Input(_)
    ));

    // Round trip: the reactor set is equivalent to the first react.
    ws.message_react(&creator_token, message_id, REACT_ID).unwrap();
    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    let react = &page.messages[0].reacts[0];
    assert_eq!(react.u_ids, vec![1]);
    assert!(react.is_this_user_reacted);
}

#[test]
fn react_validates_kind_and_message() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let message_id = ws.message_send(&creator_token, channel_id, "nice").unwrap().message_id;

    assert!(matches!(
        ws.message_react(&creator_token, message_id, 2).unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.message_react(&creator_token, 99, REACT_ID).unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.message_unreact(&creator_token, 99, REACT_ID).unwrap_err(),
        Error::Input(_)
    ));
}

#[test]
fn pin_requires_channel_ownership_specifically() {
    let ws = workspace();
    let (owner_token, creator_token, channel_id) = channel_fixture(&ws);
    let (_, member_token) = register(&ws, 3);
    ws.channel_join(&member_token, channel_id).unwrap();

    let message_id = ws.message_send(&creator_token, channel_id, "pin me").unwrap().message_id;

    // A plain member cannot pin.
    assert!(matches!(ws.message_pin(&member_token, message_id).unwrap_err(), Error::Access(_)));
    // Unlike edit/remove, workspace ownership alone does not grant pin.
    assert!(matches!(ws.message_pin(&owner_token, message_id).unwrap_err(), Error::Access(_)));

    ws.message_pin(&creator_token, message_id).unwrap();
    assert!(matches!(
        ws.message_pin(&creator_token, message_id).unwrap_err(),
        Error::Input(_)
    ));

    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    assert!(page.messages[0].is_pinned);

    ws.message_unpin(&creator_token, message_id).unwrap();
    assert!(matches!(
        ws.message_unpin(&creator_token, message_id).unwrap_err(),
        Error::Input(_)
    ));

    assert!(matches!(ws.message_pin(&creator_token, 99).unwrap_err(), Error::Input(_)));
}

#[test]
fn workspace_owner_pins_after_joining() {
    let ws = workspace();
    let (owner_token, creator_token, channel_id) = channel_fixture(&ws);
    let message_id = ws.message_send(&creator_token, channel_id, "pin me").unwrap().message_id;

    // Joining auto-promotes the workspace owner to channel owner, which
    // is exactly what pin requires.
    ws.channel_join(&owner_token, channel_id).unwrap();
    ws.message_pin(&owner_token, message_id).unwrap();
}

#[test]
fn search_is_scoped_to_the_callers_channels() {
    let ws = workspace();
    let (_, token1) = register(&ws, 1);
    let (_, token2) = register(&ws, 2);

    let mine = ws.channels_create(&token1, "mine", true).unwrap().channel_id;
    let theirs = ws.channels_create(&token2, "theirs", true).unwrap().channel_id;

    ws.message_send(&token1, mine, "deploy went well").unwrap();
    ws.message_send(&token1, mine, "lunch plans").unwrap();
    ws.message_send(&token2, theirs, "deploy broke").unwrap();

    let found = ws.search(&token1, "deploy").unwrap().messages;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "deploy went well");

    assert!(matches!(ws.search(&token1, "[unclosed").unwrap_err(), Error::Input(_)));
}

#[test]
fn deferred_send_validates_up_front() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let (_, outsider_token) = register(&ws, 3);
    let future = chrono::Utc::now().timestamp() + 60;

    assert!(matches!(
        ws.message_send_later(&creator_token, channel_id, "", future).unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.message_send_later(&creator_token, 99, "later", future).unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.message_send_later(&outsider_token, channel_id, "later", future).unwrap_err(),
        Error::Access(_)
    ));
    assert!(matches!(
        ws.message_send_later(&creator_token, channel_id, "later", future - 120).unwrap_err(),
        Error::Input(_)
    ));
}

#[test]
fn deferred_send_lands_on_commit() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let future = chrono::Utc::now().timestamp() + 60;

    let (response, fire_at) = ws
        .message_send_later(&creator_token, channel_id, "from the future", future)
        .unwrap();
    assert_eq!(fire_at, future);

    // Not visible until the timer fires.
    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    assert!(page.messages.is_empty());

    ws.commit_deferred(response.message_id);

    let page = ws.channel_messages(&creator_token, channel_id, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message_id, response.message_id);
    assert_eq!(page.messages[0].message, "from the future");
}

#[test]
fn deferred_commit_after_reset_is_a_no_op() {
    let ws = workspace();
    let (_, creator_token, channel_id) = channel_fixture(&ws);
    let future = chrono::Utc::now().timestamp() + 60;

    let (response, _) = ws
        .message_send_later(&creator_token, channel_id, "orphaned", future)
        .unwrap();

    ws.reset();
    ws.commit_deferred(response.message_id);

    let auth = ws.auth_register("fresh@mail.com", "password", "Fresh", "Start").unwrap();
    let fresh_channel = ws.channels_create(&auth.token, "fresh", true).unwrap().channel_id;
    let page = ws.channel_messages(&auth.token, fresh_channel, 0).unwrap();
    assert!(page.messages.is_empty());
}
