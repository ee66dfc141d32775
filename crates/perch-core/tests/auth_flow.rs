use perch_core::Workspace;
use perch_types::Error;

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

#[test]
fn registration_assigns_sequential_ids() {
    let ws = workspace();
    let (first, _) = register(&ws, 0);
    let (second, _) = register(&ws, 1);
    let (third, _) = register(&ws, 2);
    assert_eq!((first, second, third), (0, 1, 2));
}

#[test]
fn duplicate_email_is_rejected() {
    let ws = workspace();
    register(&ws, 0);
    let err = ws
        .auth_register("user0@mail.com", "password", "Other", "Person")
        .unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

#[test]
fn register_validates_password_email_and_names() {
    let ws = workspace();
    assert!(matches!(
        ws.auth_register("short@mail.com", "pass", "Short", "Pass").unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.auth_register("not-an-email", "password", "Bad", "Email").unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.auth_register("noname@mail.com", "password", "", "Last").unwrap_err(),
        Error::Input(_)
    ));
    let long = "a".repeat(51);
    assert!(matches!(
        ws.auth_register("longname@mail.com", "password", "First", &long).unwrap_err(),
        Error::Input(_)
    ));
}

#[test]
fn generated_handles_are_deduplicated() {
    let ws = workspace();
    let first = ws.auth_register("jo1@mail.com", "password", "Jo", "Smith").unwrap();
    let second = ws.auth_register("jo2@mail.com", "password", "Jo", "Smith").unwrap();

    let first_profile = ws.user_profile(&first.token, first.u_id).unwrap().user;
    let second_profile = ws.user_profile(&first.token, second.u_id).unwrap().user;

    assert_eq!(first_profile.handle_str, "josmith");
    assert_eq!(second_profile.handle_str, "josmit");
}

#[test]
fn long_names_truncate_handle_to_twenty_chars() {
    let ws = workspace();
    let auth = ws
        .auth_register("long@mail.com", "password", "Abcdefghijklm", "Nopqrstuvwxyz")
        .unwrap();
    let profile = ws.user_profile(&auth.token, auth.u_id).unwrap().user;
    assert_eq!(profile.handle_str.chars().count(), 20);
}

#[test]
fn second_login_while_logged_in_is_rejected() {
    let ws = workspace();
    register(&ws, 0);
    let err = ws.auth_login("user0@mail.com", "password").unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

#[test]
fn logout_then_login_reissues_the_same_token() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);

    assert!(ws.auth_logout(&token).is_success);

    // The token is a deterministic re-encoding of the account id, so a
    // fresh login yields the same capability string.
    let again = ws.auth_login("user0@mail.com", "password").unwrap();
    assert_eq!(again.token, token);
}

#[test]
fn login_with_wrong_password_or_unknown_email_fails() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);
    ws.auth_logout(&token);

    assert!(matches!(
        ws.auth_login("user0@mail.com", "wrong-password").unwrap_err(),
        Error::Input(_)
    ));
    assert!(matches!(
        ws.auth_login("nobody@mail.com", "password").unwrap_err(),
        Error::Input(_)
    ));
}

#[test]
fn logout_of_unknown_token_reports_failure() {
    let ws = workspace();
    assert!(!ws.auth_logout("bogus").is_success);
}

#[test]
fn logged_out_token_no_longer_resolves() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);
    ws.auth_logout(&token);

    let err = ws.users_all(&token).unwrap_err();
    assert!(matches!(err, Error::Access(_)));
}

#[test]
fn profile_updates_apply_and_validate() {
    let ws = workspace();
    let (u_id, token) = register(&ws, 0);

    ws.user_set_name(&token, "New", "Name").unwrap();
    ws.user_set_email(&token, "fresh@mail.com").unwrap();
    ws.user_set_handle(&token, "freshhandle").unwrap();

    let profile = ws.user_profile(&token, u_id).unwrap().user;
    assert_eq!(profile.name_first, "New");
    assert_eq!(profile.name_last, "Name");
    assert_eq!(profile.email, "fresh@mail.com");
    assert_eq!(profile.handle_str, "freshhandle");

    assert!(matches!(ws.user_set_handle(&token, "ab").unwrap_err(), Error::Input(_)));
    assert!(matches!(ws.user_set_email(&token, "nope").unwrap_err(), Error::Input(_)));
}

#[test]
fn taken_email_and_handle_cannot_be_claimed() {
    let ws = workspace();
    let (_, token0) = register(&ws, 0);
    let (_, token1) = register(&ws, 1);

    assert!(matches!(
        ws.user_set_email(&token1, "user0@mail.com").unwrap_err(),
        Error::Input(_)
    ));

    ws.user_set_handle(&token0, "claimed").unwrap();
    assert!(matches!(
        ws.user_set_handle(&token1, "claimed").unwrap_err(),
        Error::Input(_)
    ));
}

#[test]
fn users_all_lists_accounts_in_registration_order() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);
    register(&ws, 1);
    register(&ws, 2);

    let users = ws.users_all(&token).unwrap().users;
    let ids: Vec<u64> = users.iter().map(|u| u.u_id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn unknown_profile_lookup_is_input_error() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);
    assert!(matches!(ws.user_profile(&token, 42).unwrap_err(), Error::Input(_)));
}

#[test]
fn reset_drops_accounts_sessions_and_counters() {
    let ws = workspace();
    let (_, token) = register(&ws, 0);
    register(&ws, 1);

    ws.reset();

    assert!(matches!(ws.users_all(&token).unwrap_err(), Error::Access(_)));

    // Counters restart: the next registrant is id 0 and workspace owner again.
    let auth = ws.auth_register("fresh@mail.com", "password", "Fresh", "Start").unwrap();
    assert_eq!(auth.u_id, 0);
}
