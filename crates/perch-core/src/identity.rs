//! Account and session ownership: registration, login, tokens, profiles,
//! and workspace-role administration.
//!
//! A session token is the deterministic HS256 encoding of `{ u_id }` under
//! the workspace secret, so the same account always re-encodes to the same
//! token. Resolution never decodes the JWT: it is a lookup over the
//! currently-held sessions, which keeps the registry usable from a
//! non-HTTP harness.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use perch_types::api::{AuthResponse, LogoutResponse, UserProfile, UserProfileResponse, UsersAllResponse};
use perch_types::models::{Account, WorkspaceRole};
use perch_types::{Error, Result};

use crate::{Workspace, WorkspaceState};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+[._]?[a-z0-9]+@\w+\.\w{2,3}$").expect("valid email pattern"));

const HANDLE_MAX: usize = 20;

pub struct IdentityRegistry {
    accounts: BTreeMap<u64, Account>,
    /// token -> account id. Tokens are unique by construction.
    sessions: HashMap<String, u64>,
    next_u_id: u64,
}

impl IdentityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            sessions: HashMap::new(),
            next_u_id: 0,
        }
    }

    /// Maps a session token to its account id.
    pub fn resolve_token(&self, token: &str) -> Result<u64> {
        self.sessions
            .get(token)
            .copied()
            .ok_or_else(|| Error::access("token invalid"))
    }

    pub fn account_exists(&self, u_id: u64) -> bool {
        self.accounts.contains_key(&u_id)
    }

    pub fn account(&self, u_id: u64) -> Option<&Account> {
        self.accounts.get(&u_id)
    }

    pub(crate) fn account_mut(&mut self, u_id: u64) -> Option<&mut Account> {
        self.accounts.get_mut(&u_id)
    }

    /// Accounts in registration order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.email == email)
    }

    fn email_taken(&self, email: &str) -> bool {
        self.account_by_email(email).is_some()
    }

    fn handle_taken(&self, handle: &str) -> bool {
        self.accounts.values().any(|a| a.handle == handle)
    }

    /// Lowercased first+last truncated to 20 chars, de-duplicated by
    /// trimming trailing characters until unused.
    fn generate_handle(&self, name_first: &str, name_last: &str) -> String {
        let mut handle: String = format!("{}{}", name_first.to_lowercase(), name_last.to_lowercase())
            .chars()
            .take(HANDLE_MAX)
            .collect();
        while !handle.is_empty() && self.handle_taken(&handle) {
            handle.pop();
        }
        handle
    }

    fn has_session_for(&self, u_id: u64) -> bool {
        self.sessions.values().any(|&id| id == u_id)
    }
}

#[derive(Serialize)]
struct TokenClaims {
    u_id: u64,
}

fn issue_token(secret: &str, u_id: u64) -> Result<String> {
    encode(
        &Header::default(),
        &TokenClaims { u_id },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| Error::access("token could not be issued"))
}

fn digest_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| Error::input("password could not be digested"))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn profile_of(account: &Account) -> UserProfile {
    UserProfile {
        u_id: account.u_id,
        email: account.email.clone(),
        name_first: account.name_first.clone(),
        name_last: account.name_last.clone(),
        handle_str: account.handle.clone(),
        profile_img_url: account.profile_img_url.clone(),
    }
}

/// Login against an already-locked state; registration reuses this so the
/// registration-issued token is created before any session exists.
fn login_locked(state: &mut WorkspaceState, secret: &str, email: &str, password: &str) -> Result<AuthResponse> {
    if !EMAIL_RE.is_match(email) {
        return Err(Error::input("email invalid"));
    }

    let account = state
        .identity
        .account_by_email(email)
        .ok_or_else(|| Error::input("email not registered"))?;
    let u_id = account.u_id;

    if !verify_password(password, &account.password_hash) {
        return Err(Error::input("password is invalid"));
    }

    if state.identity.has_session_for(u_id) {
        return Err(Error::input("user already logged in"));
    }

    let token = issue_token(secret, u_id)?;
    state.identity.sessions.insert(token.clone(), u_id);

    Ok(AuthResponse { u_id, token })
}

impl Workspace {
    pub fn auth_register(
        &self,
        email: &str,
        password: &str,
        name_first: &str,
        name_last: &str,
    ) -> Result<AuthResponse> {
        self.with_state_mut(|state| {
            if state.identity.email_taken(email) {
                return Err(Error::input("email is already taken"));
            }
            if char_len(password) < 6 {
                return Err(Error::input("password length less than 6"));
            }
            if !EMAIL_RE.is_match(email) {
                return Err(Error::input("email invalid"));
            }
            if char_len(name_first) < 1 || char_len(name_first) > 50 {
                return Err(Error::input("first name must be between 1 and 50 characters"));
            }
            if char_len(name_last) < 1 || char_len(name_last) > 50 {
                return Err(Error::input("last name must be between 1 and 50 characters"));
            }

            let handle = state.identity.generate_handle(name_first, name_last);
            let password_hash = digest_password(password)?;

            // First registrant becomes the workspace owner.
            let role = if state.identity.accounts.is_empty() {
                WorkspaceRole::Owner
            } else {
                WorkspaceRole::Member
            };

            let u_id = state.identity.next_u_id;
            state.identity.next_u_id += 1;

            state.identity.accounts.insert(
                u_id,
                Account {
                    u_id,
                    email: email.to_string(),
                    password_hash,
                    name_first: name_first.to_string(),
                    name_last: name_last.to_string(),
                    handle,
                    role,
                    profile_img_url: None,
                },
            );

            debug!(u_id, "account registered");

            login_locked(state, self.token_secret(), email, password)
        })
    }

    pub fn auth_login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.with_state_mut(|state| login_locked(state, self.token_secret(), email, password))
    }

    /// Never errors: an unknown token reports `is_success: false`.
    pub fn auth_logout(&self, token: &str) -> LogoutResponse {
        self.with_state_mut(|state| LogoutResponse {
            is_success: state.identity.sessions.remove(token).is_some(),
        })
    }

    pub fn user_profile(&self, token: &str, u_id: u64) -> Result<UserProfileResponse> {
        self.with_state(|state| {
            state.identity.resolve_token(token)?;
            let account = state
                .identity
                .account(u_id)
                .ok_or_else(|| Error::input("user id does not exist"))?;
            Ok(UserProfileResponse { user: profile_of(account) })
        })
    }

    pub fn user_set_name(&self, token: &str, name_first: &str, name_last: &str) -> Result<()> {
        self.with_state_mut(|state| {
            let u_id = state.identity.resolve_token(token)?;
            if char_len(name_first) < 1 || char_len(name_first) > 50 {
                return Err(Error::input("first name must be between 1 and 50 characters"));
            }
            if char_len(name_last) < 1 || char_len(name_last) > 50 {
                return Err(Error::input("last name must be between 1 and 50 characters"));
            }
            if let Some(account) = state.identity.account_mut(u_id) {
                account.name_first = name_first.to_string();
                account.name_last = name_last.to_string();
            }
            Ok(())
        })
    }

    pub fn user_set_email(&self, token: &str, email: &str) -> Result<()> {
        self.with_state_mut(|state| {
            let u_id = state.identity.resolve_token(token)?;
            if !EMAIL_RE.is_match(email) {
                return Err(Error::input("email invalid"));
            }
            if state.identity.email_taken(email) {
                return Err(Error::input("email is already being used"));
            }
            if let Some(account) = state.identity.account_mut(u_id) {
                account.email = email.to_string();
            }
            Ok(())
        })
    }

    pub fn user_set_handle(&self, token: &str, handle: &str) -> Result<()> {
        self.with_state_mut(|state| {
            let u_id = state.identity.resolve_token(token)?;
            if char_len(handle) < 3 || char_len(handle) > HANDLE_MAX {
                return Err(Error::input("handle must be between 3 and 20 characters"));
            }
            if state.identity.handle_taken(handle) {
                return Err(Error::input("handle is already being used"));
            }
            if let Some(account) = state.identity.account_mut(u_id) {
                account.handle = handle.to_string();
            }
            Ok(())
        })
    }

    pub fn users_all(&self, token: &str) -> Result<UsersAllResponse> {
        self.with_state(|state| {
            state.identity.resolve_token(token)?;
            Ok(UsersAllResponse {
                users: state.identity.accounts().map(profile_of).collect(),
            })
        })
    }

    /// Changes an account's workspace role. Promoting to owner also grants
    /// channel ownership in every channel the account is a member of.
    pub fn admin_permission_change(&self, token: &str, u_id: u64, permission_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let role = WorkspaceRole::from_permission_id(permission_id)
                .ok_or_else(|| Error::input("permission id invalid"))?;

            let actor = state.identity.resolve_token(token)?;
            if !state.identity.account_exists(u_id) {
                return Err(Error::input("user id does not exist"));
            }
            if !crate::perm::is_workspace_owner(&state.identity, actor) {
                return Err(Error::access("authorised user is not a workspace owner"));
            }

            if let Some(account) = state.identity.account_mut(u_id) {
                account.role = role;
            }

            if role == WorkspaceRole::Owner {
                state.membership.promote_member_everywhere(u_id);
            }

            Ok(())
        })
    }
}
