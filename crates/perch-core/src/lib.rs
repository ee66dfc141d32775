//! In-memory workspace state and every operation over it.
//!
//! All state lives in one [`WorkspaceState`] behind a single mutex; each
//! operation locks once, runs read-validate-mutate to completion, and
//! unlocks. That lock is the atomicity boundary for the whole store,
//! including standup completions and deferred sends re-entering from
//! timers.

pub mod identity;
pub mod membership;
pub mod pagination;
pub mod perm;

mod channel;
mod channels;
mod message;
mod standup;

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::identity::IdentityRegistry;
use crate::membership::MembershipStore;
use crate::message::DeferredMessage;
use crate::standup::Standup;

pub(crate) struct WorkspaceState {
    pub identity: IdentityRegistry,
    pub membership: MembershipStore,
    /// Active standup per channel, at most one each.
    pub standups: HashMap<u64, Standup>,
    /// Deferred sends parked until their timer fires, keyed by the
    /// pre-allocated message id.
    pub deferred: HashMap<u64, DeferredMessage>,
}

impl WorkspaceState {
    fn new() -> Self {
        Self {
            identity: IdentityRegistry::new(),
            membership: MembershipStore::new(),
            standups: HashMap::new(),
            deferred: HashMap::new(),
        }
    }
}

pub struct Workspace {
    token_secret: String,
    state: Mutex<WorkspaceState>,
}

impl Workspace {
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            state: Mutex::new(WorkspaceState::new()),
        }
    }

    /// Drops every account, session, channel, message, standup and pending
    /// deferred send, and restarts all id counters. Timers that fire after
    /// a reset find nothing to commit and become no-ops.
    pub fn reset(&self) {
        self.with_state_mut(|state| *state = WorkspaceState::new());
        info!("workspace state reset");
    }

    pub(crate) fn token_secret(&self) -> &str {
        &self.token_secret
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&WorkspaceState) -> T) -> T {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    pub(crate) fn with_state_mut<T>(&self, f: impl FnOnce(&mut WorkspaceState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}
