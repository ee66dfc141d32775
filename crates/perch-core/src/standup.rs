//! Standups: one pending batch per channel. Lines accumulate while the
//! standup is active; when the timer fires, the drain formats one combined
//! message and appends it through the normal send path under the same
//! store lock as regular sends.

use chrono::Utc;
use tracing::debug;

use perch_types::api::{StandupActiveResponse, StandupStartResponse};
use perch_types::{Error, Result};

use crate::message::append_message;
use crate::perm;
use crate::Workspace;

const MESSAGE_MAX: usize = 1000;

pub(crate) struct Standup {
    /// Account that started the standup; authors the combined message.
    pub starter: u64,
    pub time_finish: i64,
    pub pending: Vec<String>,
}

impl Workspace {
    /// Registers a standup and returns its finish time. The HTTP layer
    /// schedules [`Workspace::standup_finish`] for that instant. Rejected
    /// while another standup is pending for the channel.
    pub fn standup_start(&self, token: &str, channel_id: u64, length: i64) -> Result<StandupStartResponse> {
        self.with_state_mut(|state| {
            let starter = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if state.standups.contains_key(&channel_id) {
                return Err(Error::input("a standup is already active in the channel"));
            }

            let time_finish = Utc::now().timestamp() + length;
            state
                .standups
                .insert(channel_id, Standup { starter, time_finish, pending: Vec::new() });

            debug!(channel_id, time_finish, "standup started");
            Ok(StandupStartResponse { time_finish })
        })
    }

    pub fn standup_active(&self, token: &str, channel_id: u64) -> Result<StandupActiveResponse> {
        self.with_state(|state| {
            state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }

            let standup = state.standups.get(&channel_id);
            Ok(StandupActiveResponse {
                is_active: standup.is_some(),
                time_finish: standup.map(|s| s.time_finish),
            })
        })
    }

    /// Queues `"{handle}: {message}"` into the channel's pending batch.
    pub fn standup_send(&self, token: &str, channel_id: u64, message: &str) -> Result<()> {
        self.with_state_mut(|state| {
            let u_id = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !state.standups.contains_key(&channel_id) {
                return Err(Error::input("no standup is active in the channel"));
            }
            if message.chars().count() > MESSAGE_MAX {
                return Err(Error::input("message is longer than 1000 characters"));
            }

            let handle = state
                .identity
                .account(u_id)
                .map(|a| a.handle.clone())
                .unwrap_or_default();

            if let Some(standup) = state.standups.get_mut(&channel_id) {
                standup.pending.push(format!("{handle}: {message}"));
            }
            Ok(())
        })
    }

    /// Drains the pending batch into one newline-joined message authored
    /// by the starter. A no-op when the standup was cleared by `reset()`
    /// before the timer fired. An empty batch still produces the combined
    /// (empty) message.
    pub fn standup_finish(&self, channel_id: u64) {
        self.with_state_mut(|state| {
            if let Some(standup) = state.standups.remove(&channel_id) {
                let combined = standup.pending.join("\n");
                let message_id = state.membership.allocate_message_id();
                append_message(state, channel_id, message_id, standup.starter, combined);
                debug!(channel_id, message_id, "standup drained");
            }
        });
    }
}
