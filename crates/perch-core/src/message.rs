//! Message mutation operations: send, deferred send, edit, remove, react,
//! unreact, pin, unpin, and search.

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use perch_types::api::{SearchResponse, SendMessageResponse};
use perch_types::models::{Message, REACT_ID};
use perch_types::{Error, Result};

use crate::pagination::project_message;
use crate::perm;
use crate::{Workspace, WorkspaceState};

const MESSAGE_MAX: usize = 1000;

/// A send parked until its timer fires. The message id is allocated when
/// the send is accepted, so the caller learns it up front; `reset()`
/// discards pending entries, turning an already-scheduled commit into a
/// no-op.
pub(crate) struct DeferredMessage {
    pub channel_id: u64,
    pub author_id: u64,
    pub body: String,
}

fn body_len(body: &str) -> usize {
    body.chars().count()
}

/// Appends a message to a channel under the store lock. All send paths
/// (immediate, deferred commit, standup drain) funnel through here.
pub(crate) fn append_message(
    state: &mut WorkspaceState,
    channel_id: u64,
    message_id: u64,
    author_id: u64,
    body: String,
) {
    let time_created = Utc::now().timestamp();
    if let Some(channel) = state.membership.channel_mut(channel_id) {
        channel
            .messages
            .push(Message::new(message_id, author_id, body, time_created));
    }
}

impl Workspace {
    pub fn message_send(&self, token: &str, channel_id: u64, body: &str) -> Result<SendMessageResponse> {
        self.with_state_mut(|state| {
            let author = state.identity.resolve_token(token)?;
            if body_len(body) > MESSAGE_MAX {
                return Err(Error::input("message is longer than 1000 characters"));
            }
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::access("channel does not exist"));
            }
            if !perm::is_member(&state.membership, author, channel_id) {
                return Err(Error::access("authorised user is not in the channel"));
            }

            let message_id = state.membership.allocate_message_id();
            append_message(state, channel_id, message_id, author, body.to_string());
            Ok(SendMessageResponse { message_id })
        })
    }

    /// Accepts a deferred send: validates now, allocates the message id,
    /// and parks the body. The caller schedules [`Workspace::commit_deferred`]
    /// for the fire time. Returns the allocated id and the fire time.
    pub fn message_send_later(
        &self,
        token: &str,
        channel_id: u64,
        body: &str,
        time_sent: i64,
    ) -> Result<(SendMessageResponse, i64)> {
        self.with_state_mut(|state| {
            let author = state.identity.resolve_token(token)?;
            if body_len(body) > MESSAGE_MAX {
                return Err(Error::input("message is longer than 1000 characters"));
            }
            if body.is_empty() {
                return Err(Error::input("no message entered"));
            }
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !perm::is_member(&state.membership, author, channel_id) {
                return Err(Error::access("authorised user is not in the channel"));
            }
            if time_sent < Utc::now().timestamp() {
                return Err(Error::input("cannot send a message into the past"));
            }

            let message_id = state.membership.allocate_message_id();
            state.deferred.insert(
                message_id,
                DeferredMessage { channel_id, author_id: author, body: body.to_string() },
            );
            debug!(message_id, channel_id, time_sent, "deferred send accepted");
            Ok((SendMessageResponse { message_id }, time_sent))
        })
    }

    /// Lands a parked deferred send in its channel. A no-op when the
    /// pending entry was cleared by `reset()` before the timer fired.
    pub fn commit_deferred(&self, message_id: u64) {
        self.with_state_mut(|state| {
            if let Some(pending) = state.deferred.remove(&message_id) {
                append_message(state, pending.channel_id, message_id, pending.author_id, pending.body);
                debug!(message_id, "deferred send committed");
            }
        });
    }

    /// An empty new body is a valid edit to the empty string, not a
    /// removal.
    pub fn message_edit(&self, token: &str, message_id: u64, body: &str) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if body_len(body) > MESSAGE_MAX {
                return Err(Error::input("message is longer than 1000 characters"));
            }
            let channel_id = state
                .membership
                .channel_of_message(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;

            let is_author = state
                .membership
                .message(message_id)
                .is_some_and(|m| m.author_id == actor);
            if !is_author && !perm::can_moderate(&state.identity, &state.membership, actor, channel_id) {
                return Err(Error::access("not the author and not an owner"));
            }

            if let Some(message) = state.membership.message_mut(message_id) {
                message.body = body.to_string();
            }
            Ok(())
        })
    }

    pub fn message_remove(&self, token: &str, message_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            let channel_id = state
                .membership
                .channel_of_message(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;

            let is_author = state
                .membership
                .message(message_id)
                .is_some_and(|m| m.author_id == actor);
            if !is_author && !perm::can_moderate(&state.identity, &state.membership, actor, channel_id) {
                return Err(Error::access("not the author and not an owner"));
            }

            if let Some(channel) = state.membership.channel_mut(channel_id) {
                channel.messages.retain(|m| m.message_id != message_id);
            }
            Ok(())
        })
    }

    /// Membership is not required to react; only the message must exist.
    pub fn message_react(&self, token: &str, message_id: u64, react_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if state.membership.message(message_id).is_none() {
                return Err(Error::input("message does not exist"));
            }
            if react_id != REACT_ID {
                return Err(Error::input("react id invalid"));
            }

            let react = state
                .membership
                .message_mut(message_id)
                .map(|m| m.react_mut())
                .ok_or_else(|| Error::input("message does not exist"))?;
            if react.u_ids.contains(&actor) {
                return Err(Error::input("already reacted to this message"));
            }
            react.u_ids.push(actor);
            Ok(())
        })
    }

    pub fn message_unreact(&self, token: &str, message_id: u64, react_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if state.membership.message(message_id).is_none() {
                return Err(Error::input("message does not exist"));
            }
            if react_id != REACT_ID {
                return Err(Error::input("react id invalid"));
            }

            let react = state
                .membership
                .message_mut(message_id)
                .map(|m| m.react_mut())
                .ok_or_else(|| Error::input("message does not exist"))?;
            if !react.u_ids.contains(&actor) {
                return Err(Error::input("have not reacted to this message"));
            }
            react.u_ids.retain(|&id| id != actor);
            Ok(())
        })
    }

    /// Pinning requires channel ownership specifically: a workspace owner
    /// outside the channel's owner set is rejected here, unlike edit and
    /// remove.
    pub fn message_pin(&self, token: &str, message_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            let channel_id = state
                .membership
                .channel_of_message(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;

            if !perm::is_owner_of_channel(&state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not an owner of the channel"));
            }

            let message = state
                .membership
                .message_mut(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;
            if message.is_pinned {
                return Err(Error::input("message is already pinned"));
            }
            message.is_pinned = true;
            Ok(())
        })
    }

    pub fn message_unpin(&self, token: &str, message_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            let channel_id = state
                .membership
                .channel_of_message(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;

            if !perm::is_owner_of_channel(&state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not an owner of the channel"));
            }

            let message = state
                .membership
                .message_mut(message_id)
                .ok_or_else(|| Error::input("message does not exist"))?;
            if !message.is_pinned {
                return Err(Error::input("message is already unpinned"));
            }
            message.is_pinned = false;
            Ok(())
        })
    }

    /// Regex search over the messages of every channel the caller belongs
    /// to, with the same viewer-relative projection as pagination.
    pub fn search(&self, token: &str, query: &str) -> Result<SearchResponse> {
        self.with_state(|state| {
            let u_id = state.identity.resolve_token(token)?;
            let pattern = Regex::new(query).map_err(|_| Error::input("search pattern invalid"))?;

            let messages = state
                .membership
                .channels()
                .filter(|c| c.is_member(u_id))
                .flat_map(|c| c.messages.iter())
                .filter(|m| pattern.is_match(&m.body))
                .map(|m| project_message(m, u_id))
                .collect();

            Ok(SearchResponse { messages })
        })
    }
}
