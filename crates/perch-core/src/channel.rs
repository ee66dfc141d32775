//! Per-channel membership operations: invite, details, messages, leave,
//! join, add-owner, remove-owner.

use perch_types::api::{ChannelDetailsResponse, MemberProfile, MessagesPage};
use perch_types::{Error, Result};

use crate::identity::IdentityRegistry;
use crate::pagination;
use crate::perm;
use crate::Workspace;

fn member_profiles(identity: &IdentityRegistry, ids: &[u64]) -> Vec<MemberProfile> {
    // Cross-store references are weak: a missing account is a lookup miss,
    // not a panic.
    ids.iter()
        .filter_map(|&u_id| identity.account(u_id))
        .map(|account| MemberProfile {
            u_id: account.u_id,
            name_first: account.name_first.clone(),
            name_last: account.name_last.clone(),
            profile_img_url: account.profile_img_url.clone(),
        })
        .collect()
}

impl Workspace {
    /// Adds the target to the member set only, never the owner set.
    pub fn channel_invite(&self, token: &str, channel_id: u64, u_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !state.identity.account_exists(u_id) {
                return Err(Error::input("user id does not exist"));
            }
            if !perm::is_member(&state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not in the channel"));
            }
            if perm::is_member(&state.membership, u_id, channel_id) {
                return Err(Error::access("user is already in the channel"));
            }

            if let Some(channel) = state.membership.channel_mut(channel_id) {
                channel.member_ids.push(u_id);
            }
            Ok(())
        })
    }

    pub fn channel_details(&self, token: &str, channel_id: u64) -> Result<ChannelDetailsResponse> {
        self.with_state(|state| {
            let actor = state.identity.resolve_token(token)?;
            let channel = state
                .membership
                .channel(channel_id)
                .ok_or_else(|| Error::input("channel does not exist"))?;
            if !channel.is_member(actor) {
                return Err(Error::access("authorised user is not in the channel"));
            }

            Ok(ChannelDetailsResponse {
                name: channel.name.clone(),
                owner_members: member_profiles(&state.identity, &channel.owner_ids),
                all_members: member_profiles(&state.identity, &channel.member_ids),
            })
        })
    }

    pub fn channel_messages(&self, token: &str, channel_id: u64, start: usize) -> Result<MessagesPage> {
        self.with_state(|state| {
            let actor = state.identity.resolve_token(token)?;
            let channel = state
                .membership
                .channel(channel_id)
                .ok_or_else(|| Error::input("channel does not exist"))?;
            if !channel.is_member(actor) {
                return Err(Error::access("authorised user is not in the channel"));
            }

            pagination::page_messages(channel, actor, start)
        })
    }

    /// Leaving drops membership and, with it, channel-owner status: the
    /// owner set stays a subset of the member set.
    pub fn channel_leave(&self, token: &str, channel_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !perm::is_member(&state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not in the channel"));
            }

            if let Some(channel) = state.membership.channel_mut(channel_id) {
                channel.member_ids.retain(|&id| id != actor);
                channel.owner_ids.retain(|&id| id != actor);
            }
            Ok(())
        })
    }

    /// Private channels admit only the workspace owner, who additionally
    /// lands in the owner set of any channel they join.
    pub fn channel_join(&self, token: &str, channel_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            let is_workspace_owner = perm::is_workspace_owner(&state.identity, actor);
            let channel = state
                .membership
                .channel_mut(channel_id)
                .ok_or_else(|| Error::input("channel does not exist"))?;

            if !channel.is_public && !is_workspace_owner {
                return Err(Error::access("channel is private"));
            }

            if !channel.is_member(actor) {
                channel.member_ids.push(actor);
            }
            if is_workspace_owner && !channel.is_owner(actor) {
                channel.owner_ids.push(actor);
            }
            Ok(())
        })
    }

    /// The target must already be a member, so channel owners always stay
    /// a subset of the member set.
    pub fn channel_add_owner(&self, token: &str, channel_id: u64, u_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !perm::can_moderate(&state.identity, &state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not a channel or workspace owner"));
            }
            if !perm::is_member(&state.membership, u_id, channel_id) {
                return Err(Error::input("user is not a member of the channel"));
            }
            if perm::is_owner_of_channel(&state.membership, u_id, channel_id) {
                return Err(Error::input("user is already an owner"));
            }

            if let Some(channel) = state.membership.channel_mut(channel_id) {
                channel.owner_ids.push(u_id);
            }
            Ok(())
        })
    }

    /// Removing the last owner is permitted; no minimum-owner invariant.
    pub fn channel_remove_owner(&self, token: &str, channel_id: u64, u_id: u64) -> Result<()> {
        self.with_state_mut(|state| {
            let actor = state.identity.resolve_token(token)?;
            if !perm::is_channel_valid(&state.membership, channel_id) {
                return Err(Error::input("channel does not exist"));
            }
            if !perm::can_moderate(&state.identity, &state.membership, actor, channel_id) {
                return Err(Error::access("authorised user is not a channel or workspace owner"));
            }
            if !perm::is_owner_of_channel(&state.membership, u_id, channel_id) {
                return Err(Error::input("user is not an owner"));
            }

            if let Some(channel) = state.membership.channel_mut(channel_id) {
                channel.owner_ids.retain(|&id| id != u_id);
            }
            Ok(())
        })
    }
}
