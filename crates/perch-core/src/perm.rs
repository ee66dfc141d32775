//! Authorization decisions, stateless over registry and store snapshots.
//!
//! Every mutating operation follows the same validation order: token,
//! then target existence, then authorization, then operation invariants.
//! The functions here answer the authorization step.

use perch_types::models::WorkspaceRole;

use crate::identity::IdentityRegistry;
use crate::membership::MembershipStore;

pub fn is_channel_valid(membership: &MembershipStore, channel_id: u64) -> bool {
    membership.channel(channel_id).is_some()
}

pub fn is_member(membership: &MembershipStore, u_id: u64, channel_id: u64) -> bool {
    membership.channel(channel_id).is_some_and(|c| c.is_member(u_id))
}

pub fn is_owner_of_channel(membership: &MembershipStore, u_id: u64, channel_id: u64) -> bool {
    membership.channel(channel_id).is_some_and(|c| c.is_owner(u_id))
}

pub fn is_workspace_owner(identity: &IdentityRegistry, u_id: u64) -> bool {
    identity.account(u_id).is_some_and(|a| a.role == WorkspaceRole::Owner)
}

/// Channel owner or workspace owner. Gates add/remove-owner and the
/// moderator override on edit/remove. Pin deliberately does not use this:
/// it requires channel ownership specifically.
pub fn can_moderate(
    identity: &IdentityRegistry,
    membership: &MembershipStore,
    u_id: u64,
    channel_id: u64,
) -> bool {
    is_owner_of_channel(membership, u_id, channel_id) || is_workspace_owner(identity, u_id)
}
