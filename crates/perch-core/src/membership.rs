//! Channel and message ownership. The store hands out entity references
//! and id allocations; the raw maps never leave this module.
//!
//! Both id counters are monotonic and survive deletions: a channel id is
//! never reused and message ids stay globally unique even after removals.

use std::collections::BTreeMap;

use perch_types::models::{Channel, Message};

pub struct MembershipStore {
    channels: BTreeMap<u64, Channel>,
    next_channel_id: u64,
    next_message_id: u64,
}

impl MembershipStore {
    pub(crate) fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
            next_channel_id: 1,
            next_message_id: 1,
        }
    }

    /// Creates a channel with the creator in both the member and owner sets.
    pub(crate) fn create_channel(&mut self, name: &str, is_public: bool, creator: u64) -> u64 {
        let channel_id = self.next_channel_id;
        self.next_channel_id += 1;

        self.channels.insert(
            channel_id,
            Channel {
                channel_id,
                name: name.to_string(),
                is_public,
                member_ids: vec![creator],
                owner_ids: vec![creator],
                messages: Vec::new(),
            },
        );

        channel_id
    }

    pub fn channel(&self, channel_id: u64) -> Option<&Channel> {
        self.channels.get(&channel_id)
    }

    pub(crate) fn channel_mut(&mut self, channel_id: u64) -> Option<&mut Channel> {
        self.channels.get_mut(&channel_id)
    }

    /// Channels in creation order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub(crate) fn allocate_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    /// The channel holding a message, if the message exists anywhere.
    pub fn channel_of_message(&self, message_id: u64) -> Option<u64> {
        self.channels
            .values()
            .find(|c| c.messages.iter().any(|m| m.message_id == message_id))
            .map(|c| c.channel_id)
    }

    pub fn message(&self, message_id: u64) -> Option<&Message> {
        self.channels.values().find_map(|c| c.message(message_id))
    }

    pub(crate) fn message_mut(&mut self, message_id: u64) -> Option<&mut Message> {
        self.channels.values_mut().find_map(|c| c.message_mut(message_id))
    }

    /// Grants channel ownership in every channel the account is a member
    /// of. Used when an account is promoted to workspace owner.
    pub(crate) fn promote_member_everywhere(&mut self, u_id: u64) {
        for channel in self.channels.values_mut() {
            if channel.is_member(u_id) && !channel.is_owner(u_id) {
                channel.owner_ids.push(u_id);
            }
        }
    }
}
