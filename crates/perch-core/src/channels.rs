//! Channel collection operations: create, list, list-all.

use perch_types::api::{ChannelCreateResponse, ChannelListResponse, ChannelSummary};
use perch_types::{Error, Result};

use crate::Workspace;

const CHANNEL_NAME_MAX: usize = 20;

impl Workspace {
    pub fn channels_create(&self, token: &str, name: &str, is_public: bool) -> Result<ChannelCreateResponse> {
        self.with_state_mut(|state| {
            let creator = state.identity.resolve_token(token)?;

            let name_len = name.chars().count();
            if name_len > CHANNEL_NAME_MAX {
                return Err(Error::input("channel name is longer than 20 characters"));
            }
            if name_len == 0 {
                return Err(Error::input("no channel name entered"));
            }

            let channel_id = state.membership.create_channel(name, is_public, creator);
            Ok(ChannelCreateResponse { channel_id })
        })
    }

    /// The channels the caller belongs to, in creation order.
    pub fn channels_list(&self, token: &str) -> Result<ChannelListResponse> {
        self.with_state(|state| {
            let u_id = state.identity.resolve_token(token)?;
            Ok(ChannelListResponse {
                channels: state
                    .membership
                    .channels()
                    .filter(|c| c.is_member(u_id))
                    .map(|c| ChannelSummary { channel_id: c.channel_id, name: c.name.clone() })
                    .collect(),
            })
        })
    }

    /// Every channel, public and private alike.
    pub fn channels_list_all(&self, token: &str) -> Result<ChannelListResponse> {
        self.with_state(|state| {
            state.identity.resolve_token(token)?;
            Ok(ChannelListResponse {
                channels: state
                    .membership
                    .channels()
                    .map(|c| ChannelSummary { channel_id: c.channel_id, name: c.name.clone() })
                    .collect(),
            })
        })
    }
}
