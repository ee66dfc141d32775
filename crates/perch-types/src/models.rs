//! Domain entities owned by the in-memory stores. Distinct from the API
//! DTOs in `api.rs` so the wire shapes can evolve without touching storage.

/// The single supported reaction kind.
pub const REACT_ID: u64 = 1;

/// Workspace-wide role. The first registered account is the owner; further
/// owners exist only through explicit promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceRole {
    Owner,
    Member,
}

impl WorkspaceRole {
    /// Numeric encoding used on the admin permission-change surface.
    pub fn permission_id(self) -> u64 {
        match self {
            Self::Owner => 1,
            Self::Member => 2,
        }
    }

    pub fn from_permission_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Owner),
            2 => Some(Self::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub u_id: u64,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub role: WorkspaceRole,
    pub profile_img_url: Option<String>,
}

/// One entry per reaction kind. `u_ids` behaves as a set: an account id
/// appears at most once, in the order reactions arrived.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub react_id: u64,
    pub u_ids: Vec<u64>,
}

impl Reaction {
    pub fn empty(react_id: u64) -> Self {
        Self { react_id, u_ids: Vec::new() }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    /// Globally sequential, unique across all channels.
    pub message_id: u64,
    pub author_id: u64,
    pub body: String,
    /// Epoch seconds.
    pub time_created: i64,
    pub reacts: Vec<Reaction>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(message_id: u64, author_id: u64, body: String, time_created: i64) -> Self {
        Self {
            message_id,
            author_id,
            body,
            time_created,
            reacts: vec![Reaction::empty(REACT_ID)],
            is_pinned: false,
        }
    }

    /// The record for the single supported reaction kind.
    pub fn react(&self) -> &Reaction {
        &self.reacts[0]
    }

    pub fn react_mut(&mut self) -> &mut Reaction {
        &mut self.reacts[0]
    }
}

/// `member_ids` and `owner_ids` behave as sets kept in join order; the
/// mutation operations maintain the at-most-once invariant.
#[derive(Debug, Clone)]
pub struct Channel {
    pub channel_id: u64,
    pub name: String,
    pub is_public: bool,
    pub member_ids: Vec<u64>,
    pub owner_ids: Vec<u64>,
    /// Append-only, in arrival order.
    pub messages: Vec<Message>,
}

impl Channel {
    pub fn is_member(&self, u_id: u64) -> bool {
        self.member_ids.contains(&u_id)
    }

    pub fn is_owner(&self, u_id: u64) -> bool {
        self.owner_ids.contains(&u_id)
    }

    pub fn message(&self, message_id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.message_id == message_id)
    }

    pub fn message_mut(&mut self, message_id: u64) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.message_id == message_id)
    }
}
