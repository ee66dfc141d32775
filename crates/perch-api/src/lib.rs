//! HTTP handlers for the workspace operations. Each handler extracts the
//! bearer token, delegates to `perch-core`, and maps the domain error
//! kinds onto the 400 JSON envelope.

pub mod admin;
pub mod auth;
pub mod channels;
pub mod error;
pub mod extract;
pub mod messages;
pub mod standup;
pub mod users;

use std::sync::Arc;

use perch_core::Workspace;

pub type AppState = Arc<Workspace>;
