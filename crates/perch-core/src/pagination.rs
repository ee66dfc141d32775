//! Reverse-chronological message pagination with caller-relative reaction
//! projection.

use perch_types::api::{MessageView, MessagesPage, ReactView};
use perch_types::models::{Channel, Message};
use perch_types::{Error, Result};

/// Maximum number of messages returned per page.
pub const PAGE_SIZE: usize = 50;

/// Projects a stored message for a particular viewer.
/// `is_this_user_reacted` is relative to the caller and is recomputed on
/// every request; it is never stored on the message.
pub fn project_message(message: &Message, viewer: u64) -> MessageView {
    MessageView {
        message_id: message.message_id,
        u_id: message.author_id,
        message: message.body.clone(),
        time_created: message.time_created,
        reacts: message
            .reacts
            .iter()
            .map(|r| ReactView {
                react_id: r.react_id,
                u_ids: r.u_ids.clone(),
                is_this_user_reacted: r.u_ids.contains(&viewer),
            })
            .collect(),
        is_pinned: message.is_pinned,
    }
}

/// Returns up to [`PAGE_SIZE`] messages beginning at reverse-index `start`,
/// most recent first. `end` is `start + PAGE_SIZE` when that many messages
/// remained after `start`, and `-1` when this page reached the oldest
/// message. An empty channel with `start == 0` is a success, not an error.
pub fn page_messages(channel: &Channel, viewer: u64, start: usize) -> Result<MessagesPage> {
    let total = channel.messages.len();

    if total == 0 && start == 0 {
        return Ok(MessagesPage { messages: Vec::new(), start: 0, end: -1 });
    }

    if start >= total {
        return Err(Error::input("start is beyond the oldest message"));
    }

    let messages: Vec<MessageView> = channel
        .messages
        .iter()
        .rev()
        .skip(start)
        .take(PAGE_SIZE)
        .map(|m| project_message(m, viewer))
        .collect();

    let end = if messages.len() == PAGE_SIZE {
        (start + PAGE_SIZE) as i64
    } else {
        -1
    };

    Ok(MessagesPage { messages, start, end })
}
