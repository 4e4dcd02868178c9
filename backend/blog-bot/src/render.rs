/// Plain-text rendering of posts and API failures
use std::borrow::Cow;

use crate::client::{ApiError, Post};

/// Telegram's message limit, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

pub const SESSION_EXPIRED: &str = "Your session has expired, please log in again.";
pub const UNREACHABLE: &str = "Could not reach the server. Try again later.";
pub const BAD_RESPONSE: &str = "The server sent an unexpected response.";
pub const NO_POSTS: &str = "There are no posts yet.";
pub const POSTS_SKIPPED: &str = "Some posts could not be shown.";

pub fn post_text(post: &Post) -> String {
    let when = post
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    let header = format!("📄 {}\n\n", post.title);
    let footer = format!("\n\nAuthor: {} | {}", post.owner.username, when);
    let budget = MAX_MESSAGE_LEN.saturating_sub(utf16_len(&header) + utf16_len(&footer));

    format!("{}{}{}", header, clip(&post.content, budget), footer)
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// `text` cut to at most `budget` UTF-16 units, ending in an ellipsis when shortened.
fn clip(text: &str, budget: usize) -> Cow<'_, str> {
    if utf16_len(text) <= budget {
        return Cow::Borrowed(text);
    }

    let keep = budget.saturating_sub(1);
    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        if used + ch.len_utf16() > keep {
            break;
        }
        used += ch.len_utf16();
        end = idx + ch.len_utf8();
    }

    Cow::Owned(format!("{}…", &text[..end]))
}

/// Message for a failed API call. `Unauthorized` is reported as an expired session.
pub fn failure_text(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized(_) => SESSION_EXPIRED.to_string(),
        ApiError::Status { detail, .. } => format!("Error: {}", detail),
        ApiError::Transport(_) => UNREACHABLE.to_string(),
        ApiError::Decode(_) => BAD_RESPONSE.to_string(),
    }
}
