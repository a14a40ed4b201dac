//! Commit message composition
//!
//! Snapshot commits read `"<label> - <message> [YYYY-MM-DD HH:MM:SS]"` in
//! local time. Post-assistant commits use `"<auto label>: <prompt summary>"`
//! as their message.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Timestamp layout appended to every snapshot commit
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker appended to a truncated summary
pub const ELLIPSIS: &str = "...";

/// Full snapshot commit message
pub fn format_commit_message<Tz>(label: &str, message: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{} - {} [{}]", label, message, at.format(TIMESTAMP_FORMAT))
}

/// Snapshot commit message stamped with the current local time
pub fn commit_message_now(label: &str, message: &str) -> String {
    format_commit_message(label, message, &Local::now())
}

/// Keep the first `limit` characters, appending [`ELLIPSIS`] only when cut.
///
/// Counts `char`s, so multi-byte text is never split mid-character.
pub fn truncate_summary(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
    }
}

/// Message for the commit scheduled after an assistant run
pub fn auto_commit_message(label: &str, prompt: &str, limit: usize) -> String {
    format!("{}: {}", label, truncate_summary(prompt, limit))
}
