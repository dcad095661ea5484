//! Terminal rendering of chat messages.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use super::message::{ChatMessage, Sender};
use crate::reply::split_ai_content;

pub const USER_AVATAR: &str = "👤";
pub const AI_AVATAR: &str = "🤖";

/// Render `msg` with its time shown in the local time zone.
pub fn render_message(msg: &ChatMessage) -> String {
    render_message_in(msg, &Local)
}

/// Render `msg` with its time shown in `tz`.
pub fn render_message_in<Tz>(msg: &ChatMessage, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = local_time(&msg.timestamp, tz);
    match msg.sender {
        Sender::User => format!("{USER_AVATAR} [{time}]\n{}\n", msg.content),
        Sender::Ai => {
            let parts = split_ai_content(&msg.content);
            let model = msg.model.as_deref().map(|m| format!(" ({m})")).unwrap_or_default();
            format!(
                "{AI_AVATAR} [{time}]{model}\n📝 Summary: {}\n💬 AI Response:\n{}\n",
                parts.summary, parts.response
            )
        }
    }
}

/// A one-off assistant notice that is shown but never stored.
pub fn render_notice(text: &str) -> String {
    format!("{AI_AVATAR} [{}]\n{text}\n", Local::now().format("%H:%M:%S"))
}

/// `HH:MM:SS` in `tz`; unparseable timestamps are shown as stored.
fn local_time<Tz>(timestamp: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
