use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    /// Accepts "bot" from caches written by the browser client
    #[serde(alias = "bot")]
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One turn in a thread.
///
/// Messages are append-only and ordered by `ts` ascending. The server dedups
/// on the full `(role, content, ts)` triple using the timestamp text exactly
/// as it was written, so a message read from the server keeps that text and
/// writes it back unchanged. Equality follows the same rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WireMessage", into = "WireMessage")]
pub struct Message {
    pub role: MessageRole,
    /// Message body (legacy caches call it "text")
    pub content: String,
    pub ts: DateTime<Utc>,
    /// Timestamp text as received, if this message came off the wire
    wire_ts: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: MessageRole,
    #[serde(alias = "text")]
    content: String,
    ts: String,
}

impl TryFrom<WireMessage> for Message {
    type Error = chrono::ParseError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let ts = parse_wire_ts(&wire.ts)?;
        Ok(Self {
            role: wire.role,
            content: wire.content,
            ts,
            wire_ts: Some(wire.ts),
        })
    }
}

impl From<Message> for WireMessage {
    fn from(msg: Message) -> Self {
        let ts = msg.wire_ts().into_owned();
        Self {
            role: msg.role,
            content: msg.content,
            ts,
        }
    }
}

/// Parse a timestamp the way the server writes them (RFC 3339, UTC).
pub(crate) fn parse_wire_ts(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    text.parse::<DateTime<Utc>>()
}

/// Text for a timestamp minted locally.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}

impl Eq for Message {}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            ts,
            wire_ts: None,
        }
    }

    /// A user message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, Utc::now())
    }

    pub fn assistant(content: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self::new(MessageRole::Assistant, content, ts)
    }

    /// Pin the timestamp text written for this message.
    ///
    /// `text` must denote the same instant as `ts`.
    pub(crate) fn with_wire_ts(mut self, text: impl Into<String>) -> Self {
        self.wire_ts = Some(text.into());
        self
    }

    /// Timestamp text sent to the server.
    pub fn wire_ts(&self) -> Cow<'_, str> {
        match &self.wire_ts {
            Some(text) => Cow::Borrowed(text.as_str()),
            None => Cow::Owned(format_ts(&self.ts)),
        }
    }

    /// Identity used by the server when merging.
    pub fn dedup_key(&self) -> (MessageRole, &str, Cow<'_, str>) {
        (self.role, self.content.as_str(), self.wire_ts())
    }
}
