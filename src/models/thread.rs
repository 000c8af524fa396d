use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string, Message};

/// Title the client gives threads it creates, and shows for untitled ones.
pub const PLACEHOLDER_TITLE: &str = "New conversation";

/// Title the server assigns when none is supplied.
pub const SERVER_DEFAULT_TITLE: &str = "New chat";

/// A conversation thread as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Server-assigned identifier (string or integer on the wire)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Canonical messages, ordered by timestamp
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Timestamp of the newest message, if any.
    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.ts).max()
    }
}

/// One row of the thread list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_ts: Option<DateTime<Utc>>,
    /// Truncated text of the newest message
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub preview: String,
}

impl ThreadSummary {
    /// Recency used for ordering: `updatedAt`, else `lastTs`.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.last_ts)
    }

    /// Timestamp shown next to the title: `lastTs`, else `updatedAt`.
    pub fn display_ts(&self) -> Option<DateTime<Utc>> {
        self.last_ts.or(self.updated_at)
    }
}
