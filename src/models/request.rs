use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{format_ts, parse_wire_ts};
use super::{Message, Thread, ThreadSummary};

/// Body of `POST /api/threads`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateThreadRequest<'a> {
    pub username: &'a str,
    pub title: &'a str,
}

/// Body of `POST /api/threads/{id}/sync`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyncThreadRequest<'a> {
    pub username: &'a str,
    pub session_id: &'a str,
    pub messages: &'a [Message],
}

/// Body of `PATCH /api/threads/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenameThreadRequest<'a> {
    pub username: &'a str,
    pub title: &'a str,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    pub username: &'a str,
    pub query: &'a str,
    /// Sent as `null` to let the server pick or create a thread
    pub thread_id: Option<&'a str>,
    pub session_id: &'a str,
}

/// `{ ok, threads }`
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadListResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub threads: Vec<ThreadSummary>,
}

/// `{ ok, thread }`
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub thread: Option<Thread>,
}

/// `{ ok }`
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub ok: bool,
}

/// The assistant's answer to one sent message (`{ ok, response, ts, thread_id }`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "WireChatReply", into = "WireChatReply")]
pub struct ChatReply {
    pub response: String,
    pub ts: DateTime<Utc>,
    /// Thread the server stored the exchange in
    pub thread_id: String,
    /// Where the answer's context came from, when the server says
    pub context_source: Option<String>,
    wire_ts: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireChatReply {
    response: String,
    #[serde(default)]
    ts: Option<String>,
    thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context_source: Option<String>,
}

impl TryFrom<WireChatReply> for ChatReply {
    type Error = chrono::ParseError;

    fn try_from(wire: WireChatReply) -> Result<Self, Self::Error> {
        let ts = match &wire.ts {
            Some(text) => parse_wire_ts(text)?,
            None => Utc::now(),
        };
        Ok(Self {
            response: wire.response,
            ts,
            thread_id: wire.thread_id,
            context_source: wire.context_source,
            wire_ts: wire.ts,
        })
    }
}

impl From<ChatReply> for WireChatReply {
    fn from(reply: ChatReply) -> Self {
        let ts = Some(reply.wire_ts.unwrap_or_else(|| format_ts(&reply.ts)));
        Self {
            response: reply.response,
            ts,
            thread_id: reply.thread_id,
            context_source: reply.context_source,
        }
    }
}

impl ChatReply {
    pub fn new(
        response: impl Into<String>,
        ts: DateTime<Utc>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            response: response.into(),
            ts,
            thread_id: thread_id.into(),
            context_source: None,
            wire_ts: None,
        }
    }

    pub fn with_context_source(mut self, source: impl Into<String>) -> Self {
        self.context_source = Some(source.into());
        self
    }

    pub(crate) fn with_wire_ts(mut self, text: impl Into<String>) -> Self {
        self.wire_ts = Some(text.into());
        self
    }

    /// The answer as a cacheable message, keeping the server's timestamp text.
    pub fn to_message(&self) -> Message {
        let message = Message::assistant(self.response.clone(), self.ts);
        match &self.wire_ts {
            Some(text) => message.with_wire_ts(text.clone()),
            None => message,
        }
    }
}
