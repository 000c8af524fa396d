//! In-memory thread server.
//!
//! Implements [`ThreadApi`] with the backend's merge rules so engine tests
//! and the CLI demo mode can run without a network:
//!
//! - sync dedups by `(role, content, ts)`, appends unseen messages, sorts by
//!   timestamp and bumps `updatedAt` to the newest message
//! - chat stores the user message and the reply under the same timestamp and
//!   titles a still-untitled thread after the first prompt
//! - the list is sorted by `updatedAt`, newest first, with a short preview

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::ThreadApi;
use crate::context::UserContext;
use crate::error::{AuthError, NetworkError, SyncResult};
use crate::models::{ChatReply, Message, Thread, ThreadSummary, SERVER_DEFAULT_TITLE};

/// Characters of the newest message shown in a list preview.
const PREVIEW_CHARS: usize = 60;

type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Default)]
struct ServerState {
    threads: HashMap<String, Vec<Thread>>,
    calls: Vec<String>,
    offline: bool,
    failing: HashSet<String>,
    session_expired: bool,
    last_id_millis: i64,
}

/// Thread server held entirely in memory.
#[derive(Clone)]
pub struct InMemoryThreadServer {
    state: Arc<Mutex<ServerState>>,
    responder: Responder,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl std::fmt::Debug for InMemoryThreadServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryThreadServer").finish_non_exhaustive()
    }
}

impl Default for InMemoryThreadServer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryThreadServer {
    /// A server that answers every prompt with `You said: <prompt>`.
    pub fn new() -> Self {
        Self::with_responder(|query| format!("You said: {}", query))
    }

    /// A server whose assistant replies come from `responder`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(ServerState::default())),
            responder: Arc::new(responder),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Fail every call as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Fail calls to `operation` (e.g. `"get_thread"`) with a 500.
    pub fn set_failing(&self, operation: &str, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing.insert(operation.to_string());
        } else {
            state.failing.remove(operation);
        }
    }

    /// Answer chat with 401.
    pub fn set_session_expired(&self, expired: bool) {
        self.state.lock().unwrap().session_expired = expired;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Store a thread directly.
    pub fn insert_thread(&self, user: &str, thread: Thread) {
        let mut state = self.state.lock().unwrap();
        let threads = state.threads.entry(user.to_string()).or_default();
        threads.retain(|t| t.id != thread.id);
        threads.push(thread);
    }

    /// Current server copy of a thread.
    pub fn thread(&self, user: &str, thread_id: &str) -> Option<Thread> {
        let state = self.state.lock().unwrap();
        state
            .threads
            .get(user)
            .and_then(|threads| threads.iter().find(|t| t.id == thread_id))
            .cloned()
    }

    /// Operations served so far, as `"<operation> <thread id>"` or `"<operation>"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    async fn enter(&self, operation: &str, thread_id: Option<&str>) -> SyncResult<()> {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().unwrap();
        let call = match thread_id {
            Some(id) => format!("{} {}", operation, id),
            None => operation.to_string(),
        };
        state.calls.push(call);

        if state.offline {
            return Err(NetworkError::ConnectionFailed {
                url: "memory://".to_string(),
                message: "server offline".to_string(),
            }
            .into());
        }
        if state.failing.contains(operation) {
            return Err(NetworkError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn next_id(state: &mut ServerState) -> String {
        let millis = Utc::now().timestamp_millis().max(state.last_id_millis + 1);
        state.last_id_millis = millis;
        format!("t_{}", millis)
    }

    fn new_thread(state: &mut ServerState, title: String) -> Thread {
        let now = Utc::now();
        Thread {
            id: Self::next_id(state),
            title,
            created_at: Some(now),
            updated_at: Some(now),
            messages: Vec::new(),
        }
    }
}

fn not_found() -> NetworkError {
    NetworkError::HttpStatus {
        status: 404,
        message: "Thread not found".to_string(),
    }
}

fn find<'a>(state: &'a mut ServerState, user: &str, thread_id: &str) -> SyncResult<&'a mut Thread> {
    state
        .threads
        .get_mut(user)
        .and_then(|threads| threads.iter_mut().find(|t| t.id == thread_id))
        .ok_or_else(|| not_found().into())
}

fn truncate(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}

/// Timestamp text in the backend's format: always six fractional digits.
fn server_stamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn title_from_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        SERVER_DEFAULT_TITLE.to_string()
    } else {
        truncate(trimmed)
    }
}

fn summarize(thread: &Thread) -> ThreadSummary {
    let preview = thread
        .messages
        .iter()
        .rev()
        .find(|m| !m.content.is_empty())
        .map(|m| truncate(&m.content))
        .unwrap_or_default();

    ThreadSummary {
        id: thread.id.clone(),
        title: thread.title.clone(),
        created_at: thread.created_at,
        updated_at: thread.updated_at,
        last_ts: thread.messages.last().map(|m| m.ts).or(thread.updated_at),
        preview,
    }
}

#[async_trait]
impl ThreadApi for InMemoryThreadServer {
    async fn list_threads(&self, ctx: &UserContext) -> SyncResult<Vec<ThreadSummary>> {
        self.enter("list_threads", None).await?;
        let state = self.state.lock().unwrap();
        let mut items: Vec<ThreadSummary> = state
            .threads
            .get(&ctx.user)
            .map(|threads| threads.iter().map(summarize).collect())
            .unwrap_or_default();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }

    async fn create_thread(&self, ctx: &UserContext, title: &str) -> SyncResult<Thread> {
        self.enter("create_thread", None).await?;
        let mut state = self.state.lock().unwrap();
        let title = match title.trim() {
            "" => SERVER_DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };
        let thread = Self::new_thread(&mut state, title);
        state
            .threads
            .entry(ctx.user.clone())
            .or_default()
            .push(thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<Thread> {
        self.enter("get_thread", Some(thread_id)).await?;
        let mut state = self.state.lock().unwrap();
        Ok(find(&mut state, &ctx.user, thread_id)?.clone())
    }

    async fn sync_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        messages: &[Message],
    ) -> SyncResult<Thread> {
        self.enter("sync_thread", Some(thread_id)).await?;
        let mut state = self.state.lock().unwrap();
        let thread = find(&mut state, &ctx.user, thread_id)?;

        let mut seen: HashSet<_> = thread
            .messages
            .iter()
            .map(|m| (m.role, m.content.clone(), m.wire_ts().into_owned()))
            .collect();
        let fresh: Vec<Message> = messages
            .iter()
            .filter(|m| !m.content.is_empty())
            .filter(|m| seen.insert((m.role, m.content.clone(), m.wire_ts().into_owned())))
            .cloned()
            .collect();

        if !fresh.is_empty() {
            thread.messages.extend(fresh);
            thread.messages.sort_by_key(|m| m.ts);
            thread.updated_at = thread.messages.iter().map(|m| m.ts).max();
        }
        Ok(thread.clone())
    }

    async fn rename_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        title: &str,
    ) -> SyncResult<()> {
        self.enter("rename_thread", Some(thread_id)).await?;
        if title.trim().is_empty() {
            return Err(NetworkError::HttpStatus {
                status: 400,
                message: "Title is required".to_string(),
            }
            .into());
        }
        let mut state = self.state.lock().unwrap();
        let thread = find(&mut state, &ctx.user, thread_id)?;
        thread.title = title.trim().to_string();
        thread.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<()> {
        self.enter("delete_thread", Some(thread_id)).await?;
        let mut state = self.state.lock().unwrap();
        let threads = state.threads.entry(ctx.user.clone()).or_default();
        let before = threads.len();
        threads.retain(|t| t.id != thread_id);
        if threads.len() == before {
            return Err(not_found().into());
        }
        Ok(())
    }

    async fn chat(
        &self,
        ctx: &UserContext,
        query: &str,
        thread_id: Option<&str>,
    ) -> SyncResult<ChatReply> {
        self.enter("chat", thread_id).await?;
        if query.trim().is_empty() {
            return Err(NetworkError::HttpStatus {
                status: 400,
                message: "Prompt is required".to_string(),
            }
            .into());
        }

        let mut state = self.state.lock().unwrap();
        if state.session_expired {
            return Err(AuthError::SessionExpired.into());
        }

        let thread_id = match thread_id {
            Some(id) => {
                find(&mut state, &ctx.user, id)?;
                id.to_string()
            }
            None => {
                let thread = Self::new_thread(&mut state, title_from_prompt(query));
                let id = thread.id.clone();
                state
                    .threads
                    .entry(ctx.user.clone())
                    .or_default()
                    .push(thread);
                id
            }
        };

        let response = (self.responder)(query);
        let now: DateTime<Utc> = Utc::now().trunc_subsecs(6);
        let stamp = server_stamp(&now);
        let thread = find(&mut state, &ctx.user, &thread_id)?;
        let was_empty = thread.messages.is_empty();
        thread.messages.push(
            Message::new(crate::models::MessageRole::User, query, now).with_wire_ts(stamp.clone()),
        );
        thread
            .messages
            .push(Message::assistant(response.clone(), now).with_wire_ts(stamp.clone()));
        if was_empty && (thread.title.is_empty() || thread.title == SERVER_DEFAULT_TITLE) {
            thread.title = title_from_prompt(query);
        }
        thread.updated_at = Some(now);

        Ok(ChatReply::new(response, now, thread_id)
            .with_context_source("memory")
            .with_wire_ts(stamp))
    }
}
