//! HTTP implementation of [`ThreadApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ThreadApi;
use crate::adapters::ReqwestHttpClient;
use crate::context::UserContext;
use crate::error::{classify_http_error, AuthError, NetworkError, SyncResult};
use crate::models::{
    AckResponse, ChatReply, ChatRequest, CreateThreadRequest, Message, RenameThreadRequest,
    SyncThreadRequest, Thread, ThreadListResponse, ThreadResponse, ThreadSummary,
};
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// Longest error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Client for the thread endpoints of the chat backend.
pub struct ThreadApiClient<C: HttpClient = ReqwestHttpClient> {
    base_url: String,
    http: C,
}

impl ThreadApiClient<ReqwestHttpClient> {
    /// Create a client using reqwest with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, ReqwestHttpClient::new())
    }
}

impl<C: HttpClient> ThreadApiClient<C> {
    /// Create a client over any [`HttpClient`].
    pub fn with_http(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    fn threads_url(&self, user: &str) -> String {
        format!(
            "{}/api/threads?username={}",
            self.base_url,
            urlencoding::encode(user)
        )
    }

    fn thread_url(&self, thread_id: &str, suffix: &str, user: &str) -> String {
        format!(
            "{}/api/threads/{}{}?username={}",
            self.base_url,
            urlencoding::encode(thread_id),
            suffix,
            urlencoding::encode(user)
        )
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn encode<T: Serialize>(body: &T) -> SyncResult<String> {
        Ok(serde_json::to_string(body)?)
    }

    /// Turn a raw exchange into a typed payload, enforcing the envelope.
    fn decode<T: DeserializeOwned>(
        operation: &str,
        url: &str,
        result: Result<Response, HttpError>,
    ) -> SyncResult<T> {
        let response = result.map_err(|e| classify_http_error(e, url))?;

        if !response.is_success() {
            debug!(operation, status = response.status, "Request rejected");
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: error_detail(&response),
            }
            .into());
        }

        let envelope: AckResponse = response.json()?;
        if !envelope.ok {
            debug!(operation, "Envelope not ok");
            return Err(NetworkError::Rejected {
                operation: operation.to_string(),
            }
            .into());
        }

        Ok(response.json()?)
    }

    fn require_thread(operation: &str, response: ThreadResponse) -> SyncResult<Thread> {
        response.thread.ok_or_else(|| {
            NetworkError::InvalidResponse {
                message: format!("{} response has no thread", operation),
            }
            .into()
        })
    }
}

/// Best human-readable reason from an error response body.
fn error_detail(response: &Response) -> String {
    if let Ok(value) = response.json::<serde_json::Value>() {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let text = response.text().unwrap_or_default();
    text.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl<C: HttpClient> ThreadApi for ThreadApiClient<C> {
    async fn list_threads(&self, ctx: &UserContext) -> SyncResult<Vec<ThreadSummary>> {
        let url = self.threads_url(&ctx.user);
        let result = self.http.get(&url, &Headers::new()).await;
        let list: ThreadListResponse = Self::decode("list_threads", &url, result)?;
        Ok(list.threads)
    }

    async fn create_thread(&self, ctx: &UserContext, title: &str) -> SyncResult<Thread> {
        let url = format!("{}/api/threads", self.base_url);
        let body = Self::encode(&CreateThreadRequest {
            username: &ctx.user,
            title,
        })?;
        let result = self.http.post(&url, &body, &Self::json_headers()).await;
        Self::require_thread("create_thread", Self::decode("create_thread", &url, result)?)
    }

    async fn get_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<Thread> {
        let url = self.thread_url(thread_id, "", &ctx.user);
        let result = self.http.get(&url, &Headers::new()).await;
        Self::require_thread("get_thread", Self::decode("get_thread", &url, result)?)
    }

    async fn sync_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        messages: &[Message],
    ) -> SyncResult<Thread> {
        let url = self.thread_url(thread_id, "/sync", &ctx.user);
        let body = Self::encode(&SyncThreadRequest {
            username: &ctx.user,
            session_id: &ctx.session_id,
            messages,
        })?;
        let result = self.http.post(&url, &body, &Self::json_headers()).await;
        Self::require_thread("sync_thread", Self::decode("sync_thread", &url, result)?)
    }

    async fn rename_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        title: &str,
    ) -> SyncResult<()> {
        let url = self.thread_url(thread_id, "", &ctx.user);
        let body = Self::encode(&RenameThreadRequest {
            username: &ctx.user,
            title,
        })?;
        let result = self.http.patch(&url, &body, &Self::json_headers()).await;
        let _: AckResponse = Self::decode("rename_thread", &url, result)?;
        Ok(())
    }

    async fn delete_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<()> {
        let url = self.thread_url(thread_id, "", &ctx.user);
        let result = self.http.delete(&url, &Headers::new()).await;
        let _: AckResponse = Self::decode("delete_thread", &url, result)?;
        Ok(())
    }

    async fn chat(
        &self,
        ctx: &UserContext,
        query: &str,
        thread_id: Option<&str>,
    ) -> SyncResult<ChatReply> {
        let url = format!("{}/api/chat", self.base_url);
        let body = Self::encode(&ChatRequest {
            username: &ctx.user,
            query,
            thread_id,
            session_id: &ctx.session_id,
        })?;
        let result = self.http.post(&url, &body, &Self::json_headers()).await;

        // Only chat distinguishes an expired session
        if let Ok(ref response) = result {
            if response.status == 401 {
                return Err(AuthError::SessionExpired.into());
            }
        }

        Self::decode("chat", &url, result)
    }
}
