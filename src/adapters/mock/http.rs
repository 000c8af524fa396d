//! Mock HTTP client for testing.
//!
//! Responses are keyed by method and URL. A configured URL also matches any
//! longer URL it is a prefix of, so `GET http://host/api/threads` covers
//! every `?username=` query.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST, PATCH, DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST and PATCH requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response (any status)
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

impl MockResponse {
    /// Shorthand for a JSON body with the given status.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, body.to_string().into()))
    }
}

/// Mock HTTP client for testing.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response("GET", "http://host/api/threads", MockResponse::json(200, json!({"ok": true, "threads": []})));
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by (method, URL pattern)
    responses: Arc<Mutex<HashMap<(String, String), MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a method and URL.
    pub fn set_response(&self, method: &str, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert((method.to_string(), url.to_string()), response);
    }

    /// Set a default response for requests without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, method: &str, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(&(method.to_string(), url.to_string())) {
            return Some(response.clone());
        }

        // Longest prefix wins so `/api/threads/t_1` beats `/api/threads`
        let prefix_match = responses
            .iter()
            .filter(|((m, pattern), _)| m == method && url.starts_with(pattern.as_str()))
            .max_by_key(|((_, pattern), _)| pattern.len())
            .map(|(_, response)| response.clone());
        if prefix_match.is_some() {
            return prefix_match;
        }

        self.default_response.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, url: &str) -> Result<Response, HttpError> {
        match self.get_response(method, url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "No mock response for {} {}",
                method, url
            ))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.respond("GET", url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.respond("POST", url)
    }

    async fn patch(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request("PATCH", url, headers, Some(body.to_string()));
        self.respond("PATCH", url)
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("DELETE", url, headers, None);
        self.respond("DELETE", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "GET",
            "http://host/api/threads",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let response = client
            .get("http://host/api/threads?username=alice", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "http://host/api/threads?username=alice");
    }

    #[tokio::test]
    async fn test_method_is_part_of_the_key() {
        let client = MockHttpClient::new();
        client.set_response(
            "DELETE",
            "http://host/api/threads/t_1",
            MockResponse::json(200, serde_json::json!({"ok": true})),
        );

        assert!(client
            .get("http://host/api/threads/t_1", &Headers::new())
            .await
            .is_err());
        assert!(client
            .delete("http://host/api/threads/t_1", &Headers::new())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let client = MockHttpClient::new();
        client.set_response(
            "GET",
            "http://host/api/threads",
            MockResponse::json(200, serde_json::json!({"which": "list"})),
        );
        client.set_response(
            "GET",
            "http://host/api/threads/t_1",
            MockResponse::json(200, serde_json::json!({"which": "get"})),
        );

        let response = client
            .get("http://host/api/threads/t_1?username=a", &Headers::new())
            .await
            .unwrap();
        assert!(response.text().unwrap().contains("get"));
    }

    #[tokio::test]
    async fn test_error_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));

        let result = client.post("http://host/api/chat", "{}", &Headers::new()).await;
        assert!(matches!(result, Err(HttpError::ConnectionFailed(_))));
        assert_eq!(client.get_requests()[0].body, Some("{}".to_string()));
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::json(200, serde_json::json!({})));

        let cloned = client.clone();
        cloned
            .patch("http://host/api/threads/t_1", "{}", &Headers::new())
            .await
            .unwrap();

        assert_eq!(client.get_requests().len(), 1);
        client.clear_requests();
        assert!(cloned.get_requests().is_empty());
    }
}
