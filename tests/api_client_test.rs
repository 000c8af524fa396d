//! Wire-level tests for ThreadApiClient using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use std::sync::Arc;

use chatsync::adapters::InMemoryStore;
use chatsync::api::{ThreadApi, ThreadApiClient};
use chatsync::context::UserContext;
use chatsync::engine::{FlushOutcome, SyncEngine};
use chatsync::error::{AuthError, ErrorCategory, NetworkError, SyncError};
use chatsync::models::{Message, MessageRole};

fn ctx() -> UserContext {
    UserContext::new("alice", "sess-1")
}

fn thread_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Plans",
        "createdAt": "2024-05-01T12:00:00Z",
        "updatedAt": "2024-05-01T12:00:02Z",
        "messages": [
            {"role": "user", "content": "hi", "ts": "2024-05-01T12:00:01Z"},
            {"role": "assistant", "content": "hello", "ts": "2024-05-01T12:00:02Z"}
        ]
    })
}

#[tokio::test]
async fn test_list_threads_sends_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/threads"))
        .and(query_param("username", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "threads": [
                {"id": "t_2", "title": "B", "updatedAt": "2024-05-01T12:00:05Z", "lastTs": "2024-05-01T12:00:05Z", "preview": "latest"},
                {"id": 1, "title": null, "updatedAt": "2024-05-01T12:00:01Z"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let threads = client.list_threads(&ctx()).await.unwrap();

    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].preview, "latest");
    assert_eq!(threads[1].id, "1");
    assert_eq!(threads[1].title, "");
}

#[tokio::test]
async fn test_create_thread_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/threads"))
        .and(body_json(json!({"username": "alice", "title": "Plans"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "thread": thread_json("t_1")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let thread = client.create_thread(&ctx(), "Plans").await.unwrap();
    assert_eq!(thread.id, "t_1");
}

#[tokio::test]
async fn test_get_thread_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/threads/t_1"))
        .and(query_param("username", "alice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "thread": thread_json("t_1")})),
        )
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let thread = client.get_thread(&ctx(), "t_1").await.unwrap();

    assert_eq!(thread.title, "Plans");
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn test_sync_thread_posts_session_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/threads/t_1/sync"))
        .and(query_param("username", "alice"))
        .and(body_json(json!({
            "username": "alice",
            "session_id": "sess-1",
            "messages": [{"role": "user", "content": "hi", "ts": "2024-05-01T12:00:01Z"}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "thread": thread_json("t_1")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let local: Vec<Message> =
        serde_json::from_value(json!([{"role": "user", "content": "hi", "ts": "2024-05-01T12:00:01Z"}]))
            .unwrap();
    let client = ThreadApiClient::new(server.uri());
    let thread = client.sync_thread(&ctx(), "t_1", &local).await.unwrap();
    assert_eq!(thread.messages.len(), 2);
}

#[tokio::test]
async fn test_flush_pushes_server_timestamps_verbatim() {
    let server = MockServer::start().await;
    let stored = json!({
        "id": "t_1",
        "title": "Plans",
        "messages": [
            {"role": "user", "content": "hi", "ts": "2024-05-01T12:00:00.120000Z"},
            {"role": "assistant", "content": "hello", "ts": "2024-05-01T12:00:00.120000Z"}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/api/threads/t_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "thread": stored.clone()})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/threads/t_1/sync"))
        .and(body_json(json!({
            "username": "alice",
            "session_id": "sess-1",
            "messages": stored["messages"].clone()
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "thread": stored.clone()})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = SyncEngine::new(
        Arc::new(ThreadApiClient::new(server.uri())),
        Arc::new(InMemoryStore::new()),
    );
    engine.switch_thread(&ctx(), "t_1").await;
    let outcome = engine.flush_active(&ctx()).await.unwrap();

    assert!(matches!(outcome, FlushOutcome::Flushed { messages: 2, .. }));
}

#[tokio::test]
async fn test_rename_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/threads/t_1"))
        .and(query_param("username", "alice"))
        .and(body_json(json!({"username": "alice", "title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/threads/t_1"))
        .and(query_param("username", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    client.rename_thread(&ctx(), "t_1", "Renamed").await.unwrap();
    client.delete_thread(&ctx(), "t_1").await.unwrap();
}

#[tokio::test]
async fn test_chat_without_thread_sends_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "username": "alice",
            "query": "hello",
            "thread_id": null,
            "session_id": "sess-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "response": "hi there",
            "ts": "2024-05-01T12:00:03Z",
            "thread_id": "t_9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let reply = client.chat(&ctx(), "hello", None).await.unwrap();

    assert_eq!(reply.response, "hi there");
    assert_eq!(reply.thread_id, "t_9");
}

#[tokio::test]
async fn test_chat_401_is_session_expired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let err = client.chat(&ctx(), "hello", Some("t_1")).await.unwrap_err();

    assert!(matches!(err, SyncError::Auth(AuthError::SessionExpired)));
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn test_401_elsewhere_is_not_reauth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/threads"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let err = client.list_threads(&ctx()).await.unwrap_err();
    assert!(!err.requires_reauth());
}

#[tokio::test]
async fn test_not_ok_envelope_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/threads/t_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let err = client.rename_thread(&ctx(), "t_1", "x").await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Network(NetworkError::Rejected { ref operation }) if operation == "rename_thread"
    ));
    assert_eq!(err.category(), ErrorCategory::Server);
}

#[tokio::test]
async fn test_404_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/threads/t_gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Thread not found"})))
        .mount(&server)
        .await;

    let client = ThreadApiClient::new(server.uri());
    let err = client.get_thread(&ctx(), "t_gone").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "HTTP 404 error: Thread not found");
}

#[tokio::test]
async fn test_unreachable_server_is_transient() {
    // Nothing listens on port 9 on test machines
    let client = ThreadApiClient::new("http://127.0.0.1:9");
    let err = client.list_threads(&ctx()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.is_retryable());
}
