//! Local state survives restarts when backed by the file store.

mod common;

use std::sync::Arc;

use common::*;
use tempfile::TempDir;

use chatsync::adapters::{FileStore, InMemoryThreadServer};
use chatsync::cache::history_key;
use chatsync::context::SessionController;
use chatsync::engine::SyncEngine;
use chatsync::session::SessionIdentityProvider;
use chatsync::traits::KeyValueStore;

fn open(dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path()).unwrap())
}

#[tokio::test]
async fn test_cache_and_pointer_survive_restart() {
    let dir = TempDir::new().unwrap();
    let server = InMemoryThreadServer::new();
    let ctx = test_ctx();

    let thread_id = {
        let engine = SyncEngine::new(Arc::new(server.clone()), open(&dir));
        let reply = engine.send_message(&ctx, "remember me").await.unwrap();
        reply.thread_id
    };

    let engine = SyncEngine::new(Arc::new(server), open(&dir));
    assert_eq!(engine.active_thread(&ctx), Some(thread_id.clone()));
    assert_eq!(
        contents(&engine.cache().read_thread("alice", &thread_id)),
        vec!["remember me", "You said: remember me"]
    );
}

#[tokio::test]
async fn test_offline_message_reaches_server_after_restart() {
    let dir = TempDir::new().unwrap();
    let server = InMemoryThreadServer::new();
    let ctx = test_ctx();

    let thread_id = {
        let engine = SyncEngine::new(Arc::new(server.clone()), open(&dir));
        let thread = engine.create_thread(&ctx, "t").await.unwrap();
        server.set_offline(true);
        assert!(engine.send_message(&ctx, "queued").await.is_err());
        thread.id
    };

    server.set_offline(false);
    let engine = SyncEngine::new(Arc::new(server.clone()), open(&dir));
    let opened = engine.open_thread(&ctx, &thread_id).await;

    assert_eq!(contents(&opened.messages), vec!["queued"]);
    assert_eq!(server.thread("alice", &thread_id).unwrap().messages.len(), 1);
}

#[test]
fn test_session_id_stable_across_restart_until_logout() {
    let dir = TempDir::new().unwrap();

    let first = SessionIdentityProvider::new(open(&dir)).get_session_id("alice");
    let second = SessionIdentityProvider::new(open(&dir)).get_session_id("alice");
    assert_eq!(first, second);

    let controller = SessionController::new(Arc::new(SessionIdentityProvider::new(open(&dir))));
    controller.login("alice").unwrap();
    controller.logout();

    let third = SessionIdentityProvider::new(open(&dir)).get_session_id("alice");
    assert_ne!(first, third);
}

#[test]
fn test_corrupted_history_file_is_reset() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.set(&history_key("alice"), "{not json").unwrap();

    let engine = SyncEngine::new(Arc::new(InMemoryThreadServer::new()), Arc::clone(&store));
    assert!(engine.cache().thread_ids("alice").is_empty());
    assert_eq!(store.get(&history_key("alice")).unwrap().as_deref(), Some("{}"));
}
