//! Moving cached messages to a server-assigned thread id.

use tracing::debug;

use super::ThreadCache;

impl ThreadCache {
    /// Move the entry cached under `from` to `to`.
    ///
    /// Used when the server stores a chat exchange under a different id than
    /// the one sent. If `to` already has an entry, `from`'s messages are
    /// appended and the whole entry is stably sorted by timestamp. Nothing is
    /// dropped here; duplicates are the server's to merge.
    pub fn rekey_thread(&self, user: &str, from: &str, to: &str) {
        if from == to {
            return;
        }

        let _guard = self.guard();
        let mut history = self.load(user);
        let Some(moved) = history.remove(from) else {
            return;
        };

        let target = history.entry(to.to_string()).or_default();
        target.extend(moved);
        target.sort_by_key(|m| m.ts);

        debug!(user = %user, from = %from, to = %to, "Re-keyed cached thread");
        self.save(user, &history);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::adapters::InMemoryStore;
    use crate::cache::ThreadCache;
    use crate::models::{Message, MessageRole};

    fn msg(content: &str, secs: u32) -> Message {
        Message::new(
            MessageRole::User,
            content,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, secs).unwrap(),
        )
    }

    #[test]
    fn test_rekey_moves_entry() {
        let cache = ThreadCache::new(Arc::new(InMemoryStore::new()));
        cache.write_thread("alice", "t_old", &[msg("a", 1)]);

        cache.rekey_thread("alice", "t_old", "t_new");

        assert!(cache.read_thread("alice", "t_old").is_empty());
        assert_eq!(cache.read_thread("alice", "t_new"), vec![msg("a", 1)]);
    }

    #[test]
    fn test_rekey_appends_into_existing_entry() {
        let cache = ThreadCache::new(Arc::new(InMemoryStore::new()));
        cache.write_thread("alice", "t_old", &[msg("a", 1), msg("c", 3)]);
        cache.write_thread("alice", "t_new", &[msg("a", 1), msg("b", 2)]);

        cache.rekey_thread("alice", "t_old", "t_new");

        assert_eq!(
            cache.read_thread("alice", "t_new"),
            vec![msg("a", 1), msg("a", 1), msg("b", 2), msg("c", 3)]
        );
        assert!(cache.read_thread("alice", "t_old").is_empty());
    }

    #[test]
    fn test_rekey_sort_is_stable_for_equal_timestamps() {
        let cache = ThreadCache::new(Arc::new(InMemoryStore::new()));
        cache.write_thread("alice", "t_new", &[msg("first", 1)]);
        cache.write_thread("alice", "t_old", &[msg("second", 1)]);

        cache.rekey_thread("alice", "t_old", "t_new");

        let contents: Vec<_> = cache
            .read_thread("alice", "t_new")
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_rekey_same_id_or_missing_is_noop() {
        let cache = ThreadCache::new(Arc::new(InMemoryStore::new()));
        cache.write_thread("alice", "t_1", &[msg("a", 1)]);

        cache.rekey_thread("alice", "t_1", "t_1");
        cache.rekey_thread("alice", "t_missing", "t_1");

        assert_eq!(cache.read_thread("alice", "t_1"), vec![msg("a", 1)]);
    }
}
