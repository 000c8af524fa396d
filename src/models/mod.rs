//! Wire and cache data types.

mod message;
mod request;
mod thread;

pub use message::{Message, MessageRole};
pub use request::{
    AckResponse, ChatReply, ChatRequest, CreateThreadRequest, RenameThreadRequest,
    SyncThreadRequest, ThreadListResponse, ThreadResponse,
};
pub use thread::{Thread, ThreadSummary, PLACEHOLDER_TITLE, SERVER_DEFAULT_TITLE};

use serde::{Deserialize, Deserializer};

/// Helper to deserialize id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Helper to deserialize nullable strings as empty string
/// Handles both missing fields and explicit null values
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}
