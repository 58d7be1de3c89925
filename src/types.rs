//! Core identifier and time types shared by every module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp: UTC wall-clock instant, serialized as ISO 8601
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// NodeId: opaque identifier of a file or folder, unique within a project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// ProjectId: opaque identifier of a project, the persistence key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

macro_rules! opaque_id {
    ($ty:ident) => {
        impl $ty {
            /// Generate a fresh random identifier. Random v4 ids are never reissued
            /// in practice, so a deleted id is not handed out again.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(NodeId);
opaque_id!(ProjectId);

/// Current time, never earlier than `previous`.
///
/// Node and project timestamps must be non-decreasing even if the wall clock steps back.
pub fn monotonic_now(previous: Timestamp) -> Timestamp {
    let now = chrono::Utc::now();
    if now < previous {
        previous
    } else {
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ProjectId::from("proj-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"proj-1\"");
        let back: ProjectId = serde_json::from_str("\"proj-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn monotonic_now_never_goes_back() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        assert_eq!(monotonic_now(future), future);
    }
}
