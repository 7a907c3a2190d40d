//! Identifier value objects.
//!
//! Every entity carries a string identifier. Newtypes keep a task id from
//! being passed where an agent id is expected; all of them serialize as
//! plain strings so the wire format stays flat.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a fresh random (UUID v4) id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an agent within a team.
    AgentId
);
string_id!(
    /// Identifier of a team.
    TeamId
);
string_id!(
    /// Identifier of a discussion.
    DiscussionId
);
string_id!(
    /// Identifier of a task within a plan.
    TaskId
);
string_id!(
    /// Identifier of a plan.
    PlanId
);
