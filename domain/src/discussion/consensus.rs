//! Consensus value object

use crate::core::ids::DiscussionId;
use serde::{Deserialize, Serialize};

/// The agreed-upon summary that ended a discussion (immutable)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consensus {
    content: String,
    discussion_id: DiscussionId,
}

impl Consensus {
    pub fn new(content: impl Into<String>, discussion_id: DiscussionId) -> Self {
        Self {
            content: content.into(),
            discussion_id,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn discussion_id(&self) -> &DiscussionId {
        &self.discussion_id
    }
}

impl std::fmt::Display for Consensus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}
