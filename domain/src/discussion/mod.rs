//! Discussion domain
//!
//! Round-based discussions and the consensus that closes them.

pub mod consensus;
pub mod entities;

pub use consensus::Consensus;
pub use entities::{Discussion, DiscussionStatus, Message};
