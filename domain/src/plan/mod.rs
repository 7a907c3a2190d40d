//! Plan domain
//!
//! Plans, their tasks, and the parsers that turn generated text into them.

pub mod entities;
pub mod parsing;

pub use entities::{Plan, Task, TaskStatus};
pub use parsing::{RoleSpec, parse_delimited_lines, parse_role_lines};
