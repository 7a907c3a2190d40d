//! Prompt domain
//!
//! Templates for every generation call in the pipeline, plus the fixed
//! marker strings the pipeline writes or matches against.

mod template;

pub use template::{
    AGGREGATION_FAILURE_MARKER, NO_CONSENSUS_MARKER, PromptTemplate, TASK_FAILURE_MARKER,
    TaskReport,
};
