//! Logging infrastructure: structured pipeline transcripts.
//!
//! Provides [`JsonlPipelineLogger`], a JSONL file writer that implements
//! the [`PipelineLogger`](crew_application::PipelineLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlPipelineLogger;
