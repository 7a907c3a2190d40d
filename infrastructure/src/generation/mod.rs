//! Text-generation adapters
//!
//! Implementations of the [`TextGenerator`](crew_application::TextGenerator)
//! port. [`CompletionsClient`] talks to an HTTP completions endpoint.

mod completions;
mod protocol;

pub use completions::CompletionsClient;
