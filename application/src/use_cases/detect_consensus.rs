//! Consensus detection and forcing.
//!
//! Whether a discussion has converged is decided by the same generator the
//! agents speak through: it either summarizes the agreement or answers with
//! [`NO_CONSENSUS_MARKER`]. The [`ConsensusEngine`] trait keeps that text
//! protocol behind one seam so a structured protocol can replace it without
//! touching the discussion loop.

use crate::ports::text_generator::TextGenerator;
use async_trait::async_trait;
use crew_domain::{Discussion, Message, NO_CONSENSUS_MARKER, PromptTemplate};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides when a discussion has reached a consensus
#[async_trait]
pub trait ConsensusEngine: Send + Sync {
    /// Check one round's opinions; `None` means no consensus yet
    async fn check(&self, discussion: &Discussion, round_messages: &[&Message]) -> Option<String>;

    /// Synthesize a best-effort consensus from the whole discussion
    async fn force(&self, discussion: &Discussion) -> Option<String>;
}

/// Consensus engine that recognizes disagreement by a sentinel phrase
pub struct SentinelConsensusEngine<G: TextGenerator> {
    generator: Arc<G>,
}

impl<G: TextGenerator> SentinelConsensusEngine<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> ConsensusEngine for SentinelConsensusEngine<G> {
    async fn check(&self, discussion: &Discussion, round_messages: &[&Message]) -> Option<String> {
        if round_messages.is_empty() {
            debug!("Round {} produced no opinions", discussion.current_round());
            return None;
        }

        let prompt = PromptTemplate::consensus_check(&discussion.topic, round_messages);
        let generation = self.generator.generate(&prompt, None).await;
        if !generation.success {
            warn!(
                "Consensus check failed: {}",
                generation.error.as_deref().unwrap_or("unknown error")
            );
            return None;
        }

        let text = generation.text;
        if text.contains(NO_CONSENSUS_MARKER) || text.trim().is_empty() {
            info!("No consensus in round {}", discussion.current_round());
            return None;
        }
        Some(text)
    }

    async fn force(&self, discussion: &Discussion) -> Option<String> {
        let prompt = PromptTemplate::force_consensus(
            &discussion.topic,
            discussion.current_round(),
            discussion.messages(),
        );
        let generation = self.generator.generate(&prompt, None).await;
        if !generation.success {
            warn!(
                "Forced consensus failed: {}",
                generation.error.as_deref().unwrap_or("unknown error")
            );
            return None;
        }
        Some(generation.text).filter(|t| !t.trim().is_empty())
    }
}
