//! Run Discussion use case
//!
//! Drives a discussion round by round: every agent gives an opinion, the
//! round is persisted, and from round two onwards the consensus engine is
//! asked whether the team agrees. A discussion that exhausts its rounds is
//! closed by a forced consensus, or marked failed.

use crate::config::CONSENSUS_MIN_ROUND;
use crate::ports::pipeline_logger::{NoPipelineLogger, PipelineEvent, PipelineLogger};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::text_generator::TextGenerator;
use crate::use_cases::detect_consensus::ConsensusEngine;
use crew_domain::{Agent, Discussion, DomainError, PromptTemplate};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback invoked with a snapshot after every state-changing step
pub type PersistFn<'a> = &'a (dyn Fn(&Discussion) + Send + Sync);

/// Use case for running a discussion to completion
pub struct RunDiscussionUseCase<G: TextGenerator> {
    generator: Arc<G>,
    consensus: Arc<dyn ConsensusEngine>,
    context_window: usize,
    logger: Arc<dyn PipelineLogger>,
}

impl<G: TextGenerator> RunDiscussionUseCase<G> {
    pub fn new(generator: Arc<G>, consensus: Arc<dyn ConsensusEngine>) -> Self {
        Self {
            generator,
            consensus,
            context_window: 3,
            logger: Arc::new(NoPipelineLogger),
        }
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Run without persistence or progress callbacks
    pub async fn run(&self, discussion: &mut Discussion, agents: &[Agent]) {
        self.run_with_callback(discussion, agents, &|_: &Discussion| {}, &NoProgress)
            .await
    }

    /// Run the discussion up to `discussion.max_rounds`.
    ///
    /// On return the discussion is either `consensus_reached` or `failed`,
    /// unless it was already finished when passed in.
    pub async fn run_with_callback(
        &self,
        discussion: &mut Discussion,
        agents: &[Agent],
        persist: PersistFn<'_>,
        progress: &dyn ProgressNotifier,
    ) {
        if discussion.is_finished() {
            warn!("Discussion {} is already finished", discussion.id);
            return;
        }

        info!(
            "Starting discussion '{}' with {} agents",
            discussion.topic,
            agents.len()
        );

        if let Err(e) = self.run_rounds(discussion, agents, persist, progress).await {
            warn!("Discussion loop stopped early: {}", e);
        }

        if !discussion.is_finished() {
            self.close_with_forced_consensus(discussion, progress)
                .await;
            persist(discussion);
        }
    }

    async fn run_rounds(
        &self,
        discussion: &mut Discussion,
        agents: &[Agent],
        persist: PersistFn<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), DomainError> {
        while !discussion.has_reached_max_rounds() {
            let round = discussion.start_new_round()?;
            info!("Round {}/{}", round, discussion.max_rounds);
            progress.on_round_start(round, discussion.max_rounds, agents.len());

            for agent in agents {
                let prompt = PromptTemplate::opinion(
                    agent,
                    &discussion.topic,
                    round,
                    discussion.recent_messages(self.context_window),
                );
                let generation = self.generator.generate(&prompt, None).await;
                let success = generation.success;

                match generation.into_text() {
                    Some(opinion) => {
                        debug!("{} ({}) contributed to round {}", agent.name, agent.role, round);
                        self.logger.log(PipelineEvent::new(
                            "opinion",
                            json!({
                                "discussion_id": discussion.id,
                                "round": round,
                                "agent": agent.name,
                                "role": agent.role,
                                "content": opinion,
                            }),
                        ));
                        discussion.add_message(agent.id.clone(), agent.name.clone(), opinion)?;
                    }
                    None => debug!("{} produced no opinion in round {}", agent.name, round),
                }
                progress.on_opinion(agent, success);
            }

            persist(discussion);
            progress.on_round_complete(round);

            if round >= CONSENSUS_MIN_ROUND {
                let consensus = {
                    let round_messages = discussion.current_round_messages();
                    self.consensus.check(discussion, &round_messages).await
                };
                if let Some(consensus) = consensus {
                    info!("Consensus reached in round {}", round);
                    self.log_consensus(discussion, &consensus, false);
                    progress.on_consensus(Some(&consensus), false);
                    discussion.reach_consensus(consensus)?;
                    persist(discussion);
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn close_with_forced_consensus(
        &self,
        discussion: &mut Discussion,
        progress: &dyn ProgressNotifier,
    ) {
        info!(
            "No consensus after {} rounds, forcing one",
            discussion.current_round()
        );
        let forced = self.consensus.force(discussion).await;
        progress.on_consensus(forced.as_deref(), true);

        let closed = match forced {
            Some(consensus) => {
                self.log_consensus(discussion, &consensus, true);
                discussion.reach_consensus(consensus)
            }
            None => {
                warn!("Discussion {} failed to reach consensus", discussion.id);
                discussion.fail()
            }
        };
        if let Err(e) = closed {
            warn!("Could not close discussion: {}", e);
        }
    }

    fn log_consensus(&self, discussion: &Discussion, consensus: &str, forced: bool) {
        self.logger.log(PipelineEvent::new(
            "consensus",
            json!({
                "discussion_id": discussion.id,
                "round": discussion.current_round(),
                "forced": forced,
                "content": consensus,
            }),
        ));
    }
}
