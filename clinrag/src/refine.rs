//! Query orchestration strategies.
//!
//! Two control policies answer a query end to end, behind the
//! [`Orchestrator`] trait:
//!
//! - [`RefinementLoop`] — alternates generation and self-critique research
//!   rounds until the conversation grows past the round limit, then formats
//!   the latest answer. Loop exit is a pure function of message count, never
//!   of model judgment, so termination is guaranteed.
//! - [`SinglePass`] — exactly one research step (vector-index retrieval with
//!   LLM-only fallback on a miss), one generation, then formatting.
//!
//! The two policies are not equivalent and are never merged; callers select
//! one explicitly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::document::{Message, QueryState};
use crate::error::Result;
use crate::format::ResponseFormatter;
use crate::pipeline::{Pipeline, RetrievedContext};
use crate::prompts;
use crate::retry::call_gateway;

/// The phases of the refinement state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Generate,
    Research,
    PostProcess,
    End,
}

/// A control policy that answers one user query.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Answer `question` against `collection`, returning the full query
    /// session record.
    async fn answer(&self, collection: &str, question: &str) -> Result<QueryState>;
}

/// The generate/research refinement loop.
///
/// The round-limit predicate counts total accumulated messages, matching the
/// single place the bound is checked (after each generation step). The
/// formatted output is returned to the caller and never appended to the
/// conversation, so post-processing cannot perturb the count.
pub struct RefinementLoop {
    pipeline: Arc<Pipeline>,
    formatter: ResponseFormatter,
}

impl RefinementLoop {
    /// Create a refinement orchestrator over the given pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let formatter =
            ResponseFormatter::new(Arc::clone(pipeline.model()), pipeline.gateway_policy());
        Self { pipeline, formatter }
    }

    /// One generation step over the full conversation; appends the answer.
    async fn generate_step(&self, conversation: &mut Vec<Message>) -> Result<()> {
        let mut messages = vec![Message::system(prompts::GENERATE_SYSTEM)];
        messages.extend(conversation.iter().cloned());
        let model = self.pipeline.model();
        let answer = call_gateway(model.name(), self.pipeline.gateway_policy(), || {
            model.complete(&messages)
        })
        .await?;
        conversation.push(Message::assistant(answer));
        Ok(())
    }

    /// One research step: critique plus follow-up queries, appended as user
    /// input so the next generation step responds to it.
    async fn research_step(&self, conversation: &mut Vec<Message>) -> Result<()> {
        let mut messages = vec![Message::system(prompts::RESEARCH_SYSTEM)];
        messages.extend(conversation.iter().cloned());
        let model = self.pipeline.model();
        let critique = call_gateway(model.name(), self.pipeline.gateway_policy(), || {
            model.complete(&messages)
        })
        .await?;
        conversation.push(Message::user(critique));
        Ok(())
    }
}

#[async_trait]
impl Orchestrator for RefinementLoop {
    async fn answer(&self, _collection: &str, question: &str) -> Result<QueryState> {
        let round_limit = self.pipeline.config().round_limit;
        let mut conversation = vec![Message::user(question)];
        let mut phase = Phase::Generate;

        while phase != Phase::End {
            phase = match phase {
                Phase::Generate => match self.generate_step(&mut conversation).await {
                    // The loop exit depends only on message count.
                    Ok(()) if conversation.len() > round_limit => Phase::PostProcess,
                    Ok(()) => Phase::Research,
                    Err(e) => {
                        warn!(error = %e, "generation failed, moving to post-processing");
                        Phase::PostProcess
                    }
                },
                Phase::Research => match self.research_step(&mut conversation).await {
                    Ok(()) => Phase::Generate,
                    Err(e) => {
                        warn!(error = %e, "research failed, moving to post-processing");
                        Phase::PostProcess
                    }
                },
                Phase::PostProcess | Phase::End => Phase::End,
            };
        }

        // Format the latest message only, not the full history.
        let latest = conversation.last().map(|m| m.content.clone()).unwrap_or_default();
        let final_response = self.formatter.format(&latest).await?;
        info!(rounds = conversation.len(), "refinement finished");

        Ok(QueryState {
            user_query: question.to_string(),
            research_response: latest,
            final_response,
        })
    }
}

/// The single-pass supervisor policy: one research step, one generation,
/// then formatting.
pub struct SinglePass {
    pipeline: Arc<Pipeline>,
    formatter: ResponseFormatter,
}

impl SinglePass {
    /// Create a single-pass orchestrator over the given pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let formatter =
            ResponseFormatter::new(Arc::clone(pipeline.model()), pipeline.gateway_policy());
        Self { pipeline, formatter }
    }
}

#[async_trait]
impl Orchestrator for SinglePass {
    async fn answer(&self, collection: &str, question: &str) -> Result<QueryState> {
        let context = self.pipeline.retrieve_context(collection, question).await?;

        // On a hit the labeled summary is injected as a system message ahead
        // of the user's query; on a miss generation runs on the bare query.
        let mut messages = vec![Message::system(prompts::FINAL_SYSTEM)];
        if let RetrievedContext::Hit { summary, .. } = &context {
            messages.push(Message::system(format!("Summary of relevant document: {summary}")));
        }
        messages.push(Message::user(question));

        let model = self.pipeline.model();
        let research_response = call_gateway(model.name(), self.pipeline.gateway_policy(), || {
            model.complete(&messages)
        })
        .await?;

        let final_response = self.formatter.format(&research_response).await?;
        Ok(QueryState {
            user_query: question.to_string(),
            research_response,
            final_response,
        })
    }
}

/// Which orchestration policy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The bounded generate/research refinement loop.
    Refine,
    /// One research step, then post-processing.
    SinglePass,
}

impl Strategy {
    /// Parse a strategy name as used on the CLI.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "refine" => Ok(Self::Refine),
            "single-pass" => Ok(Self::SinglePass),
            other => Err(crate::RagError::InvalidArgument(format!(
                "unknown strategy '{other}', expected 'refine' or 'single-pass'"
            ))),
        }
    }

    /// Construct the orchestrator for this strategy.
    pub fn orchestrator(self, pipeline: Arc<Pipeline>) -> Arc<dyn Orchestrator> {
        match self {
            Self::Refine => Arc::new(RefinementLoop::new(pipeline)),
            Self::SinglePass => Arc::new(SinglePass::new(pipeline)),
        }
    }
}
