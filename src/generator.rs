//! # Answer Generator
//!
//! Produces one answer per question by calling the text generation service.
//! Calls run with bounded concurrency; every result lands in the slot of its
//! question index, so answers stay aligned with questions whatever order the
//! calls complete in. A failed call is replaced by an error description and
//! never aborts the batch.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::prompts;
use crate::question_parser::QuestionRecord;

/// Single prompt in, full completion out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Reply used when the service returns an empty completion
pub const EMPTY_COMPLETION_REPLY: &str =
    "I apologize, but I couldn't generate a response. Could you please try rephrasing your question?";

/// Text shown in place of an answer whose generation failed
pub fn generation_failure_reply(err: &GenerationError) -> String {
    format!("An error occurred while processing your request: {err}")
}

/// Call the generator and always come back with displayable text
///
/// Empty completions become [`EMPTY_COMPLETION_REPLY`]; errors become
/// [`generation_failure_reply`].
pub async fn generate_reply(generator: &dyn TextGenerator, prompt: &str) -> String {
    match generator.generate(prompt).await {
        Ok(text) if text.trim().is_empty() => {
            warn!("Generation service returned an empty completion");
            EMPTY_COMPLETION_REPLY.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Generation call failed, substituting error description");
            generation_failure_reply(&e)
        }
    }
}

/// Answers assignment questions through a [`TextGenerator`]
#[derive(Clone)]
pub struct AnswerGenerator {
    generator: Arc<dyn TextGenerator>,
    max_concurrency: usize,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_concurrency(generator, DEFAULT_CONCURRENCY)
    }

    /// `max_concurrency` of 0 is treated as 1 (strictly sequential)
    pub fn with_concurrency(generator: Arc<dyn TextGenerator>, max_concurrency: usize) -> Self {
        Self {
            generator,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// One answer per question, `answers[i]` belongs to `questions[i]`
    pub async fn answer_all(&self, questions: &[QuestionRecord]) -> Vec<String> {
        let mut slots: Vec<Option<String>> = vec![None; questions.len()];

        // Collected up front so the stream's item type is free of closure lifetimes (keeps the future `Send`)
        let requests: Vec<_> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let generator = Arc::clone(&self.generator);
                let prompt = prompts::assignment_answer(question);
                async move {
                    debug!(question_index = index, "Requesting answer");
                    let answer = generate_reply(generator.as_ref(), &prompt).await;
                    (index, answer)
                }
            })
            .collect();
        let mut completed = stream::iter(requests).buffer_unordered(self.max_concurrency);

        while let Some((index, answer)) = completed.next().await {
            slots[index] = Some(answer);
        }

        let answers: Vec<String> = slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_string()))
            .collect();

        info!(
            questions = questions.len(),
            answers = answers.len(),
            "Answer generation completed"
        );
        answers
    }
}
