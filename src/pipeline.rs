//! # Assignment Pipeline
//!
//! Runs an uploaded assignment through extraction, question parsing, answer
//! generation, formatting and rendering. Stages run strictly in that order;
//! the first fatal error moves the run to [`PipelineStage::Failed`] and the
//! remaining stages are skipped. There is no retry and no rollback.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::errors::PipelineError;
use crate::extractor::{SourceDocument, TextExtractor};
use crate::formatter::{self, LOG_PREVIEW_CHARS};
use crate::generator::{AnswerGenerator, TextGenerator};
use crate::question_parser::QuestionParser;
use crate::renderer::DocumentRenderer;

pub const ARTIFACT_CAPTION: &str = "Here's your solved assignment!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Parsing,
    Generating,
    Formatting,
    Rendering,
    Done,
    Failed,
}

/// Identifies one run; the artifact file name is derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId {
    pub chat_id: i64,
    pub message_id: i32,
}

impl JobId {
    pub fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }

    pub fn artifact_file_name(&self) -> String {
        format!("solved_assignment_{}_{}.pdf", self.chat_id, self.message_id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}

/// The rendered solution document on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub caption: String,
    pub size_bytes: u64,
}

impl Artifact {
    /// Delete the file after delivery; a file that is already gone is fine
    pub fn discard(self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Artifact removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove artifact");
                Err(e)
            }
        }
    }
}

/// A fatal error together with the stage it happened in
#[derive(Debug)]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub error: PipelineError,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (during {:?})", self.error, self.stage)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Extract → parse → generate → format → render
pub struct AssignmentPipeline {
    extractor: TextExtractor,
    parser: QuestionParser,
    answers: AnswerGenerator,
    renderer: DocumentRenderer,
    output_dir: PathBuf,
}

impl AssignmentPipeline {
    pub fn new(
        extractor: TextExtractor,
        generator: Arc<dyn TextGenerator>,
        max_concurrency: usize,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extractor,
            parser: QuestionParser::new(),
            answers: AnswerGenerator::with_concurrency(generator, max_concurrency),
            renderer: DocumentRenderer::default(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_parser(mut self, parser: QuestionParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_renderer(mut self, renderer: DocumentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn artifact_path(&self, job: JobId) -> PathBuf {
        self.output_dir.join(job.artifact_file_name())
    }

    /// Run every stage for `document`
    ///
    /// # Errors
    ///
    /// A [`PipelineFailure`] naming the stage that failed. Generation errors
    /// are not fatal: they are substituted per question.
    pub async fn run(
        &self,
        document: &SourceDocument,
        job: JobId,
    ) -> Result<Artifact, PipelineFailure> {
        let fail = |stage: PipelineStage, error: PipelineError| {
            error!(job = %job, stage = ?stage, error = %error, "Assignment pipeline failed");
            PipelineFailure {
                stage,
                error,
            }
        };

        enter(job, PipelineStage::Extracting);
        let text = self
            .extractor
            .extract(document)
            .await
            .map_err(|e| fail(PipelineStage::Extracting, e))?;
        debug!(
            job = %job,
            preview = %formatter::preview(&text, LOG_PREVIEW_CHARS),
            "Extracted assignment text"
        );

        enter(job, PipelineStage::Parsing);
        let questions = self.parser.parse_or_fallback(&text);

        enter(job, PipelineStage::Generating);
        let answers = self.answers.answer_all(&questions).await;

        enter(job, PipelineStage::Formatting);
        let body = formatter::format_solution(&questions, &answers);

        enter(job, PipelineStage::Rendering);
        let path = self.artifact_path(job);
        let size_bytes = self
            .renderer
            .render_to_file(&body, &path)
            .map_err(|e| fail(PipelineStage::Rendering, e))?;

        enter(job, PipelineStage::Done);
        info!(
            job = %job,
            questions = questions.len(),
            path = %path.display(),
            size_bytes,
            "Assignment solved"
        );
        Ok(Artifact {
            path,
            caption: ARTIFACT_CAPTION.to_string(),
            size_bytes,
        })
    }
}

fn enter(job: JobId, stage: PipelineStage) {
    debug!(job = %job, stage = ?stage, "Pipeline stage");
}
