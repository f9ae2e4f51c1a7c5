//! # Integration Tests
//!
//! End-to-end runs of the assignment pipeline with stub generators: a real
//! PDF goes in, a rendered PDF artifact comes out.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lopdf::Document;
use tempfile::TempDir;

use college_companion::errors::{GenerationError, PipelineError};
use college_companion::extractor::{extract_pdf_text, DocumentKind, SourceDocument, TextExtractor};
use college_companion::generator::TextGenerator;
use college_companion::pipeline::{AssignmentPipeline, JobId, PipelineStage, ARTIFACT_CAPTION};
use college_companion::question_parser::QuestionParser;
use college_companion::renderer::{DocumentRenderer, PageLayout};

struct FixedAnswer(&'static str);

#[async_trait]
impl TextGenerator for FixedAnswer {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

/// Fails every prompt mentioning `needle`
struct FailingOn(&'static str);

#[async_trait]
impl TextGenerator for FailingOn {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.contains(self.0) {
            Err(GenerationError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        } else {
            Ok("A short answer.".to_string())
        }
    }
}

fn assignment_pdf(text: &str) -> Vec<u8> {
    DocumentRenderer::default()
        .render_to_bytes(text)
        .expect("Failed to build input PDF")
}

fn pipeline(dir: &TempDir, generator: Arc<dyn TextGenerator>) -> AssignmentPipeline {
    AssignmentPipeline::new(TextExtractor::default(), generator, 2, dir.path())
}

#[tokio::test]
async fn test_single_question_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(
        &dir,
        Arc::new(FixedAnswer("Recursion is a function calling itself.")),
    );
    let document = SourceDocument::new(
        assignment_pdf("1 What is recursion? 5 CO1 L1,L2"),
        DocumentKind::Pdf,
        "assignment.pdf",
    );

    let artifact = pipeline.run(&document, JobId::new(100, 1)).await?;

    assert_eq!(artifact.path, dir.path().join("solved_assignment_100_1.pdf"));
    assert_eq!(artifact.caption, ARTIFACT_CAPTION);
    assert!(artifact.size_bytes > 0);
    assert_eq!(std::fs::metadata(&artifact.path)?.len(), artifact.size_bytes);

    let solved = extract_pdf_text(&std::fs::read(&artifact.path)?)?;
    assert!(solved.contains("Question 1: What is recursion?"));
    assert!(solved.contains("Marks: 5, CO: CO1, LO: L1,L2"));
    assert!(solved.contains("Answer: Recursion is a function calling itself."));
    assert!(solved.contains(&"-".repeat(40)));

    let path = artifact.path.clone();
    artifact.discard()?;
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn test_questions_keep_source_order() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(&dir, Arc::new(FixedAnswer("Answered.")));
    let document = SourceDocument::new(
        assignment_pdf("1 Define a process. 2 CO1 L1\n2 Define a thread. 3 CO2 L2,L3"),
        DocumentKind::Pdf,
        "os.pdf",
    );

    let artifact = pipeline.run(&document, JobId::new(7, 3)).await?;
    let solved = extract_pdf_text(&std::fs::read(&artifact.path)?)?;

    let first = solved.find("Question 1: Define a process.").expect("first question");
    let second = solved.find("Question 2: Define a thread.").expect("second question");
    assert!(first < second);
    assert!(solved.contains("Marks: 3, CO: CO2, LO: L2,L3"));
    Ok(())
}

#[tokio::test]
async fn test_text_without_questions_uses_fallback() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(&dir, Arc::new(FixedAnswer("The main points are...")));
    let document = SourceDocument::new(
        assignment_pdf("Read chapter four and reflect on it."),
        DocumentKind::Pdf,
        "reading.pdf",
    );

    let artifact = pipeline.run(&document, JobId::new(5, 9)).await?;
    let solved = extract_pdf_text(&std::fs::read(&artifact.path)?)?;

    assert!(solved.contains("Question 1: Please provide a summary of the main points in the assignment."));
    assert!(solved.contains("Marks: N/A, CO: N/A, LO: N/A"));
    assert!(!solved.contains("Question 2"));
    Ok(())
}

#[tokio::test]
async fn test_generation_failure_does_not_abort_run() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(&dir, Arc::new(FailingOn("thread")));
    let document = SourceDocument::new(
        assignment_pdf("1 Define a process. 2 CO1 L1\n2 Define a thread. 3 CO2 L2"),
        DocumentKind::Pdf,
        "os.pdf",
    );

    let artifact = pipeline.run(&document, JobId::new(8, 8)).await?;
    let solved = extract_pdf_text(&std::fs::read(&artifact.path)?)?;

    assert!(solved.contains("Answer: A short answer."));
    assert!(solved.contains("An error occurred while processing your request"));
    assert!(solved.contains("Question 2: Define a thread."));
    Ok(())
}

#[tokio::test]
async fn test_malformed_pdf_reports_extracting_failure() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(&dir, Arc::new(FixedAnswer("unused")));
    let document = SourceDocument::new(
        b"%PDF-garbage without any objects".to_vec(),
        DocumentKind::Pdf,
        "broken.pdf",
    );

    let failure = pipeline
        .run(&document, JobId::new(1, 2))
        .await
        .expect_err("Malformed PDF should fail");

    assert_eq!(failure.stage, PipelineStage::Extracting);
    assert!(matches!(failure.error, PipelineError::Decode(_)));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_jobs_do_not_share_artifacts() -> Result<()> {
    let dir = TempDir::new()?;
    let pipeline = pipeline(&dir, Arc::new(FixedAnswer("Answered.")));
    let first = SourceDocument::new(
        assignment_pdf("1 What is a stack? 2 CO1 L1"),
        DocumentKind::Pdf,
        "a.pdf",
    );
    let second = SourceDocument::new(
        assignment_pdf("1 What is a queue? 2 CO1 L1"),
        DocumentKind::Pdf,
        "b.pdf",
    );

    let (a, b) = tokio::join!(
        pipeline.run(&first, JobId::new(11, 1)),
        pipeline.run(&second, JobId::new(12, 1))
    );
    let (a, b) = (a?, b?);

    assert_ne!(a.path, b.path);
    let text_a = extract_pdf_text(&std::fs::read(&a.path)?)?;
    let text_b = extract_pdf_text(&std::fs::read(&b.path)?)?;
    assert!(text_a.contains("stack") && !text_a.contains("queue"));
    assert!(text_b.contains("queue") && !text_b.contains("stack"));
    Ok(())
}

#[tokio::test]
async fn test_custom_question_format_and_page_size() -> Result<()> {
    let dir = TempDir::new()?;
    let a4 = PageLayout {
        width: 595.0,
        height: 842.0,
        ..PageLayout::default()
    };
    let pipeline = pipeline(&dir, Arc::new(FixedAnswer("Disorder of a system.")))
        .with_parser(QuestionParser::with_pattern(
            r"Q(\d+)\s+(.*?)\s+\[(\d+)\]\s+(CO\d+)\s+(L\d+)",
        )?)
        .with_renderer(DocumentRenderer::new(a4));
    let document = SourceDocument::new(
        assignment_pdf("Q1 Define entropy [3] CO4 L2"),
        DocumentKind::Pdf,
        "thermo.pdf",
    );

    let artifact = pipeline.run(&document, JobId::new(21, 4)).await?;
    let bytes = std::fs::read(&artifact.path)?;

    let solved = extract_pdf_text(&bytes)?;
    assert!(solved.contains("Question 1: Define entropy"));
    assert!(solved.contains("Marks: 3, CO: CO4, LO: L2"));

    let pdf = Document::load_mem(&bytes)?;
    let page_id = *pdf.get_pages().values().next().expect("one page");
    let parent = pdf.get_dictionary(page_id)?.get(b"Parent")?.as_reference()?;
    let media_box = pdf.get_dictionary(parent)?.get(b"MediaBox")?.as_array()?;
    assert_eq!(media_box[2].as_float()?, 595.0);
    assert_eq!(media_box[3].as_float()?, 842.0);
    Ok(())
}
