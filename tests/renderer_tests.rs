//! # Renderer Tests
//!
//! PDF output of the document renderer, checked by reading the files back.

use anyhow::Result;
use lopdf::Document;
use tempfile::TempDir;

use college_companion::errors::PipelineError;
use college_companion::extractor::extract_pdf_text;
use college_companion::formatter::format_solution;
use college_companion::question_parser::QuestionRecord;
use college_companion::renderer::DocumentRenderer;

#[test]
fn test_rendered_solution_reads_back() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("solution.pdf");
    let body = format_solution(
        &[QuestionRecord::new("What is recursion?", "5", "CO1", "L1,L2")],
        &["Recursion is a function calling itself.".to_string()],
    );

    let size = DocumentRenderer::default().render_to_file(&body, &path)?;

    assert_eq!(size, std::fs::metadata(&path)?.len());
    let text = extract_pdf_text(&std::fs::read(&path)?)?;
    assert!(text.contains("Question 1: What is recursion?"));
    assert!(text.contains("Answer: Recursion is a function calling itself."));
    Ok(())
}

#[test]
fn test_empty_body_leaves_existing_file_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("solution.pdf");
    std::fs::write(&path, b"previous artifact")?;

    let result = DocumentRenderer::default().render_to_file("", &path);

    assert!(matches!(result, Err(PipelineError::Render(_))));
    assert_eq!(std::fs::read(&path)?, b"previous artifact");
    Ok(())
}

#[test]
fn test_empty_body_creates_no_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("never.pdf");

    assert!(DocumentRenderer::default().render_to_file("", &path).is_err());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_existing_file_is_overwritten() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("solution.pdf");
    std::fs::write(&path, b"stale")?;

    DocumentRenderer::default().render_to_file("Question 1: fresh content", &path)?;

    let bytes = std::fs::read(&path)?;
    assert!(bytes.starts_with(b"%PDF"));
    assert!(extract_pdf_text(&bytes)?.contains("fresh content"));
    Ok(())
}

#[test]
fn test_long_solution_spans_pages() -> Result<()> {
    let questions: Vec<QuestionRecord> = (1..=30)
        .map(|i| QuestionRecord::new(format!("Question body number {i}"), "2", "CO1", "L1"))
        .collect();
    let answers: Vec<String> = (1..=30)
        .map(|i| format!("Answer text for item {i}. ").repeat(12))
        .collect();
    let body = format_solution(&questions, &answers);

    let bytes = DocumentRenderer::default().render_to_bytes(&body)?;
    let document = Document::load_mem(&bytes)?;
    assert!(document.get_pages().len() > 1);

    let text = extract_pdf_text(&bytes)?;
    assert!(text.contains("Question 30: Question body number 30"));
    Ok(())
}

#[test]
fn test_missing_parent_directory_is_created() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("uploads").join("nested").join("solution.pdf");

    let size = DocumentRenderer::default().render_to_file("Question 1: nested", &path)?;

    assert!(size > 0);
    assert!(path.exists());
    Ok(())
}
