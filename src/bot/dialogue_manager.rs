//! Dialogue Manager module for handling input that belongs to an open session

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId, InputFile};
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::extractor::{DocumentKind, SourceDocument};
use crate::generator::generate_reply;
use crate::pipeline::{JobId, PipelineStage};
use crate::prompts::{self, CoverLetterDetails};
use crate::session::SessionDialogue;

use super::helpers::{sanitize_input, truncate_response};
use super::message_handler::{download_file, reply_with_generation};
use super::AppState;

/// Solve an uploaded assignment and send back the rendered document
///
/// The session is closed afterwards whether or not the run succeeded.
#[allow(clippy::too_many_arguments)]
pub async fn handle_assignment_upload(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    file_id: FileId,
    kind: DocumentKind,
    file_name: String,
    language_code: Option<&str>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, file_name = %file_name, kind = ?kind, "Assignment upload received");

    let bytes = match download_file(bot, file_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to download assignment for user");
            bot.send_message(msg.chat.id, t_lang("error-download-failed", language_code))
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, t_lang("assignment-received", language_code))
        .await?;
    bot.send_chat_action(msg.chat.id, ChatAction::UploadDocument)
        .await?;

    let document = SourceDocument::new(bytes, kind, file_name);
    let job = JobId::new(msg.chat.id.0, msg.id.0);

    let result = state.pipeline.run(&document, job).await;
    dialogue.exit().await?;

    match result {
        Ok(artifact) => {
            let sent = bot
                .send_document(msg.chat.id, InputFile::file(artifact.path.clone()))
                .caption(artifact.caption.clone())
                .await;
            if let Err(e) = artifact.discard() {
                warn!(user_id = %msg.chat.id, error = %e, "Solved assignment left on disk");
            }
            sent?;
            info!(user_id = %msg.chat.id, job = %job, "Solved assignment delivered");
        }
        Err(failure) => {
            let reply = match failure.stage {
                PipelineStage::Rendering => t_lang("error-document-generation", language_code),
                _ => {
                    let error_text = failure.error.to_string();
                    t_args_lang(
                        "error-assignment-processing",
                        &[("error", error_text.as_str())],
                        language_code,
                    )
                }
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
    }
    Ok(())
}

/// Answer a single typed assignment question and close the session
pub async fn handle_assignment_query(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    query: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let query = sanitize_input(query);
    if query.is_empty() {
        bot.send_message(msg.chat.id, t_lang("empty-query", language_code))
            .await?;
        return Ok(());
    }

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
    let answer = generate_reply(state.generator.as_ref(), &prompts::assignment_query(&query)).await;
    bot.send_message(msg.chat.id, truncate_response(&answer))
        .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Write a cover letter from "name, company, position, skills"
pub async fn handle_cover_letter_input(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    dialogue.exit().await?;

    match CoverLetterDetails::parse(text) {
        Some(details) => {
            info!(user_id = %msg.chat.id, company = %details.company, "Generating cover letter");
            reply_with_generation(
                bot,
                msg.chat.id,
                state,
                Some(&t_lang("cover-letter-title", language_code)),
                &prompts::cover_letter(&details),
            )
            .await
        }
        None => {
            debug!(user_id = %msg.chat.id, "Cover letter details incomplete");
            bot.send_message(msg.chat.id, t_lang("cover-letter-invalid", language_code))
                .await?;
            Ok(())
        }
    }
}

/// Feedback on the answer to a mock interview
pub async fn handle_interview_answer(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    topic: &str,
    answer: &str,
    language_code: Option<&str>,
) -> Result<()> {
    dialogue.exit().await?;
    reply_with_generation(
        bot,
        msg.chat.id,
        state,
        Some(&t_lang("interview-feedback-title", language_code)),
        &prompts::interview_feedback(topic, answer),
    )
    .await
}

/// Answer a question about the document held by the session
pub async fn handle_document_question(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    document_text: &str,
    question: &str,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, document_chars = document_text.len(), "Answering document question");
    reply_with_generation(
        bot,
        msg.chat.id,
        state,
        None,
        &prompts::document_question(document_text, question),
    )
    .await
}
