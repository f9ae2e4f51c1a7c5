//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId};
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::extractor::{DocumentKind, SourceDocument};
use crate::generator::generate_reply;
use crate::prompts;
use crate::session::{SessionDialogue, SessionState};

use super::dialogue_manager::{
    handle_assignment_query, handle_assignment_upload, handle_cover_letter_input,
    handle_document_question, handle_interview_answer,
};
use super::helpers::{extract_command, split_long_message, strip_prefix_ignore_case};
use super::ui_builder::{
    create_campus_keyboard, create_career_keyboard, create_main_menu_keyboard,
    create_social_keyboard, with_title,
};
use super::AppState;

/// What a text message asks for, before any session is considered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRoute {
    Command(String),
    CareerQuery(String),
    CampusQuery(String),
    SocialQuery(String),
    MockInterview(String),
    AssignmentQuery(String),
    Plain(String),
}

pub fn route_text(text: &str) -> TextRoute {
    let trimmed = text.trim();
    if trimmed.starts_with('/') {
        let (command, _) = extract_command(trimmed);
        return TextRoute::Command(command);
    }
    if let Some(query) = strip_prefix_ignore_case(trimmed, "career:") {
        TextRoute::CareerQuery(query.to_string())
    } else if let Some(query) = strip_prefix_ignore_case(trimmed, "campus:") {
        TextRoute::CampusQuery(query.to_string())
    } else if let Some(query) = strip_prefix_ignore_case(trimmed, "social:") {
        TextRoute::SocialQuery(query.to_string())
    } else if let Some(topic) = strip_prefix_ignore_case(trimmed, "mock interview:") {
        TextRoute::MockInterview(topic.to_string())
    } else if let Some(query) = strip_prefix_ignore_case(trimmed, "assignment:") {
        TextRoute::AssignmentQuery(query.to_string())
    } else {
        TextRoute::Plain(trimmed.to_string())
    }
}

pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Send `text`, split into as many messages as the Telegram limit needs
pub async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for part in split_long_message(text) {
        bot.send_message(chat_id, part).await?;
    }
    Ok(())
}

/// Generate a reply for `prompt` and send it under `title`
pub async fn reply_with_generation(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    title: Option<&str>,
    prompt: &str,
) -> Result<()> {
    bot.send_chat_action(chat_id, ChatAction::Typing).await?;
    let reply = generate_reply(state.generator.as_ref(), prompt).await;
    let text = match title {
        Some(title) => with_title(title, &reply),
        None => reply,
    };
    send_long_message(bot, chat_id, &text).await
}

/// The open session, reset to idle first if it has expired
async fn current_session(dialogue: &SessionDialogue, state: &AppState, chat_id: ChatId) -> Result<SessionState> {
    let session = dialogue.get().await?.unwrap_or_default();
    if session.is_expired(Utc::now(), state.session_ttl) {
        info!(user_id = %chat_id, session = session.name(), "Session expired, resetting");
        dialogue.reset().await?;
        return Ok(SessionState::Idle);
    }
    Ok(session)
}

fn message_language(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str())
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    dialogue: &SessionDialogue,
    session: &SessionState,
    command: &str,
    language_code: Option<&str>,
) -> Result<()> {
    match command {
        "/start" => {
            bot.send_message(msg.chat.id, t_lang("welcome", language_code))
                .reply_markup(create_main_menu_keyboard(language_code))
                .await?;
        }
        "/help" => {
            let help_message = with_title(
                &t_lang("welcome", language_code),
                &t_lang("help-commands", language_code),
            );
            bot.send_message(msg.chat.id, help_message)
                .reply_markup(create_main_menu_keyboard(language_code))
                .await?;
        }
        "/career" => {
            bot.send_message(msg.chat.id, t_lang("career-intro", language_code))
                .reply_markup(create_career_keyboard(language_code))
                .await?;
        }
        "/campus" => {
            bot.send_message(msg.chat.id, t_lang("campus-intro", language_code))
                .reply_markup(create_campus_keyboard(language_code))
                .await?;
        }
        "/social" => {
            bot.send_message(msg.chat.id, t_lang("social-intro", language_code))
                .reply_markup(create_social_keyboard(language_code))
                .await?;
        }
        "/exit_doc_chat" => {
            if matches!(session, SessionState::DocumentChat { .. }) {
                dialogue.reset().await?;
                info!(user_id = %msg.chat.id, "Left document chat mode");
                bot.send_message(msg.chat.id, t_lang("document-chat-exited", language_code))
                    .await?;
            } else {
                bot.send_message(msg.chat.id, t_lang("document-chat-not-active", language_code))
                    .await?;
            }
        }
        _ => {
            debug!(user_id = %msg.chat.id, command, "Unknown command");
            bot.send_message(msg.chat.id, t_lang("help-commands", language_code))
                .await?;
        }
    }
    Ok(())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    session: SessionState,
    text: &str,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, message_length = text.len(), session = session.name(), "Received text message from user");
    let language_code = message_language(msg);
    let route = route_text(text);

    // Sessions waiting for a single reply take the next non-command message
    match (&session, &route) {
        (SessionState::AwaitingCoverLetterDetails { .. }, TextRoute::Command(_)) => {}
        (SessionState::AwaitingCoverLetterDetails { .. }, _) => {
            return handle_cover_letter_input(bot, msg, dialogue, state, text, language_code).await;
        }
        (SessionState::AwaitingInterviewAnswer { .. }, TextRoute::Command(_)) => {}
        (SessionState::AwaitingInterviewAnswer { topic, .. }, _) => {
            return handle_interview_answer(bot, msg, dialogue, state, topic, text, language_code)
                .await;
        }
        _ => {}
    }

    match route {
        TextRoute::Command(command) => {
            handle_command(bot, msg, &dialogue, &session, &command, language_code).await
        }
        TextRoute::CareerQuery(query) => {
            reply_with_generation(
                bot,
                msg.chat.id,
                state,
                Some(&t_lang("career-advice-title", language_code)),
                &prompts::career_advice(&query),
            )
            .await
        }
        TextRoute::CampusQuery(query) => {
            reply_with_generation(
                bot,
                msg.chat.id,
                state,
                Some(&t_lang("campus-info-title", language_code)),
                &prompts::campus_information(&query),
            )
            .await
        }
        TextRoute::SocialQuery(query) => {
            reply_with_generation(
                bot,
                msg.chat.id,
                state,
                Some(&t_lang("social-info-title", language_code)),
                &prompts::social_connection(&query),
            )
            .await
        }
        TextRoute::MockInterview(topic) => {
            handle_mock_interview(bot, msg, dialogue, state, &topic, language_code).await
        }
        TextRoute::AssignmentQuery(query)
            if matches!(session, SessionState::AwaitingAssignment { .. }) =>
        {
            handle_assignment_query(bot, msg, dialogue, state, &query, language_code).await
        }
        TextRoute::AssignmentQuery(_) | TextRoute::Plain(_) => match session {
            SessionState::DocumentChat { document_text, .. } => {
                handle_document_question(bot, msg, state, &document_text, text).await
            }
            _ => reply_with_generation(bot, msg.chat.id, state, None, text).await,
        },
    }
}

async fn handle_mock_interview(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    topic: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if topic.is_empty() {
        bot.send_message(msg.chat.id, t_lang("mock-interview-missing-topic", language_code))
            .await?;
        return Ok(());
    }

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
    let questions = generate_reply(state.generator.as_ref(), &prompts::mock_interview_questions(topic)).await;
    let reply = format!(
        "{}\n\n{}",
        with_title(
            &t_args_lang("mock-interview-title", &[("topic", topic)], language_code),
            &questions
        ),
        t_lang("mock-interview-instructions", language_code)
    );
    send_long_message(bot, msg.chat.id, &reply).await?;

    dialogue
        .update(SessionState::awaiting_interview_answer(topic))
        .await?;
    info!(user_id = %msg.chat.id, topic, "Mock interview started");
    Ok(())
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    session: SessionState,
) -> Result<()> {
    let language_code = message_language(msg);
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) else {
        return Ok(());
    };
    let file_id = largest_photo.file.id.clone();

    if matches!(session, SessionState::AwaitingAssignment { .. }) {
        let file_name = format!("assignment_{file_id}.jpg");
        return handle_assignment_upload(
            bot,
            msg,
            dialogue,
            state,
            file_id,
            DocumentKind::Image,
            file_name,
            language_code,
        )
        .await;
    }

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
    let bytes = match download_file(bot, file_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to download photo for user");
            bot.send_message(msg.chat.id, t_lang("error-download-failed", language_code))
                .await?;
            return Ok(());
        }
    };

    let document = SourceDocument::new(bytes, DocumentKind::Image, "study_photo.jpg");
    match state.extractor.extract(&document).await {
        Ok(text) if text.trim().is_empty() => {
            warn!(user_id = %msg.chat.id, "OCR extraction returned empty text");
            bot.send_message(msg.chat.id, t_lang("photo-no-text", language_code))
                .await?;
            Ok(())
        }
        Ok(text) => {
            reply_with_generation(bot, msg.chat.id, state, None, &prompts::study_photo(&text)).await
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to read study photo");
            let error_text = e.to_string();
            bot.send_message(
                msg.chat.id,
                t_args_lang("error-image-processing", &[("error", error_text.as_str())], language_code),
            )
            .await?;
            Ok(())
        }
    }
}

async fn handle_document_message(
    bot: &Bot,
    msg: &Message,
    dialogue: SessionDialogue,
    state: &AppState,
    session: SessionState,
) -> Result<()> {
    let language_code = message_language(msg);

    let Some(doc) = msg.document() else {
        return Ok(());
    };
    let kind = doc
        .mime_type
        .as_ref()
        .and_then(|mime| DocumentKind::from_mime(mime.essence_str()));
    debug!(user_id = %msg.chat.id, mime_type = ?doc.mime_type, kind = ?kind, "Received document from user");

    if matches!(session, SessionState::AwaitingAssignment { .. }) {
        let Some(kind) = kind else {
            bot.send_message(msg.chat.id, t_lang("error-unsupported-format", language_code))
                .await?;
            return Ok(());
        };
        let file_name = doc
            .file_name
            .clone()
            .unwrap_or_else(|| format!("assignment_{}", doc.file.id));
        return handle_assignment_upload(
            bot,
            msg,
            dialogue,
            state,
            doc.file.id.clone(),
            kind,
            file_name,
            language_code,
        )
        .await;
    }

    if kind != Some(DocumentKind::Pdf) {
        bot.send_message(msg.chat.id, t_lang("document-pdf-only", language_code))
            .await?;
        return Ok(());
    }

    let bytes = match download_file(bot, doc.file.id.clone()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to download document for user");
            bot.send_message(msg.chat.id, t_lang("error-download-failed", language_code))
                .await?;
            return Ok(());
        }
    };

    let file_name = doc.file_name.clone().unwrap_or_default();
    let document = SourceDocument::new(bytes, DocumentKind::Pdf, file_name);
    match state.extractor.extract(&document).await {
        Ok(text) => {
            info!(user_id = %msg.chat.id, chars_extracted = text.len(), "Entering document chat mode");
            dialogue.update(SessionState::document_chat(text)).await?;
            bot.send_message(msg.chat.id, t_lang("document-chat-started", language_code))
                .await?;
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to read uploaded PDF");
            let error_text = e.to_string();
            bot.send_message(
                msg.chat.id,
                t_args_lang("error-document-processing", &[("error", error_text.as_str())], language_code),
            )
            .await?;
        }
    }
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    let language_code = message_language(msg);
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t_lang("error-unsupported-format", language_code))
        .await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: SessionDialogue,
    state: Arc<AppState>,
) -> Result<()> {
    let session = current_session(&dialogue, &state, msg.chat.id).await?;

    if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, dialogue, &state, session, text).await?;
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, dialogue, &state, session).await?;
    } else if msg.document().is_some() {
        handle_document_message(&bot, &msg, dialogue, &state, session).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
