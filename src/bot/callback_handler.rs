//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, info};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::prompts;
use crate::session::{SessionDialogue, SessionState};

use super::helpers::capitalize;
use super::message_handler::reply_with_generation;
use super::ui_builder::{
    create_campus_keyboard, create_career_keyboard, create_industry_keyboard,
    create_social_keyboard, format_bullet_list, CAMPUS_CLUBS, CAMPUS_EVENTS, CAMPUS_FACILITIES,
    SOCIAL_EVENTS,
};
use super::AppState;

/// A button press, decoded from its callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    StudyMenu,
    CareerMenu,
    CampusMenu,
    SocialMenu,
    AssignmentSolver,
    ResumeReview,
    JobSearch,
    InterviewTips,
    CareerPath,
    SalaryNegotiation,
    CoverLetter,
    IndustryInsights,
    Insight(String),
    CampusEvents,
    CampusFacilities,
    CampusClubs,
    CampusMap,
    FindStudyPartner,
    JoinInterestGroup,
    SocialEvents,
    NetworkingTips,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "study" => CallbackAction::StudyMenu,
            "career" => CallbackAction::CareerMenu,
            "campus" => CallbackAction::CampusMenu,
            "social" => CallbackAction::SocialMenu,
            "assignment_solver" => CallbackAction::AssignmentSolver,
            "resume_review" => CallbackAction::ResumeReview,
            "job_search" => CallbackAction::JobSearch,
            "interview_tips" => CallbackAction::InterviewTips,
            "career_path" => CallbackAction::CareerPath,
            "salary_negotiation" => CallbackAction::SalaryNegotiation,
            "cover_letter_generator" => CallbackAction::CoverLetter,
            "industry_insights" => CallbackAction::IndustryInsights,
            "campus_events" => CallbackAction::CampusEvents,
            "campus_facilities" => CallbackAction::CampusFacilities,
            "campus_clubs" => CallbackAction::CampusClubs,
            "campus_map" => CallbackAction::CampusMap,
            "find_study_partner" => CallbackAction::FindStudyPartner,
            "join_interest_group" => CallbackAction::JoinInterestGroup,
            "social_events" => CallbackAction::SocialEvents,
            "networking_tips" => CallbackAction::NetworkingTips,
            other => match other.strip_prefix("insight_") {
                Some(industry) if !industry.is_empty() => {
                    CallbackAction::Insight(industry.to_string())
                }
                _ => CallbackAction::Unknown(other.to_string()),
            },
        }
    }

    /// Localization key of the toast shown while the action runs
    fn acknowledgement_key(&self) -> Option<&'static str> {
        match self {
            CallbackAction::StudyMenu => Some("opening-study"),
            CallbackAction::CareerMenu => Some("opening-career"),
            CallbackAction::CampusMenu => Some("opening-campus"),
            CallbackAction::SocialMenu => Some("opening-social"),
            CallbackAction::AssignmentSolver => Some("opening-assignment"),
            _ => None,
        }
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: SessionDialogue,
    state: Arc<AppState>,
) -> Result<()> {
    let language_code = q.from.language_code.as_deref();
    let action = CallbackAction::parse(q.data.as_deref().unwrap_or(""));
    debug!(user_id = %q.from.id, action = ?action, "Received callback query from user");

    // Acknowledge first; generated replies can take longer than the query lives
    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(key) = action.acknowledgement_key() {
        answer = answer.text(t_lang(key, language_code));
    }
    answer.await?;

    let Some(chat_id) = q.message.as_ref().map(|msg| msg.chat().id) else {
        return Ok(());
    };

    match action {
        CallbackAction::StudyMenu => {
            bot.send_message(chat_id, t_lang("study-intro", language_code))
                .await?;
        }
        CallbackAction::CareerMenu => {
            bot.send_message(chat_id, t_lang("career-intro", language_code))
                .reply_markup(create_career_keyboard(language_code))
                .await?;
        }
        CallbackAction::CampusMenu => {
            bot.send_message(chat_id, t_lang("campus-intro", language_code))
                .reply_markup(create_campus_keyboard(language_code))
                .await?;
        }
        CallbackAction::SocialMenu => {
            bot.send_message(chat_id, t_lang("social-intro", language_code))
                .reply_markup(create_social_keyboard(language_code))
                .await?;
        }
        CallbackAction::AssignmentSolver => {
            dialogue.update(SessionState::awaiting_assignment()).await?;
            info!(user_id = %chat_id, "Assignment solver session opened");
            bot.send_message(chat_id, t_lang("assignment-welcome", language_code))
                .await?;
        }
        CallbackAction::ResumeReview => {
            bot.send_message(chat_id, t_lang("resume-review-prompt", language_code))
                .await?;
        }
        CallbackAction::JobSearch => {
            bot.send_message(chat_id, t_lang("job-search-prompt", language_code))
                .await?;
        }
        CallbackAction::CareerPath => {
            bot.send_message(chat_id, t_lang("career-path-prompt", language_code))
                .await?;
        }
        CallbackAction::InterviewTips => {
            reply_with_generation(
                &bot,
                chat_id,
                &state,
                Some(&t_lang("interview-tips-title", language_code)),
                prompts::INTERVIEW_TIPS,
            )
            .await?;
        }
        CallbackAction::SalaryNegotiation => {
            reply_with_generation(
                &bot,
                chat_id,
                &state,
                Some(&t_lang("salary-tips-title", language_code)),
                prompts::SALARY_NEGOTIATION_TIPS,
            )
            .await?;
        }
        CallbackAction::CoverLetter => {
            dialogue.update(SessionState::awaiting_cover_letter()).await?;
            bot.send_message(chat_id, t_lang("cover-letter-prompt", language_code))
                .await?;
        }
        CallbackAction::IndustryInsights => {
            bot.send_message(chat_id, t_lang("industry-select", language_code))
                .reply_markup(create_industry_keyboard())
                .await?;
        }
        CallbackAction::Insight(industry) => {
            let display_name = capitalize(&industry);
            reply_with_generation(
                &bot,
                chat_id,
                &state,
                Some(&t_args_lang(
                    "industry-insights-title",
                    &[("industry", display_name.as_str())],
                    language_code,
                )),
                &prompts::industry_insights(&industry),
            )
            .await?;
        }
        CallbackAction::CampusEvents => {
            let list = format_bullet_list(&t_lang("campus-events-title", language_code), CAMPUS_EVENTS);
            bot.send_message(chat_id, list).await?;
        }
        CallbackAction::CampusFacilities => {
            let list = format_bullet_list(
                &t_lang("campus-facilities-title", language_code),
                CAMPUS_FACILITIES,
            );
            bot.send_message(chat_id, list).await?;
        }
        CallbackAction::CampusClubs => {
            let list = format_bullet_list(&t_lang("campus-clubs-title", language_code), CAMPUS_CLUBS);
            bot.send_message(chat_id, list).await?;
        }
        CallbackAction::CampusMap => {
            bot.send_message(chat_id, t_lang("campus-map-link", language_code))
                .await?;
        }
        CallbackAction::FindStudyPartner => {
            bot.send_message(chat_id, t_lang("study-partner-prompt", language_code))
                .await?;
        }
        CallbackAction::JoinInterestGroup => {
            bot.send_message(chat_id, t_lang("interest-group-prompt", language_code))
                .await?;
        }
        CallbackAction::SocialEvents => {
            let list = format_bullet_list(&t_lang("social-events-title", language_code), SOCIAL_EVENTS);
            bot.send_message(chat_id, list).await?;
        }
        CallbackAction::NetworkingTips => {
            reply_with_generation(
                &bot,
                chat_id,
                &state,
                Some(&t_lang("networking-tips-title", language_code)),
                prompts::NETWORKING_TIPS,
            )
            .await?;
        }
        CallbackAction::Unknown(data) => {
            debug!(user_id = %chat_id, data = %data, "Unknown callback data");
            bot.send_message(chat_id, t_lang("unknown-action", language_code))
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_actions() {
        assert_eq!(CallbackAction::parse("study"), CallbackAction::StudyMenu);
        assert_eq!(CallbackAction::parse("assignment_solver"), CallbackAction::AssignmentSolver);
        assert_eq!(CallbackAction::parse("cover_letter_generator"), CallbackAction::CoverLetter);
    }

    #[test]
    fn test_parse_industry_insight() {
        assert_eq!(
            CallbackAction::parse("insight_finance"),
            CallbackAction::Insight("finance".to_string())
        );
        assert_eq!(
            CallbackAction::parse("insight_"),
            CallbackAction::Unknown("insight_".to_string())
        );
    }

    #[test]
    fn test_only_menus_have_acknowledgements() {
        assert_eq!(CallbackAction::StudyMenu.acknowledgement_key(), Some("opening-study"));
        assert_eq!(CallbackAction::CampusMap.acknowledgement_key(), None);
    }
}
