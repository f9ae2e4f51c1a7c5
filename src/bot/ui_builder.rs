//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// Import localization
use crate::localization::t_lang;

pub const CAMPUS_EVENTS: &[&str] = &[
    "Tech Talk by Google",
    "Annual Sports Meet",
    "Cultural Fest",
    "Career Fair",
];

pub const CAMPUS_FACILITIES: &[&str] = &[
    "Library",
    "Gym",
    "Computer Labs",
    "Cafeteria",
    "Student Center",
];

pub const CAMPUS_CLUBS: &[&str] = &[
    "Robotics Club",
    "Debate Society",
    "Music Band",
    "Entrepreneurship Cell",
];

pub const SOCIAL_EVENTS: &[&str] = &[
    "Movie Night",
    "Inter-College Quiz",
    "Volunteer Day",
    "International Food Festival",
];

pub const INDUSTRIES: &[&str] = &["Tech", "Finance", "Healthcare", "Education", "Entertainment"];

/// Lay buttons out two per row
fn two_per_row(buttons: Vec<InlineKeyboardButton>) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> =
        buttons.chunks(2).map(|row| row.to_vec()).collect();
    InlineKeyboardMarkup::new(rows)
}

fn buttons(entries: &[(&str, &str)], language_code: Option<&str>) -> Vec<InlineKeyboardButton> {
    entries
        .iter()
        .map(|(key, data)| InlineKeyboardButton::callback(t_lang(key, language_code), *data))
        .collect()
}

/// Main menu shown by /start and /help
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    two_per_row(buttons(
        &[
            ("menu-study", "study"),
            ("menu-career", "career"),
            ("menu-campus", "campus"),
            ("menu-social", "social"),
            ("menu-assignment", "assignment_solver"),
        ],
        language_code,
    ))
}

pub fn create_career_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    two_per_row(buttons(
        &[
            ("career-resume-review", "resume_review"),
            ("career-job-search", "job_search"),
            ("career-interview-tips", "interview_tips"),
            ("career-path", "career_path"),
            ("career-salary-negotiation", "salary_negotiation"),
            ("career-cover-letter", "cover_letter_generator"),
            ("career-industry-insights", "industry_insights"),
        ],
        language_code,
    ))
}

pub fn create_campus_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    two_per_row(buttons(
        &[
            ("campus-events", "campus_events"),
            ("campus-facilities", "campus_facilities"),
            ("campus-clubs", "campus_clubs"),
            ("campus-map", "campus_map"),
        ],
        language_code,
    ))
}

pub fn create_social_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    two_per_row(buttons(
        &[
            ("social-find-study-partner", "find_study_partner"),
            ("social-join-interest-group", "join_interest_group"),
            ("social-events", "social_events"),
            ("social-networking-tips", "networking_tips"),
        ],
        language_code,
    ))
}

/// One industry per row, data `insight_<industry>`
pub fn create_industry_keyboard() -> InlineKeyboardMarkup {
    let rows = INDUSTRIES
        .iter()
        .map(|industry| {
            vec![InlineKeyboardButton::callback(
                *industry,
                format!("insight_{}", industry.to_lowercase()),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Title line followed by one `- item` line per entry
pub fn format_bullet_list(title: &str, items: &[&str]) -> String {
    let mut result = String::from(title);
    for item in items {
        result.push_str("\n- ");
        result.push_str(item);
    }
    result
}

/// Title, blank line, body
pub fn with_title(title: &str, body: &str) -> String {
    format!("{title}\n\n{body}")
}
