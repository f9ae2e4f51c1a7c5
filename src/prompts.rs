//! Prompt templates sent to the generation service.

use crate::question_parser::QuestionRecord;

/// Prompt for one parsed assignment question
pub fn assignment_answer(question: &QuestionRecord) -> String {
    format!(
        "Provide a concise, accurate, and straightforward answer to this question: {} (CO: {}, LO: {})",
        question.text, question.course_outcome, question.learning_outcomes
    )
}

/// Prompt for a question typed after the `assignment:` prefix
pub fn assignment_query(query: &str) -> String {
    format!("Answer this assignment question: {query}")
}

/// Prompt for a question about a document the user uploaded earlier
pub fn document_question(document_text: &str, question: &str) -> String {
    format!("Based on the following document: {document_text}\n\nUser question: {question}")
}

/// Prompt explaining the OCR text of a study photo
pub fn study_photo(extracted_text: &str) -> String {
    format!(
        "Explain the following notes or textbook excerpt to a student.\n\nText to analyze:\n{extracted_text}"
    )
}

pub fn career_advice(query: &str) -> String {
    format!("Career advice: {query}")
}

pub fn campus_information(query: &str) -> String {
    format!("Campus information: {query}")
}

pub fn social_connection(query: &str) -> String {
    format!("Social connection: {query}")
}

pub const INTERVIEW_TIPS: &str = "Provide 5 key interview tips for college students.";
pub const SALARY_NEGOTIATION_TIPS: &str =
    "Provide 5 key salary negotiation tips for new graduates.";
pub const NETWORKING_TIPS: &str = "Provide 5 networking tips for college students.";

pub fn industry_insights(industry: &str) -> String {
    format!("Provide 3 key insights about the current job market in the {industry} industry.")
}

pub fn mock_interview_questions(topic: &str) -> String {
    format!("Generate 3 challenging interview questions for a {topic} position")
}

pub fn interview_feedback(topic: &str, response: &str) -> String {
    format!(
        "Evaluate this interview response for a {topic} position and provide constructive feedback: {response}"
    )
}

/// Details collected by the cover letter generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterDetails {
    pub name: String,
    pub company: String,
    pub position: String,
    pub skills: String,
}

impl CoverLetterDetails {
    /// Parse "name, company, position, skills"; the skills part may itself contain commas
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.splitn(4, ',').map(str::trim);
        let name = parts.next()?;
        let company = parts.next()?;
        let position = parts.next()?;
        let skills = parts.next()?;
        if [name, company, position, skills].iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            company: company.to_string(),
            position: position.to_string(),
            skills: skills.to_string(),
        })
    }
}

pub fn cover_letter(details: &CoverLetterDetails) -> String {
    format!(
        "Write a professional cover letter for {} applying to the {} position at {}. \
         Highlight these skills: {}. Keep it under 350 words.",
        details.name, details.position, details.company, details.skills
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_answer_prompt() {
        let question = QuestionRecord::new("What is recursion?", "5", "CO1", "L1,L2");
        assert_eq!(
            assignment_answer(&question),
            "Provide a concise, accurate, and straightforward answer to this question: What is recursion? (CO: CO1, LO: L1,L2)"
        );
    }

    #[test]
    fn test_cover_letter_details_keep_commas_in_skills() {
        let details =
            CoverLetterDetails::parse("Asha Rao, Acme Corp , Data Analyst, SQL, Python, Tableau")
                .unwrap();
        assert_eq!(details.name, "Asha Rao");
        assert_eq!(details.company, "Acme Corp");
        assert_eq!(details.position, "Data Analyst");
        assert_eq!(details.skills, "SQL, Python, Tableau");
    }

    #[test]
    fn test_cover_letter_details_need_four_fields() {
        assert_eq!(CoverLetterDetails::parse("Asha, Acme, Analyst"), None);
        assert_eq!(CoverLetterDetails::parse("Asha, , Analyst, SQL"), None);
    }
}
