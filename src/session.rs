//! Per-chat conversation state kept in the teloxide dialogue storage.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// What the bot expects next from a chat
///
/// Every state except `Idle` records when it was opened so stale sessions
/// can be dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingAssignment {
        opened_at: DateTime<Utc>,
    },
    DocumentChat {
        document_text: String,
        opened_at: DateTime<Utc>,
    },
    AwaitingCoverLetterDetails {
        opened_at: DateTime<Utc>,
    },
    AwaitingInterviewAnswer {
        topic: String,
        opened_at: DateTime<Utc>,
    },
}

pub type SessionDialogue = Dialogue<SessionState, InMemStorage<SessionState>>;

impl SessionState {
    pub fn awaiting_assignment() -> Self {
        SessionState::AwaitingAssignment {
            opened_at: Utc::now(),
        }
    }

    pub fn document_chat(document_text: impl Into<String>) -> Self {
        SessionState::DocumentChat {
            document_text: document_text.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn awaiting_cover_letter() -> Self {
        SessionState::AwaitingCoverLetterDetails {
            opened_at: Utc::now(),
        }
    }

    pub fn awaiting_interview_answer(topic: impl Into<String>) -> Self {
        SessionState::AwaitingInterviewAnswer {
            topic: topic.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingAssignment { opened_at }
            | SessionState::DocumentChat { opened_at, .. }
            | SessionState::AwaitingCoverLetterDetails { opened_at }
            | SessionState::AwaitingInterviewAnswer { opened_at, .. } => Some(*opened_at),
        }
    }

    /// `Idle` never expires
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.opened_at()
            .is_some_and(|opened_at| now.signed_duration_since(opened_at) > ttl)
    }

    /// The state itself, or `Idle` once it has outlived `ttl`
    pub fn refreshed(self, now: DateTime<Utc>, ttl: Duration) -> Self {
        if self.is_expired(now, ttl) {
            SessionState::Idle
        } else {
            self
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingAssignment { .. } => "awaiting_assignment",
            SessionState::DocumentChat { .. } => "document_chat",
            SessionState::AwaitingCoverLetterDetails { .. } => "awaiting_cover_letter_details",
            SessionState::AwaitingInterviewAnswer { .. } => "awaiting_interview_answer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_never_expires() {
        let far_future = Utc::now() + Duration::days(365);
        assert!(!SessionState::Idle.is_expired(far_future, Duration::minutes(1)));
    }

    #[test]
    fn test_expiry_after_ttl() {
        let state = SessionState::awaiting_assignment();
        let opened_at = state.opened_at().unwrap();
        let ttl = Duration::minutes(30);

        assert!(!state.is_expired(opened_at + Duration::minutes(29), ttl));
        assert!(state.is_expired(opened_at + Duration::minutes(31), ttl));
        assert_eq!(
            state.refreshed(opened_at + Duration::minutes(31), ttl),
            SessionState::Idle
        );
    }

    #[test]
    fn test_refresh_keeps_live_state() {
        let state = SessionState::awaiting_interview_answer("Data Analyst");
        let now = state.opened_at().unwrap() + Duration::minutes(1);
        assert_eq!(state.clone().refreshed(now, Duration::minutes(30)), state);
    }
}
