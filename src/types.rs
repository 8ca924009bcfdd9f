use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type BankId = String;
pub type QuestionId = String;
pub type QuestionOptionId = String;
pub type SessionId = String;
pub type SessionQuestionId = String;
pub type ParticipantId = String;
pub type ResponseId = String;
pub type UserId = String;
pub type MapId = String;
pub type WorkspaceId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Draft,
    Scheduled,
    Active,
    Paused,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionQuestionStatus {
    Queued,
    Live,
    Closed,
    Skipped,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Live,
    SelfPaced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Text,
    GeoPoint,
}

/// Reusable collection of questions, independent of any session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub id: BankId,
    pub owner_id: UserId,
    pub workspace_id: Option<WorkspaceId>,
    pub map_id: Option<MapId>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Maintained in the same mutation as question insert/delete, never
    /// recomputed lazily.
    pub total_questions: u32,
    pub is_template: bool,
    pub is_public: bool,
    pub is_active: bool,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub bank_id: BankId,
    pub question_type: QuestionType,
    pub prompt: String,
    pub image_url: Option<String>,
    pub points: u32,
    pub time_limit_seconds: u32,
    /// Answer key for Text questions.
    pub correct_answer_text: Option<String>,
    /// Answer key for GeoPoint questions.
    pub correct_latitude: Option<f64>,
    pub correct_longitude: Option<f64>,
    pub acceptance_radius_meters: Option<f64>,
    pub hint_text: Option<String>,
    pub explanation: Option<String>,
    pub display_order: u32,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: QuestionOptionId,
    pub text: String,
    pub is_correct: bool,
    pub display_order: u32,
}

/// Behavioral flags chosen by the host at session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub allow_late_join: bool,
    pub show_leaderboard: bool,
    pub show_correct_answers: bool,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub enable_hints: bool,
    pub points_for_speed: bool,
    /// 0 = unlimited.
    pub max_participants: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            allow_late_join: true,
            show_leaderboard: true,
            show_correct_answers: true,
            shuffle_questions: false,
            shuffle_options: false,
            enable_hints: true,
            points_for_speed: true,
            max_participants: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub map_id: MapId,
    pub bank_id: BankId,
    pub host_user_id: UserId,
    /// Short human-typeable token, unique among non-archived sessions.
    pub join_code: String,
    pub name: String,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub settings: SessionSettings,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Distinct participant records ever created, incremented on first join.
    pub total_participants: u32,
    pub total_responses: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParticipant {
    pub id: ParticipantId,
    pub session_id: SessionId,
    /// None for guests.
    pub user_id: Option<UserId>,
    pub display_name: String,
    pub is_guest: bool,
    /// Dense 1-based join sequence, used as the final leaderboard tie-break.
    pub join_order: u32,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub total_score: u32,
    pub total_correct: u32,
    pub total_answered: u32,
    /// Incremental mean over graded responses, seconds.
    pub average_response_time: f64,
    pub rank: u32,
    pub device_info: Option<String>,
}

/// The binding of one bank question into one session's queue. The question
/// content is copied at materialization time, so later bank edits never
/// affect a running session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub id: SessionQuestionId,
    pub session_id: SessionId,
    pub question: Question,
    /// Dense, unique 1-based ordering per session.
    pub queue_order: u32,
    pub status: SessionQuestionStatus,
    pub points_override: Option<u32>,
    pub time_limit_override: Option<u32>,
    /// Number of extend_time grants.
    pub time_limit_extensions: u32,
    /// Accumulated extension seconds, part of the effective deadline.
    pub extra_seconds: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_responses: u32,
    pub correct_responses: u32,
    /// Running sum of response times, so stats never rescan responses.
    pub response_time_sum: f64,
}

impl SessionQuestion {
    pub fn effective_points(&self) -> u32 {
        self.points_override.unwrap_or(self.question.points)
    }

    pub fn effective_time_limit(&self) -> u32 {
        self.time_limit_override
            .unwrap_or(self.question.time_limit_seconds)
    }

    /// `started_at + effective_time_limit + Σ extensions`. None unless started.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.started_at.map(|t| {
            t + chrono::Duration::seconds(i64::from(
                self.effective_time_limit() + self.extra_seconds,
            ))
        })
    }
}

/// A participant's answer payload, shaped by question type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Choice { option_ids: Vec<QuestionOptionId> },
    Text { text: String },
    Geo { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: ResponseId,
    pub session_question_id: SessionQuestionId,
    pub participant_id: ParticipantId,
    pub selected_option_ids: Vec<QuestionOptionId>,
    pub response_text: Option<String>,
    pub response_latitude: Option<f64>,
    pub response_longitude: Option<f64>,
    pub is_correct: bool,
    pub points_earned: u32,
    pub response_time_seconds: f64,
    pub used_hint: bool,
    /// Recorded for geo questions regardless of correctness.
    pub distance_error_meters: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// Who is joining a session.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    /// None joins as a guest; guests always get a fresh participant record.
    pub user_id: Option<UserId>,
    pub display_name: String,
    pub device_info: Option<String>,
}

impl Identity {
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            display_name: display_name.into(),
            device_info: None,
        }
    }

    pub fn user(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name: display_name.into(),
            device_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_question() -> Question {
        Question {
            id: ulid::Ulid::new().to_string(),
            bank_id: "b".to_string(),
            question_type: QuestionType::Text,
            prompt: "Capital of France?".to_string(),
            image_url: None,
            points: 100,
            time_limit_seconds: 30,
            correct_answer_text: Some("Paris".to_string()),
            correct_latitude: None,
            correct_longitude: None,
            acceptance_radius_meters: None,
            hint_text: None,
            explanation: None,
            display_order: 1,
            options: Vec::new(),
        }
    }

    #[test]
    fn deadline_includes_overrides_and_extensions() {
        let started = Utc::now();
        let sq = SessionQuestion {
            id: ulid::Ulid::new().to_string(),
            session_id: "s".to_string(),
            question: text_question(),
            queue_order: 1,
            status: SessionQuestionStatus::Live,
            points_override: None,
            time_limit_override: Some(20),
            time_limit_extensions: 2,
            extra_seconds: 15,
            started_at: Some(started),
            ended_at: None,
            total_responses: 0,
            correct_responses: 0,
            response_time_sum: 0.0,
        };

        assert_eq!(sq.effective_time_limit(), 20);
        assert_eq!(sq.deadline(), Some(started + chrono::Duration::seconds(35)));
    }
}
