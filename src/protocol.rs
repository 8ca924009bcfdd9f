//! Events the engine publishes on each session's channel, and the read-model
//! payloads they carry. The engine defines event semantics only; how they are
//! pushed to clients is up to the embedding transport.

use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum EngineEvent {
    SessionStatusChanged {
        session_id: SessionId,
        status: SessionStatus,
        changed_at: DateTime<Utc>,
    },
    ParticipantJoined {
        participant_id: ParticipantId,
        display_name: String,
        is_guest: bool,
        total_participants: u32,
        joined_at: DateTime<Utc>,
    },
    ParticipantLeft {
        participant_id: ParticipantId,
        display_name: String,
        left_at: DateTime<Utc>,
    },
    QuestionActivated {
        question: LiveQuestion,
    },
    QuestionClosed {
        session_question_id: SessionQuestionId,
        skipped: bool,
        total_responses: u32,
        correct_responses: u32,
        closed_at: DateTime<Utc>,
    },
    TimeExtended {
        session_question_id: SessionQuestionId,
        additional_seconds: u32,
        new_deadline: DateTime<Utc>,
    },
    ResponseSubmitted {
        session_question_id: SessionQuestionId,
        participant_id: ParticipantId,
        display_name: String,
        is_correct: bool,
        points_earned: u32,
        response_time_seconds: f64,
        total_responses: u32,
        distance_error_meters: Option<f64>,
        submitted_at: DateTime<Utc>,
    },
    LeaderboardUpdated {
        entries: Vec<LeaderboardEntry>,
        updated_at: DateTime<Utc>,
    },
}

/// Participant-facing view of the question currently accepting responses.
/// Never carries the answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveQuestion {
    pub session_question_id: SessionQuestionId,
    /// 1-based position in the session queue.
    pub question_number: u32,
    pub total_questions: u32,
    pub question_type: QuestionType,
    pub prompt: String,
    pub image_url: Option<String>,
    pub points: u32,
    pub time_limit_seconds: u32,
    pub deadline: DateTime<Utc>,
    /// Present only when the session enables hints.
    pub hint_text: Option<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionView {
    pub id: QuestionOptionId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub total_score: u32,
    pub total_correct: u32,
    pub total_answered: u32,
    pub average_response_time: f64,
}

/// Per-question statistics sourced from the queue entry's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub session_question_id: SessionQuestionId,
    pub status: SessionQuestionStatus,
    pub total_responses: u32,
    pub correct_responses: u32,
    /// Correct share within 0..=1; 0 when nothing was submitted.
    pub correct_rate: f64,
    pub average_response_time: f64,
}

/// What a participant gets back from a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub response_id: ResponseId,
    pub is_correct: bool,
    pub points_earned: u32,
    pub total_score: u32,
    pub rank: u32,
    pub distance_error_meters: Option<f64>,
    /// Included only when the session shows correct answers.
    pub explanation: Option<String>,
}

/// Result of advancing the question queue.
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    /// The next queued question went live.
    Activated(LiveQuestion),
    /// The queue was exhausted and the session completed.
    Completed,
}

/// Host-facing detail of one stored response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDetail {
    pub response_id: ResponseId,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub is_correct: bool,
    pub points_earned: u32,
    pub response_time_seconds: f64,
    pub selected_option_ids: Vec<QuestionOptionId>,
    pub response_text: Option<String>,
    pub response_latitude: Option<f64>,
    pub response_longitude: Option<f64>,
    pub distance_error_meters: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// Geo-question response scatter plus the answer key, for rendering pins on
/// the session map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPins {
    pub session_question_id: SessionQuestionId,
    pub correct_latitude: Option<f64>,
    pub correct_longitude: Option<f64>,
    pub acceptance_radius_meters: Option<f64>,
    pub total_responses: u32,
    pub pins: Vec<MapPin>,
}

/// Normalized text-answer frequencies for one question, for a word-cloud
/// style review view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloud {
    pub session_question_id: SessionQuestionId,
    pub total_responses: u32,
    pub words: Vec<WordCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCount {
    pub text: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPin {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_correct: bool,
    pub distance_error_meters: f64,
    pub points_earned: u32,
}
