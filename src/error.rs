use crate::types::{SessionQuestionStatus, SessionStatus};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by engine operations. State-mutating failures leave prior
/// state unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("session not found")]
    SessionNotFound,

    #[error("question bank not found")]
    BankNotFound,

    #[error("question not found")]
    QuestionNotFound,

    #[error("participant not found")]
    ParticipantNotFound,

    #[error("only the session host may perform this action")]
    NotAuthorized,

    #[error("transition from {from:?} to {to:?} is not legal")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("operation not legal in current state: {0}")]
    InvalidState(String),

    #[error("session has reached its participant limit")]
    SessionFull,

    #[error("session is not accepting participants")]
    SessionNotJoinable,

    #[error("session is paused")]
    SessionPaused,

    #[error("no queued questions remain")]
    QueueExhausted,

    #[error("question is not live (status: {0:?})")]
    NotLive(SessionQuestionStatus),

    #[error("a response for this question was already submitted")]
    DuplicateResponse,

    #[error("submission arrived after the question deadline")]
    DeadlineExceeded,

    #[error("invalid payload: {0}")]
    ValidationFailed(String),
}
