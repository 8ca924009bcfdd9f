mod grading;
mod leaderboard;
mod participant;
mod queue;
mod session;

use crate::bank::BankStore;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::EngineEvent;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub use session::NewSession;

/// Capacity of each session's event channel; slow subscribers lag rather
/// than block the engine.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The live session engine.
///
/// Each session is an independent unit of serializability: the registry maps
/// ids to handles, and every mutating operation takes that one session's
/// write lock. Operations on different sessions proceed in parallel.
pub struct SessionEngine {
    pub banks: BankStore,
    pub(crate) config: EngineConfig,
    pub(crate) sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
    /// Join code -> session id, covering non-archived sessions only.
    pub(crate) codes: RwLock<HashMap<String, SessionId>>,
}

pub(crate) struct SessionHandle {
    pub(crate) state: RwLock<SessionState>,
    pub(crate) events: broadcast::Sender<EngineEvent>,
}

/// Everything owned by one session: its record, participants, question
/// queue, and stored responses.
pub(crate) struct SessionState {
    pub(crate) session: Session,
    pub(crate) participants: HashMap<ParticipantId, SessionParticipant>,
    pub(crate) queue: Vec<SessionQuestion>,
    /// Keyed by (session_question, participant); the composite key is the
    /// uniqueness constraint behind the at-most-one-response guarantee.
    pub(crate) responses: HashMap<(SessionQuestionId, ParticipantId), StudentResponse>,
}

impl SessionHandle {
    pub(crate) fn new(session: Session) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(SessionState {
                session,
                participants: HashMap::new(),
                queue: Vec::new(),
                responses: HashMap::new(),
            }),
            events,
        })
    }

    /// Publish an event to this session's subscribers. No receivers is fine.
    pub(crate) fn publish(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

impl SessionState {
    pub(crate) fn live_question(&self) -> Option<&SessionQuestion> {
        self.queue
            .iter()
            .find(|q| q.status == SessionQuestionStatus::Live)
    }

    pub(crate) fn live_question_mut(&mut self) -> Option<&mut SessionQuestion> {
        self.queue
            .iter_mut()
            .find(|q| q.status == SessionQuestionStatus::Live)
    }

    /// Only the host identity recorded at creation may drive transitions.
    pub(crate) fn require_host(&self, user_id: &UserId) -> EngineResult<()> {
        if self.session.host_user_id == *user_id {
            Ok(())
        } else {
            Err(EngineError::NotAuthorized)
        }
    }

    pub(crate) fn active_participant_count(&self) -> u32 {
        self.participants.values().filter(|p| p.is_active).count() as u32
    }
}

impl SessionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            banks: BankStore::new(),
            config,
            sessions: RwLock::new(HashMap::new()),
            codes: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) async fn handle(&self, session_id: &SessionId) -> EngineResult<Arc<SessionHandle>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound)
    }

    /// Subscribe to one session's event stream.
    pub async fn subscribe(
        &self,
        session_id: &SessionId,
    ) -> EngineResult<broadcast::Receiver<EngineEvent>> {
        Ok(self.handle(session_id).await?.events.subscribe())
    }

    pub async fn get_session(&self, session_id: &SessionId) -> EngineResult<Session> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        Ok(state.session.clone())
    }

    pub async fn get_session_by_code(&self, code: &str) -> EngineResult<Session> {
        let session_id = self
            .codes
            .read()
            .await
            .get(&code.to_ascii_uppercase())
            .cloned()
            .ok_or(EngineError::SessionNotFound)?;
        self.get_session(&session_id).await
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
