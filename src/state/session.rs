//! Session Lifecycle Orchestrator: the state machine over
//! `SessionStatus` and the host-driven entry points that move it.

use super::{SessionEngine, SessionHandle, SessionState};
use crate::error::{EngineError, EngineResult};
use crate::protocol::EngineEvent;
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Safe character set for join codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

fn generate_join_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub map_id: MapId,
    pub bank_id: BankId,
    pub host_user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub settings: SessionSettings,
    pub scheduled_start_time: Option<DateTime<Utc>>,
}

impl NewSession {
    pub fn live(
        map_id: impl Into<MapId>,
        bank_id: impl Into<BankId>,
        host_user_id: impl Into<UserId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            map_id: map_id.into(),
            bank_id: bank_id.into(),
            host_user_id: host_user_id.into(),
            name: name.into(),
            description: None,
            session_type: SessionType::Live,
            settings: SessionSettings::default(),
            scheduled_start_time: None,
        }
    }
}

/// The single point of enforcement for status transitions.
fn is_valid_transition(from: SessionStatus, to: SessionStatus) -> bool {
    use SessionStatus::*;

    matches!(
        (from, to),
        (Draft, Scheduled)
            | (Draft, Active)
            | (Scheduled, Active)
            | (Active, Paused)
            | (Paused, Active)
            | (Active, Completed)
            | (Paused, Completed)
            | (Completed, Archived)
    )
}

impl SessionState {
    pub(crate) fn transition(&mut self, to: SessionStatus) -> EngineResult<()> {
        let from = self.session.status;
        if !is_valid_transition(from, to) {
            return Err(EngineError::InvalidTransition { from, to });
        }
        self.session.status = to;
        tracing::info!(session_id = %self.session.id, ?from, ?to, "Session transitioned");
        Ok(())
    }
}

impl SessionEngine {
    /// Create a session bound to a map and question bank. The join code is
    /// generated here and registered until the session is archived.
    pub async fn create_session(&self, new: NewSession) -> EngineResult<Session> {
        // Bank must exist and be active before a session can bind it
        let bank = self.banks.get_bank(&new.bank_id).await?;
        if !bank.is_active {
            return Err(EngineError::BankNotFound);
        }

        let mut codes = self.codes.write().await;
        let join_code = loop {
            let code = generate_join_code(self.config.join_code_length);
            if !codes.contains_key(&code) {
                break code;
            }
            // Collision, retry with a fresh code
        };

        let session = Session {
            id: ulid::Ulid::new().to_string(),
            map_id: new.map_id,
            bank_id: new.bank_id,
            host_user_id: new.host_user_id,
            join_code: join_code.clone(),
            name: new.name,
            description: new.description,
            session_type: new.session_type,
            status: SessionStatus::Draft,
            settings: new.settings,
            scheduled_start_time: new.scheduled_start_time,
            actual_start_time: None,
            end_time: None,
            total_participants: 0,
            total_responses: 0,
            created_at: Utc::now(),
        };

        codes.insert(join_code, session.id.clone());
        drop(codes);

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), SessionHandle::new(session.clone()));

        tracing::info!(session_id = %session.id, code = %session.join_code, "Created session");
        Ok(session)
    }

    /// Every session hosted by the given user, newest first. Archived
    /// sessions stay listed; they remain readable for analytics.
    pub async fn list_sessions(&self, host_user_id: &UserId) -> Vec<Session> {
        let handles: Vec<_> = self.sessions.read().await.values().cloned().collect();
        let mut sessions = Vec::new();
        for handle in handles {
            let state = handle.state.read().await;
            if state.session.host_user_id == *host_user_id {
                sessions.push(state.session.clone());
            }
        }
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    /// `Draft -> Scheduled`; requires a future start time.
    pub async fn schedule_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
        start_time: DateTime<Utc>,
    ) -> EngineResult<Session> {
        if start_time <= Utc::now() {
            return Err(EngineError::ValidationFailed(
                "scheduled start time must be in the future".to_string(),
            ));
        }

        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;
        state.transition(SessionStatus::Scheduled)?;
        state.session.scheduled_start_time = Some(start_time);

        let session = state.session.clone();
        drop(state);

        handle.publish(EngineEvent::SessionStatusChanged {
            session_id: session.id.clone(),
            status: session.status,
            changed_at: Utc::now(),
        });
        Ok(session)
    }

    /// `Draft|Scheduled -> Active`. Materializes the question queue from the
    /// bound bank, honoring shuffle-questions, and stamps the actual start.
    pub async fn start_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<Session> {
        let handle = self.handle(session_id).await?;

        // Snapshot outside the session lock; the bank store has its own
        let bank_id = {
            let state = handle.state.read().await;
            state.require_host(host_user_id)?;
            state.session.bank_id.clone()
        };
        let mut questions = self.banks.snapshot_questions(&bank_id).await?;

        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;
        if questions.is_empty() {
            return Err(EngineError::InvalidState(
                "cannot start a session whose question bank is empty".to_string(),
            ));
        }
        state.transition(SessionStatus::Active)?;

        if state.session.settings.shuffle_questions {
            use rand::seq::SliceRandom;
            questions.shuffle(&mut rand::rng());
        }

        state.queue = questions
            .into_iter()
            .enumerate()
            .map(|(i, question)| SessionQuestion {
                id: ulid::Ulid::new().to_string(),
                session_id: state.session.id.clone(),
                question,
                queue_order: i as u32 + 1,
                status: SessionQuestionStatus::Queued,
                points_override: None,
                time_limit_override: None,
                time_limit_extensions: 0,
                extra_seconds: 0,
                started_at: None,
                ended_at: None,
                total_responses: 0,
                correct_responses: 0,
                response_time_sum: 0.0,
            })
            .collect();

        state.session.actual_start_time = Some(Utc::now());
        let session = state.session.clone();
        drop(state);

        handle.publish(EngineEvent::SessionStatusChanged {
            session_id: session.id.clone(),
            status: session.status,
            changed_at: Utc::now(),
        });
        Ok(session)
    }

    /// `Active -> Paused`. While paused no question advances and no
    /// responses are accepted.
    pub async fn pause_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<Session> {
        self.set_status(session_id, host_user_id, SessionStatus::Paused)
            .await
    }

    /// `Paused -> Active`.
    pub async fn resume_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<Session> {
        self.set_status(session_id, host_user_id, SessionStatus::Active)
            .await
    }

    async fn set_status(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
        to: SessionStatus,
    ) -> EngineResult<Session> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;
        state.transition(to)?;
        let session = state.session.clone();
        drop(state);

        handle.publish(EngineEvent::SessionStatusChanged {
            session_id: session.id.clone(),
            status: session.status,
            changed_at: Utc::now(),
        });
        Ok(session)
    }

    /// Host ends the session early (or the queue ran out). `Active|Paused ->
    /// Completed`; the session becomes read-only afterwards.
    pub async fn end_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<Session> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;

        let events = finalize_completion(&mut state)?;
        let session = state.session.clone();
        drop(state);

        for event in events {
            handle.publish(event);
        }
        Ok(session)
    }

    /// `Completed -> Archived`; terminal. Frees the join code for reuse
    /// while keeping the session readable for analytics.
    pub async fn archive_session(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<Session> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;
        state.transition(SessionStatus::Archived)?;
        let session = state.session.clone();
        drop(state);

        self.codes.write().await.remove(&session.join_code);

        handle.publish(EngineEvent::SessionStatusChanged {
            session_id: session.id.clone(),
            status: session.status,
            changed_at: Utc::now(),
        });
        Ok(session)
    }
}

/// Complete a session: close any live question, stamp the end time, mark
/// remaining participants as left, and freeze final ranks. Returns the
/// events to publish once the lock is released.
pub(crate) fn finalize_completion(state: &mut SessionState) -> EngineResult<Vec<EngineEvent>> {
    state.transition(SessionStatus::Completed)?;

    let now = Utc::now();
    let mut events = Vec::new();

    if let Some(live) = state.live_question_mut() {
        live.status = SessionQuestionStatus::Closed;
        live.ended_at = Some(now);
        events.push(EngineEvent::QuestionClosed {
            session_question_id: live.id.clone(),
            skipped: false,
            total_responses: live.total_responses,
            correct_responses: live.correct_responses,
            closed_at: now,
        });
    }

    for participant in state.participants.values_mut() {
        if participant.is_active {
            participant.is_active = false;
            participant.left_at = Some(now);
        }
    }

    state.session.end_time = Some(now);
    super::leaderboard::assign_ranks(&mut state.participants);

    events.push(EngineEvent::SessionStatusChanged {
        session_id: state.session.id.clone(),
        status: state.session.status,
        changed_at: now,
    });
    events.push(EngineEvent::LeaderboardUpdated {
        entries: super::leaderboard::leaderboard_entries(&state.participants, None),
        updated_at: now,
    });
    Ok(events)
}
