//! Question Queue Controller: advances a session through its ordered
//! question queue, one live question at a time.

use super::session::finalize_completion;
use super::{SessionEngine, SessionState};
use crate::error::{EngineError, EngineResult};
use crate::protocol::{AdvanceOutcome, EngineEvent, LiveQuestion, OptionView};
use crate::types::*;
use chrono::Utc;

impl SessionEngine {
    /// Close the current live question (if any) and promote the next queued
    /// entry. When the queue is exhausted the session completes instead.
    pub async fn advance_question(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<AdvanceOutcome> {
        self.step_queue(session_id, host_user_id, false).await
    }

    /// Mark the live question Skipped without grading, then advance.
    pub async fn skip_question(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
    ) -> EngineResult<AdvanceOutcome> {
        self.step_queue(session_id, host_user_id, true).await
    }

    async fn step_queue(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
        skip: bool,
    ) -> EngineResult<AdvanceOutcome> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;

        match state.session.status {
            SessionStatus::Active => {}
            SessionStatus::Paused => {
                return Err(EngineError::InvalidState(
                    "cannot advance while the session is paused".to_string(),
                ))
            }
            other => {
                return Err(EngineError::InvalidState(format!(
                    "cannot advance a session in status {:?}",
                    other
                )))
            }
        }

        let mut events = Vec::new();

        if let Some(live) = state.live_question_mut() {
            // Freeze the response window before anything else becomes
            // visible; the aggregate counters were kept incrementally.
            let now = Utc::now();
            live.status = if skip {
                SessionQuestionStatus::Skipped
            } else {
                SessionQuestionStatus::Closed
            };
            live.ended_at = Some(now);
            events.push(EngineEvent::QuestionClosed {
                session_question_id: live.id.clone(),
                skipped: skip,
                total_responses: live.total_responses,
                correct_responses: live.correct_responses,
                closed_at: now,
            });
        } else if skip {
            return Err(EngineError::InvalidState(
                "no live question to skip".to_string(),
            ));
        }

        let outcome = match promote_next(&mut state) {
            Ok(view) => {
                events.push(EngineEvent::QuestionActivated {
                    question: view.clone(),
                });
                AdvanceOutcome::Activated(view)
            }
            Err(EngineError::QueueExhausted) => {
                events.extend(finalize_completion(&mut state)?);
                AdvanceOutcome::Completed
            }
            Err(e) => return Err(e),
        };

        drop(state);
        for event in events {
            handle.publish(event);
        }
        Ok(outcome)
    }

    /// Extend the live question's response window. Permitted only while the
    /// target is live; bounded by the configured maximum per grant.
    pub async fn extend_time(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
        additional_seconds: u32,
    ) -> EngineResult<()> {
        if additional_seconds == 0 || additional_seconds > self.config.max_extension_seconds {
            return Err(EngineError::ValidationFailed(format!(
                "time extension must be between 1 and {} seconds",
                self.config.max_extension_seconds
            )));
        }

        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;
        state.require_host(host_user_id)?;

        let live = state.live_question_mut().ok_or_else(|| {
            EngineError::InvalidState("no live question to extend".to_string())
        })?;
        let started_at = live.started_at.ok_or_else(|| {
            EngineError::InvalidState("live question has no start time".to_string())
        })?;

        live.time_limit_extensions += 1;
        live.extra_seconds += additional_seconds;
        let session_question_id = live.id.clone();
        let new_deadline = started_at
            + chrono::Duration::seconds(i64::from(
                live.effective_time_limit() + live.extra_seconds,
            ));
        drop(state);

        tracing::info!(%session_question_id, additional_seconds, "Extended question time");
        handle.publish(EngineEvent::TimeExtended {
            session_question_id,
            additional_seconds,
            new_deadline,
        });
        Ok(())
    }

    /// Close live questions whose deadline passed, across all active
    /// sessions. Returns how many were closed. Grading never depends on
    /// this; it is a liveness aid driven by the sweeper.
    pub async fn close_expired_questions(&self) -> usize {
        let handles: Vec<_> = self.sessions.read().await.values().cloned().collect();
        let now = Utc::now();
        let mut closed = 0;

        for handle in handles {
            let mut state = handle.state.write().await;
            if state.session.status != SessionStatus::Active {
                continue;
            }
            let Some(live) = state.live_question_mut() else {
                continue;
            };
            let Some(deadline) = live.deadline() else {
                continue;
            };
            if now <= deadline {
                continue;
            }

            live.status = SessionQuestionStatus::Closed;
            live.ended_at = Some(now);
            let event = EngineEvent::QuestionClosed {
                session_question_id: live.id.clone(),
                skipped: false,
                total_responses: live.total_responses,
                correct_responses: live.correct_responses,
                closed_at: now,
            };
            tracing::info!(session_id = %state.session.id, "Closed expired live question");
            drop(state);
            handle.publish(event);
            closed += 1;
        }
        closed
    }
}

/// Promote the lowest-ordered Queued entry to Live. The single-live
/// invariant is checked before every promotion.
fn promote_next(state: &mut SessionState) -> EngineResult<LiveQuestion> {
    if state.live_question().is_some() {
        return Err(EngineError::InvalidState(
            "another question is already live".to_string(),
        ));
    }

    let total_questions = state.queue.len() as u32;
    let shuffle_options = state.session.settings.shuffle_options;
    let hints_enabled = state.session.settings.enable_hints;

    let next = state
        .queue
        .iter_mut()
        .filter(|q| q.status == SessionQuestionStatus::Queued)
        .min_by_key(|q| q.queue_order)
        .ok_or(EngineError::QueueExhausted)?;

    let started = Utc::now();
    next.status = SessionQuestionStatus::Live;
    next.started_at = Some(started);

    let mut options: Vec<OptionView> = next
        .question
        .options
        .iter()
        .map(|o| OptionView {
            id: o.id.clone(),
            text: o.text.clone(),
        })
        .collect();
    if shuffle_options {
        use rand::seq::SliceRandom;
        options.shuffle(&mut rand::rng());
    }

    Ok(LiveQuestion {
        session_question_id: next.id.clone(),
        question_number: next.queue_order,
        total_questions,
        question_type: next.question.question_type,
        prompt: next.question.prompt.clone(),
        image_url: next.question.image_url.clone(),
        points: next.effective_points(),
        time_limit_seconds: next.effective_time_limit(),
        deadline: started + chrono::Duration::seconds(i64::from(next.effective_time_limit())),
        hint_text: if hints_enabled {
            next.question.hint_text.clone()
        } else {
            None
        },
        options,
    })
}
