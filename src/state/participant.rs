//! Participant lifecycle: joining by code, leaving, and reconnecting
//! within the grace window.

use super::SessionEngine;
use crate::error::{EngineError, EngineResult};
use crate::protocol::EngineEvent;
use crate::types::*;
use chrono::Utc;
use ulid::Ulid;

impl SessionEngine {
    /// Join a session by its short code.
    ///
    /// Scheduled sessions are always joinable; Active sessions only when
    /// late join is allowed. A registered user who already has a record in
    /// the session is reactivated instead of duplicated, so rejoin is
    /// idempotent. Guests always get a fresh record.
    pub async fn join_session(
        &self,
        join_code: &str,
        identity: Identity,
    ) -> EngineResult<SessionParticipant> {
        let session_id = self
            .codes
            .read()
            .await
            .get(&join_code.to_ascii_uppercase())
            .cloned()
            .ok_or(EngineError::SessionNotFound)?;
        let handle = self.handle(&session_id).await?;
        let mut state = handle.state.write().await;

        match state.session.status {
            SessionStatus::Scheduled => {}
            SessionStatus::Active if state.session.settings.allow_late_join => {}
            SessionStatus::Active => return Err(EngineError::SessionNotJoinable),
            _ => return Err(EngineError::SessionNotJoinable),
        }

        // Rejoin path for registered users, before the capacity check: a
        // returning participant does not consume a new seat.
        if let Some(user_id) = &identity.user_id {
            let existing = state
                .participants
                .values_mut()
                .find(|p| p.user_id.as_deref() == Some(user_id.as_str()));
            if let Some(participant) = existing {
                participant.is_active = true;
                participant.left_at = None;
                participant.display_name = identity.display_name;
                if identity.device_info.is_some() {
                    participant.device_info = identity.device_info;
                }
                let participant = participant.clone();
                let total_participants = state.session.total_participants;
                drop(state);

                tracing::info!(%session_id, participant_id = %participant.id, "Participant rejoined");
                handle.publish(EngineEvent::ParticipantJoined {
                    participant_id: participant.id.clone(),
                    display_name: participant.display_name.clone(),
                    is_guest: false,
                    total_participants,
                    joined_at: participant.joined_at,
                });
                return Ok(participant);
            }
        }

        let cap = state.session.settings.max_participants;
        if cap > 0 && state.active_participant_count() >= cap {
            return Err(EngineError::SessionFull);
        }

        state.session.total_participants += 1;
        let participant = SessionParticipant {
            id: Ulid::new().to_string(),
            session_id: session_id.clone(),
            user_id: identity.user_id.clone(),
            display_name: identity.display_name,
            is_guest: identity.user_id.is_none(),
            join_order: state.session.total_participants,
            joined_at: Utc::now(),
            left_at: None,
            is_active: true,
            total_score: 0,
            total_correct: 0,
            total_answered: 0,
            average_response_time: 0.0,
            rank: 0,
            device_info: identity.device_info,
        };
        state
            .participants
            .insert(participant.id.clone(), participant.clone());
        let total_participants = state.session.total_participants;
        drop(state);

        tracing::info!(%session_id, participant_id = %participant.id, "Participant joined");
        handle.publish(EngineEvent::ParticipantJoined {
            participant_id: participant.id.clone(),
            display_name: participant.display_name.clone(),
            is_guest: participant.is_guest,
            total_participants,
            joined_at: participant.joined_at,
        });
        Ok(participant)
    }

    /// Mark a participant as having left. Score and history stay intact.
    pub async fn leave_session(
        &self,
        session_id: &SessionId,
        participant_id: &ParticipantId,
    ) -> EngineResult<()> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;

        let participant = state
            .participants
            .get_mut(participant_id)
            .ok_or(EngineError::ParticipantNotFound)?;
        if !participant.is_active {
            return Ok(());
        }

        let now = Utc::now();
        participant.is_active = false;
        participant.left_at = Some(now);
        let display_name = participant.display_name.clone();
        drop(state);

        tracing::info!(%session_id, %participant_id, "Participant left");
        handle.publish(EngineEvent::ParticipantLeft {
            participant_id: participant_id.clone(),
            display_name,
            left_at: now,
        });
        Ok(())
    }

    /// Reactivate a participant who dropped their connection, as long as
    /// the grace window has not elapsed since they left.
    pub async fn reconnect(
        &self,
        session_id: &SessionId,
        participant_id: &ParticipantId,
    ) -> EngineResult<SessionParticipant> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;

        if state.session.status != SessionStatus::Active
            && state.session.status != SessionStatus::Paused
        {
            return Err(EngineError::InvalidState(
                "session is no longer running".to_string(),
            ));
        }

        let grace = i64::from(self.config.reconnect_grace_seconds);
        let participant = state
            .participants
            .get_mut(participant_id)
            .ok_or(EngineError::ParticipantNotFound)?;

        if !participant.is_active {
            let left_at = participant.left_at.ok_or_else(|| {
                EngineError::InvalidState("participant has no departure time".to_string())
            })?;
            if (Utc::now() - left_at).num_seconds() > grace {
                return Err(EngineError::InvalidState(
                    "reconnect window has expired".to_string(),
                ));
            }
            participant.is_active = true;
            participant.left_at = None;
        }

        let participant = participant.clone();
        let total_participants = state.session.total_participants;
        drop(state);

        tracing::info!(%session_id, %participant_id, "Participant reconnected");
        handle.publish(EngineEvent::ParticipantJoined {
            participant_id: participant.id.clone(),
            display_name: participant.display_name.clone(),
            is_guest: participant.is_guest,
            total_participants,
            joined_at: participant.joined_at,
        });
        Ok(participant)
    }

    /// Roster snapshot, active participants first then by join order.
    pub async fn get_participants(
        &self,
        session_id: &SessionId,
    ) -> EngineResult<Vec<SessionParticipant>> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        let mut roster: Vec<_> = state.participants.values().cloned().collect();
        roster.sort_by_key(|p| (!p.is_active, p.join_order));
        Ok(roster)
    }
}
