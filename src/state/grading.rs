//! Response intake and grading. A submission is validated, graded, scored,
//! and folded into the running aggregates under one session write lock, so
//! every caller sees totals that include their own response.

use super::{leaderboard, SessionEngine};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{EngineEvent, SubmitOutcome};
use crate::types::*;
use chrono::Utc;
use ulid::Ulid;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

impl SessionEngine {
    /// Submit a participant's answer to the identified question.
    ///
    /// At most one response per participant per question is accepted. A
    /// submission after the deadline is stored as a zero-point incorrect
    /// response and reported as [`EngineError::DeadlineExceeded`], unless
    /// the engine is configured to reject late traffic outright.
    pub async fn submit_response(
        &self,
        session_id: &SessionId,
        session_question_id: &SessionQuestionId,
        participant_id: &ParticipantId,
        answer: Answer,
        used_hint: bool,
    ) -> EngineResult<SubmitOutcome> {
        let handle = self.handle(session_id).await?;
        let mut state = handle.state.write().await;

        match state.session.status {
            SessionStatus::Active => {}
            SessionStatus::Paused => return Err(EngineError::SessionPaused),
            _ => {
                // Over or never started; report the question's own status so
                // callers can tell "too late" from "wrong session"
                let status = state
                    .queue
                    .iter()
                    .find(|q| q.id == *session_question_id)
                    .map(|q| q.status)
                    .ok_or(EngineError::QuestionNotFound)?;
                return Err(EngineError::NotLive(status));
            }
        }
        if used_hint && !state.session.settings.enable_hints {
            return Err(EngineError::ValidationFailed(
                "hints are disabled for this session".to_string(),
            ));
        }

        let participant = state
            .participants
            .get(participant_id)
            .ok_or(EngineError::ParticipantNotFound)?;
        if !participant.is_active {
            return Err(EngineError::InvalidState(
                "participant is not active in this session".to_string(),
            ));
        }
        let display_name = participant.display_name.clone();

        let question = state
            .queue
            .iter()
            .find(|q| q.id == *session_question_id)
            .ok_or(EngineError::QuestionNotFound)?;
        if question.status != SessionQuestionStatus::Live {
            return Err(EngineError::NotLive(question.status));
        }

        let key = (session_question_id.clone(), participant_id.clone());
        if state.responses.contains_key(&key) {
            return Err(EngineError::DuplicateResponse);
        }

        let now = Utc::now();
        let started_at = question.started_at.ok_or_else(|| {
            EngineError::InvalidState("live question has no start time".to_string())
        })?;
        let deadline = started_at
            + chrono::Duration::seconds(i64::from(
                question.effective_time_limit() + question.extra_seconds,
            ));
        let response_time = ((now - started_at).num_milliseconds() as f64 / 1000.0).max(0.0);

        if now > deadline {
            if self.config.reject_late_responses {
                return Err(EngineError::DeadlineExceeded);
            }
            // Distance error is recorded for geo answers even when no
            // points can be earned
            let late_distance = match &answer {
                Answer::Geo {
                    latitude,
                    longitude,
                } => question
                    .question
                    .correct_latitude
                    .zip(question.question.correct_longitude)
                    .map(|(lat, lon)| haversine_meters(*latitude, *longitude, lat, lon)),
                _ => None,
            };
            let late = StudentResponse {
                id: Ulid::new().to_string(),
                session_question_id: session_question_id.clone(),
                participant_id: participant_id.clone(),
                selected_option_ids: answer_option_ids(&answer),
                response_text: answer_text(&answer),
                response_latitude: answer_latitude(&answer),
                response_longitude: answer_longitude(&answer),
                is_correct: false,
                points_earned: 0,
                response_time_seconds: response_time,
                used_hint,
                distance_error_meters: late_distance,
                submitted_at: now,
            };
            state.responses.insert(key, late);
            let q = state
                .queue
                .iter_mut()
                .find(|q| q.id == *session_question_id)
                .ok_or(EngineError::QuestionNotFound)?;
            q.total_responses += 1;
            q.response_time_sum += response_time;
            state.session.total_responses += 1;
            tracing::debug!(%session_question_id, %participant_id, "Late response recorded");
            return Err(EngineError::DeadlineExceeded);
        }

        let (is_correct, distance) = grade(&question.question, &self.config, &answer)?;
        let points_earned = if is_correct {
            award_points(
                question.effective_points(),
                response_time,
                f64::from(question.effective_time_limit() + question.extra_seconds),
                state.session.settings.points_for_speed,
                used_hint,
                &self.config,
            )
        } else {
            0
        };

        let response = StudentResponse {
            id: Ulid::new().to_string(),
            session_question_id: session_question_id.clone(),
            participant_id: participant_id.clone(),
            selected_option_ids: answer_option_ids(&answer),
            response_text: answer_text(&answer),
            response_latitude: answer_latitude(&answer),
            response_longitude: answer_longitude(&answer),
            is_correct,
            points_earned,
            response_time_seconds: response_time,
            used_hint,
            distance_error_meters: distance,
            submitted_at: now,
        };
        let response_id = response.id.clone();
        state.responses.insert(key, response);

        let q = state
            .queue
            .iter_mut()
            .find(|q| q.id == *session_question_id)
            .ok_or(EngineError::QuestionNotFound)?;
        q.total_responses += 1;
        if is_correct {
            q.correct_responses += 1;
        }
        q.response_time_sum += response_time;
        let question_total_responses = q.total_responses;
        state.session.total_responses += 1;

        let participant = state
            .participants
            .get_mut(participant_id)
            .ok_or(EngineError::ParticipantNotFound)?;
        participant.total_answered += 1;
        participant.average_response_time += (response_time - participant.average_response_time)
            / f64::from(participant.total_answered);
        if is_correct {
            participant.total_correct += 1;
            participant.total_score += points_earned;
        }

        leaderboard::assign_ranks(&mut state.participants);
        let participant = &state.participants[participant_id];
        let outcome = SubmitOutcome {
            response_id,
            is_correct,
            points_earned,
            total_score: participant.total_score,
            rank: participant.rank,
            distance_error_meters: distance,
            explanation: if state.session.settings.show_correct_answers {
                state
                    .queue
                    .iter()
                    .find(|q| q.id == *session_question_id)
                    .and_then(|q| q.question.explanation.clone())
            } else {
                None
            },
        };

        let mut events = vec![EngineEvent::ResponseSubmitted {
            session_question_id: session_question_id.clone(),
            participant_id: participant_id.clone(),
            display_name,
            is_correct,
            points_earned,
            response_time_seconds: response_time,
            total_responses: question_total_responses,
            distance_error_meters: distance,
            submitted_at: now,
        }];
        if state.session.settings.show_leaderboard {
            events.push(EngineEvent::LeaderboardUpdated {
                entries: leaderboard::leaderboard_entries(&state.participants, None),
                updated_at: now,
            });
        }
        drop(state);

        for event in events {
            handle.publish(event);
        }
        Ok(outcome)
    }
}

/// Grade an answer against the question's key. Returns correctness plus the
/// geo distance error when applicable.
fn grade(
    question: &Question,
    config: &EngineConfig,
    answer: &Answer,
) -> EngineResult<(bool, Option<f64>)> {
    match (question.question_type, answer) {
        (QuestionType::SingleChoice, Answer::Choice { option_ids }) => {
            let [option_id] = option_ids.as_slice() else {
                return Err(EngineError::ValidationFailed(
                    "single choice requires exactly one option".to_string(),
                ));
            };
            let option = question
                .options
                .iter()
                .find(|o| o.id == *option_id)
                .ok_or_else(|| {
                    EngineError::ValidationFailed("unknown option id".to_string())
                })?;
            Ok((option.is_correct, None))
        }
        (QuestionType::MultiChoice, Answer::Choice { option_ids }) => {
            if option_ids.is_empty() {
                return Err(EngineError::ValidationFailed(
                    "multi choice requires at least one option".to_string(),
                ));
            }
            let mut selected = option_ids.clone();
            selected.sort();
            selected.dedup();
            for id in &selected {
                if !question.options.iter().any(|o| o.id == *id) {
                    return Err(EngineError::ValidationFailed(
                        "unknown option id".to_string(),
                    ));
                }
            }
            let mut correct: Vec<_> = question
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id.clone())
                .collect();
            correct.sort();
            Ok((selected == correct, None))
        }
        (QuestionType::Text, Answer::Text { text }) => {
            let key = question.correct_answer_text.as_deref().ok_or_else(|| {
                EngineError::InvalidState("text question has no answer key".to_string())
            })?;
            Ok((text.trim().eq_ignore_ascii_case(key.trim()), None))
        }
        (QuestionType::GeoPoint, Answer::Geo { latitude, longitude }) => {
            let (target_lat, target_lon) = question
                .correct_latitude
                .zip(question.correct_longitude)
                .ok_or_else(|| {
                    EngineError::InvalidState("geo question has no target point".to_string())
                })?;
            let radius = question
                .acceptance_radius_meters
                .unwrap_or(config.default_acceptance_radius_meters);
            let distance = haversine_meters(*latitude, *longitude, target_lat, target_lon);
            Ok((distance <= radius, Some(distance)))
        }
        _ => Err(EngineError::ValidationFailed(
            "answer payload does not match the question type".to_string(),
        )),
    }
}

/// Base points scaled by the speed multiplier and the hint discount.
///
/// The multiplier decays linearly from 1.0 at the instant the question goes
/// live down to the configured floor at the deadline.
fn award_points(
    base: u32,
    response_time: f64,
    window: f64,
    points_for_speed: bool,
    used_hint: bool,
    config: &EngineConfig,
) -> u32 {
    let mut points = f64::from(base);
    if points_for_speed && window > 0.0 {
        let progress = (response_time / window).clamp(0.0, 1.0);
        points *= 1.0 - (1.0 - config.speed_floor) * progress;
    }
    if used_hint {
        points *= config.hint_discount;
    }
    points.round() as u32
}

/// Great-circle distance between two points, in meters.
pub(crate) fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}

fn answer_option_ids(answer: &Answer) -> Vec<QuestionOptionId> {
    match answer {
        Answer::Choice { option_ids } => option_ids.clone(),
        _ => Vec::new(),
    }
}

fn answer_text(answer: &Answer) -> Option<String> {
    match answer {
        Answer::Text { text } => Some(text.clone()),
        _ => None,
    }
}

fn answer_latitude(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Geo { latitude, .. } => Some(*latitude),
        _ => None,
    }
}

fn answer_longitude(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Geo { longitude, .. } => Some(*longitude),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{NewBank, NewOption, NewQuestion};
    use crate::protocol::AdvanceOutcome;
    use crate::state::testutil::{backdate_live_question, engine_with_bank};
    use crate::state::NewSession;

    /// Session with one live question, one joined guest, speed bonus off so
    /// point assertions are exact.
    async fn live_single_choice() -> (SessionEngine, SessionId, UserId, SessionParticipant, String)
    {
        let (engine, bank_id, host) = engine_with_bank().await;
        let mut new = NewSession::live("map", bank_id, host.clone(), "Quiz");
        new.settings.points_for_speed = false;
        let session = engine.create_session(new).await.unwrap();
        engine.start_session(&session.id, &host).await.unwrap();
        let guest = engine
            .join_session(&session.join_code, Identity::guest("Ada"))
            .await
            .unwrap();
        let AdvanceOutcome::Activated(q) =
            engine.advance_question(&session.id, &host).await.unwrap()
        else {
            panic!("expected a live question");
        };
        (engine, session.id, host, guest, q.session_question_id)
    }

    fn correct_option(q: &crate::protocol::LiveQuestion) -> QuestionOptionId {
        // Test banks always list the correct option first with text "Right".
        q.options
            .iter()
            .find(|o| o.text == "Right")
            .map(|o| o.id.clone())
            .unwrap()
    }

    async fn live_view(engine: &SessionEngine, session_id: &SessionId) -> SessionQuestion {
        let handle = engine.handle(session_id).await.unwrap();
        let state = handle.state.read().await;
        state.live_question().unwrap().clone()
    }

    #[tokio::test]
    async fn correct_answer_scores_full_points_without_speed_bonus() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;
        let live = live_view(&engine, &session_id).await;
        let right = live
            .question
            .options
            .iter()
            .find(|o| o.is_correct)
            .unwrap()
            .id
            .clone();

        let outcome = engine
            .submit_response(
                &session_id,
                &sq_id,
                &guest.id,
                Answer::Choice {
                    option_ids: vec![right],
                },
                false,
            )
            .await
            .unwrap();

        assert!(outcome.is_correct);
        assert_eq!(outcome.points_earned, 100);
        assert_eq!(outcome.total_score, 100);
        assert_eq!(outcome.rank, 1);
    }

    #[tokio::test]
    async fn wrong_answer_scores_zero_but_counts() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;
        let live = live_view(&engine, &session_id).await;
        let wrong = live
            .question
            .options
            .iter()
            .find(|o| !o.is_correct)
            .unwrap()
            .id
            .clone();

        let outcome = engine
            .submit_response(
                &session_id,
                &sq_id,
                &guest.id,
                Answer::Choice {
                    option_ids: vec![wrong],
                },
                false,
            )
            .await
            .unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.points_earned, 0);

        let live = live_view(&engine, &session_id).await;
        assert_eq!(live.total_responses, 1);
        assert_eq!(live.correct_responses, 0);
    }

    #[tokio::test]
    async fn second_submission_is_rejected() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;
        let live = live_view(&engine, &session_id).await;
        let right = live.question.options[0].id.clone();
        let answer = Answer::Choice {
            option_ids: vec![right],
        };

        engine
            .submit_response(&session_id, &sq_id, &guest.id, answer.clone(), false)
            .await
            .unwrap();
        assert_eq!(
            engine
                .submit_response(&session_id, &sq_id, &guest.id, answer, false)
                .await
                .unwrap_err(),
            EngineError::DuplicateResponse
        );

        let live = live_view(&engine, &session_id).await;
        assert_eq!(live.total_responses, 1);
    }

    #[tokio::test]
    async fn late_submission_is_stored_with_zero_points() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;
        backdate_live_question(&engine, &session_id, 3600).await;
        let live = live_view(&engine, &session_id).await;
        let right = live.question.options[0].id.clone();

        assert_eq!(
            engine
                .submit_response(
                    &session_id,
                    &sq_id,
                    &guest.id,
                    Answer::Choice {
                        option_ids: vec![right],
                    },
                    false,
                )
                .await
                .unwrap_err(),
            EngineError::DeadlineExceeded
        );

        let handle = engine.handle(&session_id).await.unwrap();
        let state = handle.state.read().await;
        let stored = &state.responses[&(sq_id.clone(), guest.id.clone())];
        assert!(!stored.is_correct);
        assert_eq!(stored.points_earned, 0);
    }

    #[tokio::test]
    async fn late_geo_submission_still_records_distance() {
        let engine = SessionEngine::default();
        let host = "host".to_string();
        let bank = engine
            .banks
            .create_bank(NewBank {
                owner_id: host.clone(),
                name: "Places".to_string(),
                ..Default::default()
            })
            .await;
        let mut q = NewQuestion::of_type(QuestionType::GeoPoint, "Mark Munich");
        q.correct_latitude = Some(48.137);
        q.correct_longitude = Some(11.575);
        engine.banks.add_question(&bank.id, &host, q).await.unwrap();

        let session = engine
            .create_session(NewSession::live("map", bank.id, host.clone(), "Late"))
            .await
            .unwrap();
        engine.start_session(&session.id, &host).await.unwrap();
        let guest = engine
            .join_session(&session.join_code, Identity::guest("G"))
            .await
            .unwrap();
        let AdvanceOutcome::Activated(live) =
            engine.advance_question(&session.id, &host).await.unwrap()
        else {
            panic!("expected a live question");
        };
        backdate_live_question(&engine, &session.id, 3600).await;

        assert_eq!(
            engine
                .submit_response(
                    &session.id,
                    &live.session_question_id,
                    &guest.id,
                    Answer::Geo {
                        latitude: 48.2,
                        longitude: 11.6,
                    },
                    false,
                )
                .await
                .unwrap_err(),
            EngineError::DeadlineExceeded
        );

        let handle = engine.handle(&session.id).await.unwrap();
        let state = handle.state.read().await;
        let stored = &state.responses[&(live.session_question_id.clone(), guest.id.clone())];
        assert!(!stored.is_correct);
        assert_eq!(stored.points_earned, 0);
        let distance = stored.distance_error_meters.unwrap();
        assert!(distance > 0.0 && distance < 100_000.0);
    }

    #[tokio::test]
    async fn speed_bonus_decays_with_elapsed_time() {
        let (engine, bank_id, host) = engine_with_bank().await;
        let session = engine
            .create_session(NewSession::live("map", bank_id, host.clone(), "Fast"))
            .await
            .unwrap();
        engine.start_session(&session.id, &host).await.unwrap();
        let fast = engine
            .join_session(&session.join_code, Identity::guest("Fast"))
            .await
            .unwrap();
        let slow = engine
            .join_session(&session.join_code, Identity::guest("Slow"))
            .await
            .unwrap();
        let AdvanceOutcome::Activated(q) =
            engine.advance_question(&session.id, &host).await.unwrap()
        else {
            panic!("expected a live question");
        };
        let right = correct_option(&q);

        let early = engine
            .submit_response(
                &session.id,
                &q.session_question_id,
                &fast.id,
                Answer::Choice {
                    option_ids: vec![right.clone()],
                },
                false,
            )
            .await
            .unwrap();

        // Move the start 25 seconds into the past of the 30 second window
        backdate_live_question(&engine, &session.id, 25).await;
        let late = engine
            .submit_response(
                &session.id,
                &q.session_question_id,
                &slow.id,
                Answer::Choice {
                    option_ids: vec![right],
                },
                false,
            )
            .await
            .unwrap();

        assert!(early.points_earned > late.points_earned);
        assert!(early.points_earned <= 100);
        // The floor holds even at the deadline
        assert!(late.points_earned >= 50);
    }

    #[tokio::test]
    async fn hint_halves_the_award() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;
        let live = live_view(&engine, &session_id).await;
        let right = live
            .question
            .options
            .iter()
            .find(|o| o.is_correct)
            .unwrap()
            .id
            .clone();

        let outcome = engine
            .submit_response(
                &session_id,
                &sq_id,
                &guest.id,
                Answer::Choice {
                    option_ids: vec![right],
                },
                true,
            )
            .await
            .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points_earned, 50);
    }

    #[tokio::test]
    async fn submissions_blocked_while_paused() {
        let (engine, session_id, host, guest, sq_id) = live_single_choice().await;
        engine.pause_session(&session_id, &host).await.unwrap();

        assert_eq!(
            engine
                .submit_response(
                    &session_id,
                    &sq_id,
                    &guest.id,
                    Answer::Text {
                        text: "anything".to_string(),
                    },
                    false,
                )
                .await
                .unwrap_err(),
            EngineError::SessionPaused
        );
    }

    #[tokio::test]
    async fn mismatched_payload_shape_is_rejected() {
        let (engine, session_id, _host, guest, sq_id) = live_single_choice().await;

        assert!(matches!(
            engine
                .submit_response(
                    &session_id,
                    &sq_id,
                    &guest.id,
                    Answer::Geo {
                        latitude: 0.0,
                        longitude: 0.0,
                    },
                    false,
                )
                .await,
            Err(EngineError::ValidationFailed(_))
        ));

        // A rejected submission is not stored, so a retry still works
        let live = live_view(&engine, &session_id).await;
        let right = live.question.options[0].id.clone();
        engine
            .submit_response(
                &session_id,
                &sq_id,
                &guest.id,
                Answer::Choice {
                    option_ids: vec![right],
                },
                false,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn geo_acceptance_is_inclusive_at_the_radius() {
        let config = EngineConfig::default();
        let target = (48.137, 11.575);
        let near = (48.142, 11.575);
        let radius = haversine_meters(near.0, near.1, target.0, target.1);

        let mut q = NewQuestion::of_type(QuestionType::GeoPoint, "Find the city");
        q.correct_latitude = Some(target.0);
        q.correct_longitude = Some(target.1);
        q.acceptance_radius_meters = Some(radius);
        let question = Question {
            id: "q".to_string(),
            bank_id: "b".to_string(),
            question_type: QuestionType::GeoPoint,
            prompt: q.prompt.clone(),
            image_url: None,
            points: 100,
            time_limit_seconds: 30,
            correct_answer_text: None,
            correct_latitude: q.correct_latitude,
            correct_longitude: q.correct_longitude,
            acceptance_radius_meters: q.acceptance_radius_meters,
            hint_text: None,
            explanation: None,
            display_order: 1,
            options: Vec::new(),
        };

        let (ok, dist) = grade(
            &question,
            &config,
            &Answer::Geo {
                latitude: near.0,
                longitude: near.1,
            },
        )
        .unwrap();
        assert!(ok, "a point exactly at the radius is accepted");
        assert!((dist.unwrap() - radius).abs() < 1e-6);

        let (ok, dist) = grade(
            &question,
            &config,
            &Answer::Geo {
                latitude: 48.143,
                longitude: 11.575,
            },
        )
        .unwrap();
        assert!(!ok, "a point past the radius is rejected");
        assert!(dist.unwrap() > radius);
    }

    #[tokio::test]
    async fn multi_choice_requires_the_exact_correct_set() {
        let (engine, bank_id, host) = engine_with_bank().await;
        let mut q = NewQuestion::of_type(QuestionType::MultiChoice, "Pick both");
        q.options = vec![
            NewOption::new("A", true),
            NewOption::new("B", true),
            NewOption::new("C", false),
        ];
        let question = engine.banks.add_question(&bank_id, &host, q).await.unwrap();
        let ids: Vec<_> = question.options.iter().map(|o| o.id.clone()).collect();
        let config = EngineConfig::default();

        let both = Answer::Choice {
            option_ids: vec![ids[0].clone(), ids[1].clone()],
        };
        assert!(grade(&question, &config, &both).unwrap().0);

        let partial = Answer::Choice {
            option_ids: vec![ids[0].clone()],
        };
        assert!(!grade(&question, &config, &partial).unwrap().0);

        let with_extra = Answer::Choice {
            option_ids: vec![ids[0].clone(), ids[1].clone(), ids[2].clone()],
        };
        assert!(!grade(&question, &config, &with_extra).unwrap().0);
    }

    #[tokio::test]
    async fn text_grading_is_trimmed_and_case_insensitive() {
        let mut new = NewQuestion::of_type(QuestionType::Text, "Capital of France?");
        new.correct_answer_text = Some("Paris".to_string());
        let (engine, bank_id, host) = engine_with_bank().await;
        let question = engine
            .banks
            .add_question(&bank_id, &host, new)
            .await
            .unwrap();
        let config = EngineConfig::default();

        for text in ["Paris", "  paris ", "PARIS"] {
            let answer = Answer::Text {
                text: text.to_string(),
            };
            assert!(grade(&question, &config, &answer).unwrap().0, "{:?}", text);
        }
        let wrong = Answer::Text {
            text: "Lyon".to_string(),
        };
        assert!(!grade(&question, &config, &wrong).unwrap().0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Munich to Berlin is roughly 504 km
        let d = haversine_meters(48.137, 11.575, 52.520, 13.405);
        assert!((d - 504_000.0).abs() < 5_000.0, "got {}", d);
    }
}
