//! Leaderboard ordering and the read-side views over stored responses.

use super::SessionEngine;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{
    LeaderboardEntry, MapPin, MapPins, QuestionStats, ResponseDetail, WordCloud, WordCount,
};
use crate::types::*;
use std::collections::HashMap;

/// Recompute competition ranks in place. Ordering is total score
/// descending, then average response time ascending, then join order;
/// ranks themselves follow score only, so equal scores share a rank and
/// the next distinct score skips past the tie (100, 100, 80 ranks 1, 1, 3).
pub(crate) fn assign_ranks(participants: &mut HashMap<ParticipantId, SessionParticipant>) {
    let mut order: Vec<_> = participants.values_mut().collect();
    order.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then(
                a.average_response_time
                    .partial_cmp(&b.average_response_time)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.join_order.cmp(&b.join_order))
    });

    let mut prev_score = None;
    let mut rank = 0;
    for (position, participant) in order.into_iter().enumerate() {
        if prev_score != Some(participant.total_score) {
            rank = position as u32 + 1;
            prev_score = Some(participant.total_score);
        }
        participant.rank = rank;
    }
}

/// Snapshot the standings in display order. Ranks are derived here from the
/// same ordering rather than read from the stored field, so a participant
/// who joined after the last grading pass still lists below every scorer.
pub(crate) fn leaderboard_entries(
    participants: &HashMap<ParticipantId, SessionParticipant>,
    limit: Option<usize>,
) -> Vec<LeaderboardEntry> {
    let mut order: Vec<_> = participants.values().collect();
    order.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then(
                a.average_response_time
                    .partial_cmp(&b.average_response_time)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.join_order.cmp(&b.join_order))
    });

    let cap = limit.unwrap_or(usize::MAX);
    let mut entries = Vec::new();
    let mut prev_score = None;
    let mut rank = 0;
    for (position, p) in order.into_iter().enumerate() {
        if prev_score != Some(p.total_score) {
            rank = position as u32 + 1;
            prev_score = Some(p.total_score);
        }
        if entries.len() >= cap {
            break;
        }
        entries.push(LeaderboardEntry {
            rank,
            participant_id: p.id.clone(),
            display_name: p.display_name.clone(),
            total_score: p.total_score,
            total_correct: p.total_correct,
            total_answered: p.total_answered,
            average_response_time: p.average_response_time,
        });
    }
    entries
}

impl SessionEngine {
    /// Current standings, best first.
    pub async fn get_leaderboard(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        Ok(leaderboard_entries(&state.participants, limit))
    }

    /// Aggregate figures for one queue entry, read straight off the
    /// counters kept at submission time.
    pub async fn get_question_stats(
        &self,
        session_id: &SessionId,
        session_question_id: &SessionQuestionId,
    ) -> EngineResult<QuestionStats> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        let question = state
            .queue
            .iter()
            .find(|q| q.id == *session_question_id)
            .ok_or(EngineError::QuestionNotFound)?;

        let total = question.total_responses;
        Ok(QuestionStats {
            session_question_id: question.id.clone(),
            status: question.status,
            total_responses: total,
            correct_responses: question.correct_responses,
            correct_rate: if total > 0 {
                f64::from(question.correct_responses) / f64::from(total)
            } else {
                0.0
            },
            average_response_time: if total > 0 {
                question.response_time_sum / f64::from(total)
            } else {
                0.0
            },
        })
    }

    /// Every stored response to a queue entry, in submission order. Host
    /// review surface; includes the raw payloads.
    pub async fn get_question_responses(
        &self,
        session_id: &SessionId,
        host_user_id: &UserId,
        session_question_id: &SessionQuestionId,
    ) -> EngineResult<Vec<ResponseDetail>> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        state.require_host(host_user_id)?;
        if !state.queue.iter().any(|q| q.id == *session_question_id) {
            return Err(EngineError::QuestionNotFound);
        }

        let mut details: Vec<_> = state
            .responses
            .values()
            .filter(|r| r.session_question_id == *session_question_id)
            .map(|r| ResponseDetail {
                response_id: r.id.clone(),
                participant_id: r.participant_id.clone(),
                display_name: state
                    .participants
                    .get(&r.participant_id)
                    .map(|p| p.display_name.clone())
                    .unwrap_or_default(),
                is_correct: r.is_correct,
                points_earned: r.points_earned,
                response_time_seconds: r.response_time_seconds,
                selected_option_ids: r.selected_option_ids.clone(),
                response_text: r.response_text.clone(),
                response_latitude: r.response_latitude,
                response_longitude: r.response_longitude,
                distance_error_meters: r.distance_error_meters,
                submitted_at: r.submitted_at,
            })
            .collect();
        details.sort_by_key(|d| d.submitted_at);
        Ok(details)
    }

    /// Frequency aggregation over the text answers to one question. Answers
    /// are normalized (trimmed, lowercased) before counting, most frequent
    /// first.
    pub async fn get_word_cloud(
        &self,
        session_id: &SessionId,
        session_question_id: &SessionQuestionId,
    ) -> EngineResult<WordCloud> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        let question = state
            .queue
            .iter()
            .find(|q| q.id == *session_question_id)
            .ok_or(EngineError::QuestionNotFound)?;
        if question.question.question_type != QuestionType::Text {
            return Err(EngineError::ValidationFailed(
                "word clouds exist only for text questions".to_string(),
            ));
        }

        let mut counts: HashMap<String, u32> = HashMap::new();
        for response in state
            .responses
            .values()
            .filter(|r| r.session_question_id == *session_question_id)
        {
            if let Some(text) = &response.response_text {
                let normalized = text.trim().to_lowercase();
                if !normalized.is_empty() {
                    *counts.entry(normalized).or_insert(0) += 1;
                }
            }
        }

        let mut words: Vec<WordCount> = counts
            .into_iter()
            .map(|(text, count)| WordCount { text, count })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count).then(a.text.cmp(&b.text)));

        Ok(WordCloud {
            session_question_id: question.id.clone(),
            total_responses: question.total_responses,
            words,
        })
    }

    /// Submitted coordinates for a geo question, ready to render over the
    /// map together with the target point.
    pub async fn get_map_pins(
        &self,
        session_id: &SessionId,
        session_question_id: &SessionQuestionId,
    ) -> EngineResult<MapPins> {
        let handle = self.handle(session_id).await?;
        let state = handle.state.read().await;
        let question = state
            .queue
            .iter()
            .find(|q| q.id == *session_question_id)
            .ok_or(EngineError::QuestionNotFound)?;
        if question.question.question_type != QuestionType::GeoPoint {
            return Err(EngineError::ValidationFailed(
                "map pins exist only for geo questions".to_string(),
            ));
        }

        let mut pins: Vec<_> = state
            .responses
            .values()
            .filter(|r| r.session_question_id == *session_question_id)
            .filter_map(|r| {
                let latitude = r.response_latitude?;
                let longitude = r.response_longitude?;
                Some(MapPin {
                    participant_id: r.participant_id.clone(),
                    display_name: state
                        .participants
                        .get(&r.participant_id)
                        .map(|p| p.display_name.clone())
                        .unwrap_or_default(),
                    latitude,
                    longitude,
                    is_correct: r.is_correct,
                    distance_error_meters: r.distance_error_meters.unwrap_or(0.0),
                    points_earned: r.points_earned,
                })
            })
            .collect();
        pins.sort_by(|a, b| {
            a.distance_error_meters
                .partial_cmp(&b.distance_error_meters)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(MapPins {
            session_question_id: question.id.clone(),
            correct_latitude: question.question.correct_latitude,
            correct_longitude: question.question.correct_longitude,
            acceptance_radius_meters: question.question.acceptance_radius_meters,
            total_responses: question.total_responses,
            pins,
        })
    }
}
