//! Question Bank Store: CRUD over banks, questions, and options.
//!
//! Banks exist independently of sessions; a session copies the bank's
//! questions into its queue when it starts. `total_questions` is adjusted in
//! the same mutation as every question insert/delete so session
//! materialization can size-check a bank without counting.

use crate::error::{EngineError, EngineResult};
use crate::types::*;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct NewBank {
    pub owner_id: UserId,
    pub workspace_id: Option<WorkspaceId>,
    pub map_id: Option<MapId>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_template: bool,
    pub is_public: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_type: QuestionType,
    pub prompt: String,
    pub image_url: Option<String>,
    pub points: u32,
    pub time_limit_seconds: u32,
    pub correct_answer_text: Option<String>,
    pub correct_latitude: Option<f64>,
    pub correct_longitude: Option<f64>,
    pub acceptance_radius_meters: Option<f64>,
    pub hint_text: Option<String>,
    pub explanation: Option<String>,
    pub options: Vec<NewOption>,
}

impl NewQuestion {
    /// A question with the platform defaults (100 points, 30 second limit).
    pub fn of_type(question_type: QuestionType, prompt: impl Into<String>) -> Self {
        Self {
            question_type,
            prompt: prompt.into(),
            image_url: None,
            points: 100,
            time_limit_seconds: 30,
            correct_answer_text: None,
            correct_latitude: None,
            correct_longitude: None,
            acceptance_radius_meters: None,
            hint_text: None,
            explanation: None,
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

impl NewOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// In-memory bank registry guarded by a single lock; bank mutations are rare
/// next to session traffic.
pub struct BankStore {
    banks: RwLock<HashMap<BankId, QuestionBank>>,
}

impl BankStore {
    pub fn new() -> Self {
        Self {
            banks: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_bank(&self, new: NewBank) -> QuestionBank {
        let bank = QuestionBank {
            id: ulid::Ulid::new().to_string(),
            owner_id: new.owner_id,
            workspace_id: new.workspace_id,
            map_id: new.map_id,
            name: new.name,
            description: new.description,
            category: new.category,
            tags: new.tags,
            total_questions: 0,
            is_template: new.is_template,
            is_public: new.is_public,
            is_active: true,
            questions: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };

        self.banks
            .write()
            .await
            .insert(bank.id.clone(), bank.clone());
        tracing::info!(bank_id = %bank.id, "Created question bank {:?}", bank.name);
        bank
    }

    pub async fn get_bank(&self, bank_id: &BankId) -> EngineResult<QuestionBank> {
        self.banks
            .read()
            .await
            .get(bank_id)
            .cloned()
            .ok_or(EngineError::BankNotFound)
    }

    pub async fn list_banks(&self, owner_id: &UserId) -> Vec<QuestionBank> {
        self.banks
            .read()
            .await
            .values()
            .filter(|b| b.owner_id == *owner_id)
            .cloned()
            .collect()
    }

    /// Update bank metadata. `None` leaves a field untouched.
    pub async fn update_bank(
        &self,
        bank_id: &BankId,
        user_id: &UserId,
        name: Option<String>,
        description: Option<String>,
    ) -> EngineResult<QuestionBank> {
        let mut banks = self.banks.write().await;
        let bank = banks.get_mut(bank_id).ok_or(EngineError::BankNotFound)?;
        if bank.owner_id != *user_id {
            return Err(EngineError::NotAuthorized);
        }
        if let Some(name) = name {
            bank.name = name;
        }
        if let Some(description) = description {
            bank.description = Some(description);
        }
        bank.updated_at = Some(Utc::now());
        Ok(bank.clone())
    }

    /// Explicit deletion cascades to the bank's questions and options.
    pub async fn delete_bank(&self, bank_id: &BankId, user_id: &UserId) -> EngineResult<()> {
        let mut banks = self.banks.write().await;
        let bank = banks.get(bank_id).ok_or(EngineError::BankNotFound)?;
        if bank.owner_id != *user_id {
            return Err(EngineError::NotAuthorized);
        }
        banks.remove(bank_id);
        tracing::info!(bank_id = %bank_id, "Deleted question bank");
        Ok(())
    }

    pub async fn add_question(
        &self,
        bank_id: &BankId,
        user_id: &UserId,
        new: NewQuestion,
    ) -> EngineResult<Question> {
        validate_question(&new)?;

        let mut banks = self.banks.write().await;
        let bank = banks.get_mut(bank_id).ok_or(EngineError::BankNotFound)?;
        if bank.owner_id != *user_id {
            return Err(EngineError::NotAuthorized);
        }

        let question = build_question(bank_id, bank.questions.len() as u32 + 1, new);
        bank.questions.push(question.clone());
        bank.total_questions += 1;
        bank.updated_at = Some(Utc::now());
        Ok(question)
    }

    /// Replace a question's content in place. Identity and queue position are
    /// kept; sessions already started are unaffected.
    pub async fn update_question(
        &self,
        bank_id: &BankId,
        user_id: &UserId,
        question_id: &QuestionId,
        new: NewQuestion,
    ) -> EngineResult<Question> {
        validate_question(&new)?;

        let mut banks = self.banks.write().await;
        let bank = banks.get_mut(bank_id).ok_or(EngineError::BankNotFound)?;
        if bank.owner_id != *user_id {
            return Err(EngineError::NotAuthorized);
        }

        let slot = bank
            .questions
            .iter_mut()
            .find(|q| q.id == *question_id)
            .ok_or(EngineError::QuestionNotFound)?;

        let mut rebuilt = build_question(bank_id, slot.display_order, new);
        rebuilt.id = slot.id.clone();
        *slot = rebuilt.clone();
        bank.updated_at = Some(Utc::now());
        Ok(rebuilt)
    }

    pub async fn remove_question(
        &self,
        bank_id: &BankId,
        user_id: &UserId,
        question_id: &QuestionId,
    ) -> EngineResult<()> {
        let mut banks = self.banks.write().await;
        let bank = banks.get_mut(bank_id).ok_or(EngineError::BankNotFound)?;
        if bank.owner_id != *user_id {
            return Err(EngineError::NotAuthorized);
        }

        let before = bank.questions.len();
        bank.questions.retain(|q| q.id != *question_id);
        if bank.questions.len() == before {
            return Err(EngineError::QuestionNotFound);
        }

        // Keep display_order dense after removal
        for (i, q) in bank.questions.iter_mut().enumerate() {
            q.display_order = i as u32 + 1;
        }
        bank.total_questions -= 1;
        bank.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Copy of a bank's questions in display order, for session
    /// materialization.
    pub async fn snapshot_questions(&self, bank_id: &BankId) -> EngineResult<Vec<Question>> {
        let banks = self.banks.read().await;
        let bank = banks.get(bank_id).ok_or(EngineError::BankNotFound)?;
        if !bank.is_active {
            return Err(EngineError::BankNotFound);
        }
        let mut questions = bank.questions.clone();
        questions.sort_by_key(|q| q.display_order);
        Ok(questions)
    }
}

impl Default for BankStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_question(new: &NewQuestion) -> EngineResult<()> {
    if new.prompt.trim().is_empty() {
        return Err(EngineError::ValidationFailed(
            "question prompt cannot be empty".to_string(),
        ));
    }

    match new.question_type {
        QuestionType::SingleChoice | QuestionType::MultiChoice => {
            if new.options.len() < 2 {
                return Err(EngineError::ValidationFailed(
                    "choice questions need at least two options".to_string(),
                ));
            }
            let correct = new.options.iter().filter(|o| o.is_correct).count();
            if correct == 0 {
                return Err(EngineError::ValidationFailed(
                    "choice questions need a correct option".to_string(),
                ));
            }
            if new.question_type == QuestionType::SingleChoice && correct != 1 {
                return Err(EngineError::ValidationFailed(
                    "single-choice questions need exactly one correct option".to_string(),
                ));
            }
        }
        QuestionType::Text => {
            if new
                .correct_answer_text
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
            {
                return Err(EngineError::ValidationFailed(
                    "text questions need a correct answer text".to_string(),
                ));
            }
        }
        QuestionType::GeoPoint => {
            let (Some(lat), Some(lon)) = (new.correct_latitude, new.correct_longitude) else {
                return Err(EngineError::ValidationFailed(
                    "geo questions need a correct latitude and longitude".to_string(),
                ));
            };
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(EngineError::ValidationFailed(
                    "correct coordinates out of range".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn build_question(bank_id: &BankId, display_order: u32, new: NewQuestion) -> Question {
    Question {
        id: ulid::Ulid::new().to_string(),
        bank_id: bank_id.clone(),
        question_type: new.question_type,
        prompt: new.prompt,
        image_url: new.image_url,
        points: new.points,
        time_limit_seconds: new.time_limit_seconds,
        correct_answer_text: new.correct_answer_text,
        correct_latitude: new.correct_latitude,
        correct_longitude: new.correct_longitude,
        acceptance_radius_meters: new.acceptance_radius_meters,
        hint_text: new.hint_text,
        explanation: new.explanation,
        display_order,
        options: new
            .options
            .into_iter()
            .enumerate()
            .map(|(i, o)| QuestionOption {
                id: ulid::Ulid::new().to_string(),
                text: o.text,
                is_correct: o.is_correct,
                display_order: i as u32 + 1,
            })
            .collect(),
    }
}
