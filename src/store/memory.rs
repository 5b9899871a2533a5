//! In-process store for local runs and tests.

use super::QuizStore;
use crate::error::ApiError;
use crate::models::question::{MAX_CHOICE_TEXT_LEN, MAX_QUESTION_TEXT_LEN};
use crate::models::{Choice, NewQuestion, Question, QuestionWithChoices};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug)]
struct Tables {
    questions: BTreeMap<i32, Question>,
    choices: Vec<Choice>,
    next_question_id: i32,
    next_choice_id: i32,
}

/// Mirrors the PostgreSQL schema: serial ids from 1, VARCHAR width and
/// encoding checks at write time, and all-or-nothing creates.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                questions: BTreeMap::new(),
                choices: Vec::new(),
                next_question_id: 1,
                next_choice_id: 1,
            }),
        }
    }

    /// Number of stored questions and choices.
    pub async fn row_counts(&self) -> (usize, usize) {
        let tables = self.tables.read().await;
        (tables.questions.len(), tables.choices.len())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects what a UTF8 `VARCHAR(max)` column would reject.
fn check_text(column: &str, value: &str, max: usize) -> Result<(), ApiError> {
    // PostgreSQL text cannot hold NUL
    if value.contains('\0') {
        return Err(ApiError::Database(format!(
            "invalid byte sequence for encoding \"UTF8\": 0x00 in column {}",
            column
        )));
    }

    if value.chars().count() > max {
        return Err(ApiError::Database(format!(
            "value too long for column {} (character varying({}))",
            column, max
        )));
    }
    Ok(())
}

fn next_id(counter: &mut i32) -> Result<i32, ApiError> {
    let id = *counter;
    *counter = id
        .checked_add(1)
        .ok_or_else(|| ApiError::Internal(anyhow!("serial id space exhausted")))?;
    Ok(id)
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, ApiError> {
        let mut tables = self.tables.write().await;

        // Stage on copies of the counters; nothing is published until every row checks out
        let mut question_seq = tables.next_question_id;
        let mut choice_seq = tables.next_choice_id;

        check_text("question_text", &new_question.question_text, MAX_QUESTION_TEXT_LEN)?;
        let question = Question {
            id: next_id(&mut question_seq)?,
            question_text: new_question.question_text,
        };

        let mut staged = Vec::with_capacity(new_question.choices.len());
        for choice in new_question.choices {
            check_text("choice_text", &choice.choice_text, MAX_CHOICE_TEXT_LEN)?;
            staged.push(Choice {
                id: next_id(&mut choice_seq)?,
                choice_text: choice.choice_text,
                is_correct: choice.is_correct,
                question_id: question.id,
            });
        }

        tables.next_question_id = question_seq;
        tables.next_choice_id = choice_seq;
        tables.questions.insert(question.id, question.clone());
        tables.choices.extend(staged);

        info!("Stored question {} in memory", question.id);
        Ok(question)
    }

    async fn get_question(&self, question_id: i32) -> Result<QuestionWithChoices, ApiError> {
        let tables = self.tables.read().await;

        let question = tables
            .questions
            .get(&question_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Question {}", question_id)))?;

        let choices = tables
            .choices
            .iter()
            .filter(|choice| choice.question_id == question_id)
            .cloned()
            .collect();

        Ok(QuestionWithChoices { question, choices })
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
