//! Storage abstraction for questions and their choices.

use crate::error::ApiError;
use crate::models::{NewQuestion, Question, QuestionWithChoices};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;

pub use memory::MemoryStore;

/// Persistence operations the HTTP layer needs.
///
/// Implementations must write a question and its choices atomically: when
/// `create_question` fails, none of the request's rows may remain visible.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Insert a question and all of its choices.
    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, ApiError>;

    /// Fetch a question with its choices in insertion order.
    ///
    /// # Returns
    /// `ApiError::NotFound` when no question has this id
    async fn get_question(&self, question_id: i32) -> Result<QuestionWithChoices, ApiError>;

    /// Check that the backend can serve requests.
    async fn health_check(&self) -> Result<(), ApiError>;
}

/// Store handle shared by every request.
pub type SharedStore = Arc<dyn QuizStore>;
