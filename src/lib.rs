// Library root for the Quiz API

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::{ApiError, ApiResult};
pub use models::{Choice, CreateQuestionRequest, Question, QuestionWithChoices};
pub use routes::create_router;
pub use store::{MemoryStore, QuizStore, SharedStore};
