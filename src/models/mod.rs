// Models module

pub mod question;

// Re-export commonly used types
pub use question::{
    Choice, ChoiceRequest, CreateQuestionRequest, MessageResponse, NewChoice, NewQuestion,
    Question, QuestionWithChoices,
};
