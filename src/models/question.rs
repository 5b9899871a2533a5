use serde::{Deserialize, Serialize};

/// Column width of `questions.question_text`.
pub const MAX_QUESTION_TEXT_LEN: usize = 500;

/// Column width of `choices.choice_text`.
pub const MAX_CHOICE_TEXT_LEN: usize = 255;

/// A stored quiz prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i32,
    pub question_text: String,
}

/// A stored candidate answer belonging to a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: i32,
    pub choice_text: String,
    pub is_correct: bool,
    pub question_id: i32,
}

/// Response body for `GET /getQuestion/:question_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionWithChoices {
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// Plain confirmation body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One answer inside a create request
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceRequest {
    pub choice_text: String,
    pub is_correct: bool,
}

/// Payload accepted by `POST /questions/`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
    pub choices: Vec<ChoiceRequest>,
}

/// Question ready to be written, ids not yet assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub question_text: String,
    pub choices: Vec<NewChoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChoice {
    pub choice_text: String,
    pub is_correct: bool,
}

impl CreateQuestionRequest {
    /// Convert to the storage-level shape.
    /// Texts are stored exactly as submitted; width limits are enforced by storage.
    pub fn into_new_question(self) -> NewQuestion {
        NewQuestion {
            question_text: self.question,
            choices: self
                .choices
                .into_iter()
                .map(|choice| NewChoice {
                    choice_text: choice.choice_text,
                    is_correct: choice.is_correct,
                })
                .collect(),
        }
    }
}
