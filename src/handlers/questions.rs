// Question handlers
// HTTP handlers for creating and reading quiz questions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    error::ApiResult,
    models::{CreateQuestionRequest, MessageResponse},
    store::SharedStore,
};

/// Create a question together with its choices
/// POST /questions/
pub async fn create_question(
    State(store): State<SharedStore>,
    Json(request): Json<CreateQuestionRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Creating new question with {} choices", request.choices.len());

    let question = store.create_question(request.into_new_question()).await?;

    info!("Successfully created question with id: {}", question.id);
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Question and choices created successfully")),
    ))
}

/// Get a question and its choices
/// GET /getQuestion/:question_id
pub async fn get_question(
    State(store): State<SharedStore>,
    Path(question_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    info!("Fetching question with id: {}", question_id);

    let question = store.get_question(question_id).await?;

    Ok((StatusCode::OK, Json(question)))
}
