use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use spacedesign_types::api::{ApiResponse, NewQuestion};
use spacedesign_types::models::QaQuestion;

use crate::assistant::canned_answer;
use crate::error::{ApiError, ApiResult};
use crate::extract::{CategoryQuery, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/qa/questions?category=
pub async fn list_questions(
    State(state): State<AppState>,
    CategoryQuery(filter): CategoryQuery,
) -> ApiResult<Json<ApiResponse<Vec<QaQuestion>>>> {
    let category = filter.category().map(str::to_owned);

    let questions = blocking(&state, move |app| {
        let rows = app.db.list_questions(category.as_deref())?;
        Ok(rows.into_iter().map(QaQuestion::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(questions)))
}

/// POST /api/qa/questions
///
/// Answers the question from the canned set for its category and stores it
/// already answered.
pub async fn ask_question(
    State(state): State<AppState>,
    ValidatedJson(question): ValidatedJson<NewQuestion>,
) -> ApiResult<impl IntoResponse> {
    let answer = canned_answer(question.category.as_deref());

    let answered = blocking(&state, move |app| {
        if let Some(user_id) = question.user_id {
            if app.db.get_user(user_id)?.is_none() {
                return Err(ApiError::NotFound("User"));
            }
        }
        Ok(QaQuestion::from(app.db.create_question(&question, answer)?))
    })
    .await?;

    info!(question_id = answered.id, category = ?answered.category, "Question answered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(answered).with_message("Question submitted and answered")),
    ))
}
