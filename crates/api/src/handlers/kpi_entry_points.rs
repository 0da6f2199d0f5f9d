//! Handlers for vendor entry-point KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use altar_core::entry_points::{
    default_questions, questions_by_ids, CustomCombination, EntryPointQuestion, EntryPointsData,
    AVAILABLE_ENTRY_POINT_QUESTIONS,
};
use altar_db::repositories::EntryPointsRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{DateRangeParams, QuestionIdsParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Entry-point analysis plus the full question catalog for the
/// frontend's selector.
#[derive(Debug, Serialize)]
pub struct EntryPointsResponse {
    pub data: EntryPointsData,
    pub available_questions: &'static [EntryPointQuestion],
}

/// GET /api/v1/kpi/entry-points
///
/// Optional `question_ids` selects the questions to analyze; absent or
/// empty falls back to the default set. Unknown ids are dropped.
pub async fn get_entry_points(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(range_params): Query<DateRangeParams>,
    Query(question_params): Query<QuestionIdsParams>,
) -> AppResult<impl IntoResponse> {
    let range = range_params.resolve(chrono::Utc::now());

    let questions = match question_params.parse() {
        Some(ids) => questions_by_ids(&ids),
        None => default_questions(),
    };

    let data = EntryPointsRepo::entry_points(&state.pool, &range, &questions).await?;

    Ok(Json(EntryPointsResponse {
        data,
        available_questions: &AVAILABLE_ENTRY_POINT_QUESTIONS,
    }))
}

/// GET /api/v1/kpi/entry-points/combination
///
/// Counts weddings satisfying *every* question in the required
/// `question_ids` list. An absent or empty list is a client error.
pub async fn get_custom_combination(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(range_params): Query<DateRangeParams>,
    Query(question_params): Query<QuestionIdsParams>,
) -> AppResult<Json<DataResponse<CustomCombination>>> {
    let Some(ids) = question_params.parse() else {
        return Err(AppError::BadRequest(
            "question_ids parameter is required".into(),
        ));
    };

    let range = range_params.resolve(chrono::Utc::now());
    let questions = questions_by_ids(&ids);
    let data = EntryPointsRepo::custom_combination(&state.pool, &range, &questions).await?;

    Ok(Json(DataResponse { data }))
}
