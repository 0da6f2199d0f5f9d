//! Handlers for the KPI metadata catalog.

use axum::extract::Path;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use altar_core::catalog::{
    all_definitions, definition_by_slug, definitions_by_category, KpiCategory, KpiDefinition,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// A catalog category with its display label.
#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
}

/// The full catalog listing.
#[derive(Debug, Serialize)]
pub struct DefinitionsResponse {
    pub definitions: &'static [KpiDefinition],
    pub categories: Vec<CategoryInfo>,
    pub total_count: usize,
}

/// One category's definitions.
#[derive(Debug, Serialize)]
pub struct CategoryDefinitionsResponse {
    pub category: &'static str,
    pub category_label: &'static str,
    pub definitions: Vec<&'static KpiDefinition>,
    pub count: usize,
}

fn parse_category(category: &str) -> Result<KpiCategory, AppError> {
    KpiCategory::from_code(category).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid category '{category}'. Valid categories: {}",
            KpiCategory::ALL
                .iter()
                .map(|c| c.code())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

/// GET /api/v1/kpi/definitions
pub async fn list_definitions(_auth: AuthUser) -> AppResult<impl IntoResponse> {
    let definitions = all_definitions();
    let categories = KpiCategory::ALL
        .iter()
        .map(|c| CategoryInfo {
            id: c.code(),
            label: c.label(),
        })
        .collect();

    Ok(Json(DataResponse {
        data: DefinitionsResponse {
            definitions,
            categories,
            total_count: definitions.len(),
        },
    }))
}

/// GET /api/v1/kpi/definitions/{category}
pub async fn list_by_category(
    _auth: AuthUser,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let definitions = definitions_by_category(category);
    let count = definitions.len();

    Ok(Json(DataResponse {
        data: CategoryDefinitionsResponse {
            category: category.code(),
            category_label: category.label(),
            definitions,
            count,
        },
    }))
}

/// GET /api/v1/kpi/definitions/{category}/{slug}
///
/// A miss is a 404, distinct from a computation error.
pub async fn get_definition(
    _auth: AuthUser,
    Path((category, slug)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let definition = definition_by_slug(category, &slug)?;
    Ok(Json(DataResponse { data: definition }))
}
