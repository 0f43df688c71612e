use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use super::error::{internal_error, ApiError};
use crate::db::Database;
use crate::models::*;
use crate::validation;

/// Ids that are not well-formed store ids resolve to "not found", the same
/// as ids that simply don't exist.
fn parse_plan_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!("Malformed plan id: {}", raw);
        ApiError::NotFound
    })
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Plans
// ============================================================

pub async fn list_plans(State(db): State<Database>) -> Result<Json<Vec<Plan>>, ApiError> {
    db.list_plans()
        .map(Json)
        .map_err(internal_error("Failed to fetch plans"))
}

pub async fn get_plan(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Plan>, ApiError> {
    let id = parse_plan_id(&id)?;
    db.get_plan(id)
        .map_err(internal_error("Failed to fetch plan"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn create_plan(
    State(db): State<Database>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    let Json(body) = payload?;

    let input = validation::parse_create(&body).map_err(|errors| {
        tracing::warn!("Rejected plan: {}", errors);
        ApiError::BadRequest(errors.to_string())
    })?;

    let plan = db
        .create_plan(input)
        .map_err(internal_error("Failed to create plan"))?;
    tracing::info!(plan_id = %plan.id, "Created plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Partial replacement of a plan's title, todos, and notes.
///
/// Only the body's shape is checked here; the create-time content rules are
/// not re-applied.
pub async fn update_plan(
    State(db): State<Database>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePlanInput>, JsonRejection>,
) -> Result<Json<Plan>, ApiError> {
    let id = parse_plan_id(&id)?;
    let Json(input) = payload?;

    db.update_plan(id, input)
        .map_err(internal_error("Failed to update plan"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_plan(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<DeletedPlan>, ApiError> {
    let id = parse_plan_id(&id)?;
    if db
        .delete_plan(id)
        .map_err(internal_error("Failed to delete plan"))?
    {
        tracing::info!(plan_id = %id, "Deleted plan");
        Ok(Json(DeletedPlan::new(id)))
    } else {
        Err(ApiError::NotFound)
    }
}
