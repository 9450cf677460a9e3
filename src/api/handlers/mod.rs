use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::Registry;
use crate::error::RegistryError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Map a registry failure to a status and message for the client.
///
/// Domain failures are returned as-is with a client-error status. Storage
/// failures are logged server-side and clients only see a generic message.
fn error_response(e: RegistryError) -> (StatusCode, String) {
    let msg = e.to_string();

    match e {
        RegistryError::NotFound(_) => {
            tracing::warn!("Not found: {}", msg);
            (StatusCode::NOT_FOUND, msg)
        }
        e if e.is_client_error() => {
            tracing::warn!("Validation error: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        _ => {
            tracing::error!("Internal error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Persons
// ============================================================

pub async fn list_persons(
    State(registry): State<Registry>,
) -> Result<Json<Vec<Person>>, (StatusCode, String)> {
    registry.list().map(Json).map_err(error_response)
}

pub async fn get_person(
    State(registry): State<Registry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Person>, (StatusCode, String)> {
    registry.find(id).map(Json).map_err(error_response)
}

pub async fn create_person(
    State(registry): State<Registry>,
    Json(input): Json<CreatePersonInput>,
) -> Result<Json<Person>, (StatusCode, String)> {
    let person = registry.save(&input.into()).map_err(error_response)?;
    tracing::debug!("Created person {}", person.full_name());
    Ok(Json(person))
}

pub async fn delete_person(
    State(registry): State<Registry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    registry.delete_by_id(id).map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Parents
// ============================================================

/// Add the person in the body as a parent of `child_id`.
///
/// The body is a full person representation; only its `id` is used to
/// identify the parent.
pub async fn add_parent(
    State(registry): State<Registry>,
    Path(child_id): Path<Uuid>,
    Json(parent): Json<Person>,
) -> Result<Json<Person>, (StatusCode, String)> {
    let child = registry.find(child_id).map_err(error_response)?;
    registry
        .add_parent(&child, &parent)
        .map(Json)
        .map_err(error_response)
}

pub async fn list_parents(
    State(registry): State<Registry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Person>>, (StatusCode, String)> {
    registry.parents_of(id).map(Json).map_err(error_response)
}

pub async fn list_children(
    State(registry): State<Registry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Person>>, (StatusCode, String)> {
    registry.children_of(id).map(Json).map_err(error_response)
}

pub async fn get_ancestry(
    State(registry): State<Registry>,
    Path(id): Path<Uuid>,
) -> Result<Json<AncestryNode>, (StatusCode, String)> {
    registry.ancestry(id).map(Json).map_err(error_response)
}
