use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::model::{Caller, Note};
use crate::services::NoteInput;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachNote {
    pub note_id: Uuid,
}

/// GET /api/pets/:pet_id/notes - public notes plus the caller's own
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
) -> ApiResult<Vec<Note>> {
    let notes = state.pets.notes(&caller, parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(notes))
}

/// PUT /api/pets/:pet_id/notes - attach an existing note by id
pub async fn attach(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
    payload: Result<Json<AttachNote>, JsonRejection>,
) -> ApiResult<Vec<Uuid>> {
    let pet_id = parse_id(&pet_id)?;
    let Json(body) = payload?;
    let note_ids = state.pets.add_note_ref(&caller, pet_id, body.note_id).await?;
    Ok(ApiResponse::success(note_ids))
}

/// POST /api/pets/:pet_id/notes - write a note as the caller and attach it
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult<Note> {
    let pet_id = parse_id(&pet_id)?;
    let Json(input) = payload?;
    let note = state.pets.create_note(&caller, pet_id, input).await?;
    Ok(ApiResponse::created(note))
}

/// DELETE /api/pets/:pet_id/notes/:note_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((pet_id, note_id)): Path<(String, String)>,
) -> ApiResult<Vec<Note>> {
    let pet_id = parse_id(&pet_id)?;
    let note_id = parse_id(&note_id)?;
    let remaining = state.pets.delete_note(&caller, pet_id, note_id).await?;
    Ok(ApiResponse::accepted(remaining))
}
