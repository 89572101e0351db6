use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use tracing::info;

use super::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::model::{Pet, PetPatch};
use crate::state::AppState;

/// GET /api/pets - every pet, unfiltered
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Pet>> {
    let pets = state.pets.list_pets().await?;
    Ok(ApiResponse::success(pets))
}

/// GET /api/pets/:pet_id
pub async fn show(State(state): State<AppState>, Path(pet_id): Path<String>) -> ApiResult<Pet> {
    let pet = state.pets.get_pet(parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(pet))
}

/// POST /api/pets - omitted fields stay absent on the new pet
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<PetPatch>, JsonRejection>,
) -> ApiResult<Pet> {
    let Json(input) = payload?;
    let pet = state.pets.create_pet(&input).await?;
    info!("Created pet {}", pet.id);
    Ok(ApiResponse::created(pet))
}

/// PUT /api/pets/:pet_id - partial update.
///
/// Missing keys are left alone and `null` clears a field. Bodies carrying
/// `notes` or `record` are refused with 409.
pub async fn update(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    payload: Result<Json<PetPatch>, JsonRejection>,
) -> ApiResult<Pet> {
    let pet_id = parse_id(&pet_id)?;
    let Json(input) = payload?;
    let pet = state.pets.update_pet(pet_id, &input).await?;
    Ok(ApiResponse::success(pet))
}

/// DELETE /api/pets/:pet_id - responds 202 with the removed document
pub async fn delete(State(state): State<AppState>, Path(pet_id): Path<String>) -> ApiResult<Pet> {
    let pet = state.pets.delete_pet(parse_id(&pet_id)?).await?;
    info!("Deleted pet {}", pet.id);
    Ok(ApiResponse::accepted(pet))
}
