use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::model::{Caller, Case, Pet, Test, Treatment};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCase {
    // Older clients send the case id as `petId`
    #[serde(alias = "petId")]
    pub case_id: Uuid,
}

/// POST /api/pets/:pet_id/record - append a case, 409 if already present
pub async fn add_case(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
    payload: Result<Json<AddCase>, JsonRejection>,
) -> ApiResult<Pet> {
    let pet_id = parse_id(&pet_id)?;
    let Json(body) = payload?;
    let pet = state.pets.add_case(&caller, pet_id, body.case_id).await?;
    Ok(ApiResponse::success(pet))
}

/// GET /api/pets/:pet_id/record
pub async fn cases(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
) -> ApiResult<Vec<Case>> {
    let cases = state.pets.cases(&caller, parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(cases))
}

/// GET /api/pets/:pet_id/record/vitals
pub async fn vitals(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
) -> ApiResult<Vec<Value>> {
    let vitals = state.pets.vitals(&caller, parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(vitals))
}

/// GET /api/pets/:pet_id/record/tests
pub async fn tests(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
) -> ApiResult<Vec<Test>> {
    let tests = state.pets.tests(&caller, parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(tests))
}

/// GET /api/pets/:pet_id/record/treatments
pub async fn treatments(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(pet_id): Path<String>,
) -> ApiResult<Vec<Treatment>> {
    let treatments = state.pets.treatments(&caller, parse_id(&pet_id)?).await?;
    Ok(ApiResponse::success(treatments))
}
