use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{pets, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(pet_routes(state.clone()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(cors_layer(config)),
        );

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn pet_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/pets", get(pets::pet_list).post(pets::pet_create))
        .route(
            "/api/pets/:pet_id",
            get(pets::pet_show)
                .put(pets::pet_update)
                .delete(pets::pet_delete),
        )
        .route(
            "/api/pets/:pet_id/notes",
            get(pets::notes_list)
                .put(pets::notes_attach)
                .post(pets::notes_create),
        )
        .route("/api/pets/:pet_id/notes/:note_id", delete(pets::notes_delete))
        .route(
            "/api/pets/:pet_id/record",
            get(pets::record_cases).post(pets::record_add_case),
        )
        .route("/api/pets/:pet_id/record/vitals", get(pets::record_vitals))
        .route("/api/pets/:pet_id/record/tests", get(pets::record_tests))
        .route("/api/pets/:pet_id/record/treatments", get(pets::record_treatments))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new().allow_origin(origins)
}
