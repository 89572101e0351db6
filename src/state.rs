use std::sync::Arc;

use crate::services::PetService;
use crate::store::PetStore;

/// Shared handler state. The store is injected here instead of living in a
/// global so tests and binaries can choose their own.
#[derive(Clone)]
pub struct AppState {
    pub pets: PetService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn PetStore>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            pets: PetService::new(store),
            jwt_secret: jwt_secret.into(),
        }
    }
}
