// Pet resource handlers: /api/pets and its nested notes and record routes
pub mod notes;
pub mod pet;
pub mod record;

use uuid::Uuid;

use crate::error::ApiError;

// Re-export handler functions for use in routing
pub use pet::list as pet_list;
pub use pet::show as pet_show;
pub use pet::create as pet_create;
pub use pet::update as pet_update;
pub use pet::delete as pet_delete;

pub use notes::list as notes_list;
pub use notes::attach as notes_attach;
pub use notes::create as notes_create;
pub use notes::delete as notes_delete;

pub use record::add_case as record_add_case;
pub use record::cases as record_cases;
pub use record::vitals as record_vitals;
pub use record::tests as record_tests;
pub use record::treatments as record_treatments;

/// Ids in the path that are not UUIDs cannot name anything we store
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found())
}
