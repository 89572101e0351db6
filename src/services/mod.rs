pub mod pet_service;

pub use pet_service::{NoteInput, PetError, PetResult, PetService};
