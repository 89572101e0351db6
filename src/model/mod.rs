pub mod caller;
pub mod note;
pub mod pet;
pub mod record;

use uuid::Uuid;

pub use caller::{Caller, Role};
pub use note::{NewNote, Note};
pub use pet::{project, Patch, Pet, PetFields, PetPatch};
pub use record::{Case, Test, Treatment};

/// Documents this crate writes, keyed by a UUID
pub trait Identified {
    fn id(&self) -> Uuid;
}

impl Identified for Note {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identified for Pet {
    fn id(&self) -> Uuid {
        self.id
    }
}
