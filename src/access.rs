// Ownership and visibility rules for a pet's nested resources.
//
// Every rule here is a plain predicate over the caller and the loaded
// documents; the service layer decides what status a `false` turns into.
use uuid::Uuid;

use crate::model::{Caller, Note, Role};

/// The gate: users may only reach nested resources of pets they own.
/// Any other role passes unconditionally.
pub fn can_access_pet(caller: &Caller, pet_id: Uuid) -> bool {
    caller.role != Role::User || caller.owns(pet_id)
}

pub fn can_see_note(caller: &Caller, note: &Note) -> bool {
    note.public || note.author == caller.id
}

pub fn can_delete_note(caller: &Caller, note: &Note) -> bool {
    caller.is_admin() || note.author == caller.id
}

/// Notes the caller may read, in their original order
pub fn visible_notes(caller: &Caller, notes: Vec<Note>) -> Vec<Note> {
    notes
        .into_iter()
        .filter(|note| can_see_note(caller, note))
        .collect()
}

/// Notes written by the caller, public or not.
///
/// Only the delete-note response uses this. It intentionally differs from
/// `visible_notes`: public notes by other authors are left out.
pub fn notes_authored_by(caller: &Caller, notes: Vec<Note>) -> Vec<Note> {
    notes
        .into_iter()
        .filter(|note| note.author == caller.id)
        .collect()
}
