use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::access;
use crate::model::{project, Caller, Case, NewNote, Note, Pet, PetFields, PetPatch, Test, Treatment};
use crate::store::{PetStore, StoreError};

#[derive(Debug, Error)]
pub enum PetError {
    #[error("pet {0} not found")]
    PetNotFound(Uuid),
    #[error("note {note} not found on pet {pet}")]
    NoteNotFound { pet: Uuid, note: Uuid },
    #[error("caller {caller} may not access pet {pet}")]
    Forbidden { caller: Uuid, pet: Uuid },
    #[error("update may not write notes or record directly")]
    RelationsInUpdate,
    #[error("case {case} already in record of pet {pet}")]
    DuplicateCase { pet: Uuid, case: Uuid },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PetResult<T> = Result<T, PetError>;

/// Body of the create-note operation
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    /// Defaults to the time of the request
    pub date: Option<DateTime<Utc>>,
    pub text: String,
    #[serde(default)]
    pub public: bool,
}

/// Pet operations over an injected store
#[derive(Clone)]
pub struct PetService {
    store: Arc<dyn PetStore>,
}

impl PetService {
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }

    pub async fn health(&self) -> PetResult<()> {
        Ok(self.store.health_check().await?)
    }

    pub async fn list_pets(&self) -> PetResult<Vec<Pet>> {
        Ok(self.store.list_pets().await?)
    }

    pub async fn get_pet(&self, pet_id: Uuid) -> PetResult<Pet> {
        self.load_pet(pet_id).await
    }

    pub async fn create_pet(&self, input: &PetPatch) -> PetResult<Pet> {
        let fields = project(input, &PetFields::default());
        Ok(self.store.create_pet(fields).await?)
    }

    pub async fn update_pet(&self, pet_id: Uuid, input: &PetPatch) -> PetResult<Pet> {
        if input.touches_relations() {
            return Err(PetError::RelationsInUpdate);
        }

        self.store
            .update_pet(pet_id, input)
            .await?
            .ok_or(PetError::PetNotFound(pet_id))
    }

    pub async fn delete_pet(&self, pet_id: Uuid) -> PetResult<Pet> {
        self.store
            .delete_pet(pet_id)
            .await?
            .ok_or(PetError::PetNotFound(pet_id))
    }

    /// Notes the caller may read, in pet order
    pub async fn notes(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Vec<Note>> {
        let pet = self.load_accessible(caller, pet_id).await?;
        let notes = self.store.find_notes(&pet.notes).await?;
        Ok(access::visible_notes(caller, notes))
    }

    /// Attach an already existing note; returns every note id on the pet
    pub async fn add_note_ref(&self, caller: &Caller, pet_id: Uuid, note_id: Uuid) -> PetResult<Vec<Uuid>> {
        let mut pet = self.load_accessible(caller, pet_id).await?;
        pet.notes.push(note_id);
        self.store.save_pet(&pet).await?;
        Ok(pet.notes)
    }

    /// Persist a new note authored by the caller and attach it.
    ///
    /// The note is written first. If attaching it to the pet fails the note
    /// is deleted again so no orphan is left behind.
    pub async fn create_note(&self, caller: &Caller, pet_id: Uuid, input: NoteInput) -> PetResult<Note> {
        let mut pet = self.load_accessible(caller, pet_id).await?;

        let note = self
            .store
            .create_note(NewNote {
                author: caller.id,
                public: input.public,
                text: input.text,
                date: input.date.unwrap_or_else(Utc::now),
            })
            .await?;

        pet.notes.push(note.id);
        if let Err(save_err) = self.store.save_pet(&pet).await {
            warn!("Attaching note {} to pet {} failed, removing note", note.id, pet_id);
            if let Err(cleanup_err) = self.store.delete_note(note.id).await {
                error!("Orphaned note {} could not be removed: {}", note.id, cleanup_err);
            }
            return Err(save_err.into());
        }

        Ok(note)
    }

    /// Remove a note from the pet. Returns the remaining notes written by
    /// the caller (public notes of other authors are not included).
    pub async fn delete_note(&self, caller: &Caller, pet_id: Uuid, note_id: Uuid) -> PetResult<Vec<Note>> {
        let mut pet = self.load_pet(pet_id).await?;
        let mut notes = self.store.find_notes(&pet.notes).await?;

        let position = notes
            .iter()
            .position(|note| note.id == note_id)
            .ok_or(PetError::NoteNotFound { pet: pet_id, note: note_id })?;

        if !access::can_delete_note(caller, &notes[position]) {
            warn!("Caller {} denied deleting note {} on pet {}", caller.id, note_id, pet_id);
            return Err(PetError::Forbidden { caller: caller.id, pet: pet_id });
        }

        self.store.delete_note(note_id).await?;
        // the same id may be attached more than once
        notes.retain(|note| note.id != note_id);
        pet.notes.retain(|id| *id != note_id);
        self.store.save_pet(&pet).await?;

        Ok(access::notes_authored_by(caller, notes))
    }

    pub async fn add_case(&self, caller: &Caller, pet_id: Uuid, case_id: Uuid) -> PetResult<Pet> {
        let mut pet = self.load_accessible(caller, pet_id).await?;

        if pet.record.contains(&case_id) {
            return Err(PetError::DuplicateCase { pet: pet_id, case: case_id });
        }

        pet.record.push(case_id);
        self.store.save_pet(&pet).await?;
        Ok(pet)
    }

    pub async fn cases(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Vec<Case>> {
        let pet = self.load_accessible(caller, pet_id).await?;
        Ok(self.store.find_cases(&pet.record).await?)
    }

    /// Vital signs of every case that recorded some, in record order
    pub async fn vitals(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Vec<Value>> {
        let cases = self.cases(caller, pet_id).await?;
        Ok(cases.into_iter().filter_map(|case| case.vital_signs).collect())
    }

    /// All tests across the record: record order, then per-case order
    pub async fn tests(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Vec<Test>> {
        let cases = self.cases(caller, pet_id).await?;
        let ids: Vec<Uuid> = cases.iter().flat_map(|case| case.tests.iter().copied()).collect();
        Ok(self.store.find_tests(&ids).await?)
    }

    pub async fn treatments(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Vec<Treatment>> {
        let cases = self.cases(caller, pet_id).await?;
        let ids: Vec<Uuid> = cases.iter().flat_map(|case| case.treatments.iter().copied()).collect();
        Ok(self.store.find_treatments(&ids).await?)
    }

    async fn load_pet(&self, pet_id: Uuid) -> PetResult<Pet> {
        self.store
            .find_pet(pet_id)
            .await?
            .ok_or(PetError::PetNotFound(pet_id))
    }

    /// Load the pet and apply the ownership gate
    async fn load_accessible(&self, caller: &Caller, pet_id: Uuid) -> PetResult<Pet> {
        let pet = self.load_pet(pet_id).await?;

        if !access::can_access_pet(caller, pet.id) {
            warn!("Caller {} ({}) denied access to pet {}", caller.id, caller.role, pet.id);
            return Err(PetError::Forbidden { caller: caller.id, pet: pet.id });
        }

        debug!("Caller {} granted access to pet {}", caller.id, pet.id);
        Ok(pet)
    }
}
