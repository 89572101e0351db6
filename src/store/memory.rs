use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PetStore, StoreError, StoreResult};
use crate::model::{project, Case, NewNote, Note, Pet, PetFields, PetPatch, Test, Treatment};

#[derive(Default)]
struct Collections {
    // Vec keeps list order stable for listings
    pets: Vec<Pet>,
    notes: HashMap<Uuid, Note>,
    cases: HashMap<Uuid, Case>,
    tests: HashMap<Uuid, Test>,
    treatments: HashMap<Uuid, Treatment>,
}

/// In-process store for tests and local development
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_case(&self, case: Case) {
        self.inner.write().await.cases.insert(case.id, case);
    }

    pub async fn insert_test(&self, test: Test) {
        self.inner.write().await.tests.insert(test.id, test);
    }

    pub async fn insert_treatment(&self, treatment: Treatment) {
        self.inner.write().await.treatments.insert(treatment.id, treatment);
    }

    pub async fn note_exists(&self, id: Uuid) -> bool {
        self.inner.read().await.notes.contains_key(&id)
    }

    pub async fn note_count(&self) -> usize {
        self.inner.read().await.notes.len()
    }
}

fn expand<T: Clone>(docs: &HashMap<Uuid, T>, ids: &[Uuid]) -> Vec<T> {
    ids.iter().filter_map(|id| docs.get(id).cloned()).collect()
}

#[async_trait]
impl PetStore for MemoryStore {
    async fn list_pets(&self) -> StoreResult<Vec<Pet>> {
        Ok(self.inner.read().await.pets.clone())
    }

    async fn find_pet(&self, id: Uuid) -> StoreResult<Option<Pet>> {
        let inner = self.inner.read().await;
        Ok(inner.pets.iter().find(|p| p.id == id).cloned())
    }

    async fn create_pet(&self, fields: PetFields) -> StoreResult<Pet> {
        let pet = Pet::new(Uuid::new_v4(), fields);
        self.inner.write().await.pets.push(pet.clone());
        Ok(pet)
    }

    async fn update_pet(&self, id: Uuid, patch: &PetPatch) -> StoreResult<Option<Pet>> {
        let mut inner = self.inner.write().await;
        Ok(inner.pets.iter_mut().find(|p| p.id == id).map(|pet| {
            pet.fields = project(patch, &pet.fields);
            pet.clone()
        }))
    }

    async fn delete_pet(&self, id: Uuid) -> StoreResult<Option<Pet>> {
        let mut inner = self.inner.write().await;
        let position = inner.pets.iter().position(|p| p.id == id);
        Ok(position.map(|index| inner.pets.remove(index)))
    }

    async fn save_pet(&self, pet: &Pet) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .pets
            .iter_mut()
            .find(|p| p.id == pet.id)
            .ok_or(StoreError::Missing { collection: "pets", id: pet.id })?;
        *slot = pet.clone();
        Ok(())
    }

    async fn create_note(&self, note: NewNote) -> StoreResult<Note> {
        let note = note.into_note(Uuid::new_v4());
        self.inner.write().await.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        self.inner.write().await.notes.remove(&id);
        Ok(())
    }

    async fn find_notes(&self, ids: &[Uuid]) -> StoreResult<Vec<Note>> {
        Ok(expand(&self.inner.read().await.notes, ids))
    }

    async fn find_cases(&self, ids: &[Uuid]) -> StoreResult<Vec<Case>> {
        Ok(expand(&self.inner.read().await.cases, ids))
    }

    async fn find_tests(&self, ids: &[Uuid]) -> StoreResult<Vec<Test>> {
        Ok(expand(&self.inner.read().await.tests, ids))
    }

    async fn find_treatments(&self, ids: &[Uuid]) -> StoreResult<Vec<Treatment>> {
        Ok(expand(&self.inner.read().await.treatments, ids))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[tokio::test]
    async fn expansion_follows_reference_order_and_skips_missing() {
        let store = MemoryStore::new();
        let a = Test { id: Uuid::new_v4(), details: Map::new() };
        let b = Test { id: Uuid::new_v4(), details: Map::new() };
        store.insert_test(a.clone()).await;
        store.insert_test(b.clone()).await;

        let ids = [b.id, Uuid::new_v4(), a.id, b.id];
        let found = store.find_tests(&ids).await.unwrap();
        let got: Vec<Uuid> = found.iter().map(|t| t.id).collect();
        assert_eq!(got, vec![b.id, a.id, b.id]);
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let created = store
            .create_pet(PetFields {
                name: Some("Rex".into()),
                species: Some("dog".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let patch: PetPatch = serde_json::from_value(json!({"breed": "beagle", "species": null})).unwrap();
        let updated = store.update_pet(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.fields.name.as_deref(), Some("Rex"));
        assert_eq!(updated.fields.breed.as_deref(), Some("beagle"));
        assert_eq!(updated.fields.species, None);

        assert!(store.update_pet(Uuid::new_v4(), &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_pet() {
        let store = MemoryStore::new();
        let pet = store.create_pet(PetFields::default()).await.unwrap();
        assert_eq!(store.delete_pet(pet.id).await.unwrap(), Some(pet.clone()));
        assert_eq!(store.delete_pet(pet.id).await.unwrap(), None);
        assert!(store.list_pets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_a_deleted_pet_fails() {
        let store = MemoryStore::new();
        let pet = store.create_pet(PetFields::default()).await.unwrap();
        store.delete_pet(pet.id).await.unwrap();
        assert!(matches!(
            store.save_pet(&pet).await,
            Err(StoreError::Missing { collection: "pets", .. })
        ));
    }
}
