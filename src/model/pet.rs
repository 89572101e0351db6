use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Explicit presence of a single field in an update body.
///
/// A missing key is `Absent`, `null` is `Clear`, anything else is `Set`.
/// Used with `#[serde(default)]` so that missing keys fall back to `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T: Clone> Patch<T> {
    /// Resolve against the current value of the field
    pub fn resolve(&self, base: &Option<T>) -> Option<T> {
        match self {
            Patch::Absent => base.clone(),
            Patch::Clear => None,
            Patch::Set(value) => Some(value.clone()),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Patch::Clear)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

/// Accepts a plain date (`2020-01-01`) or an RFC 3339 datetime, which is
/// truncated to its UTC date.
fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn patch_birthdate<'de, D>(deserializer: D) -> Result<Patch<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Patch::Clear),
        Some(raw) => parse_birthdate(&raw)
            .map(Patch::Set)
            .ok_or_else(|| de::Error::custom(format!("invalid birthdate: {}", raw))),
    }
}

/// The fixed, user-editable fields of a pet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "alergies", skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
}

/// Pet document. `notes` and `record` hold references only; they are
/// expanded on demand through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: PetFields,
    #[serde(default)]
    pub notes: Vec<Uuid>,
    #[serde(default)]
    pub record: Vec<Uuid>,
}

impl Pet {
    pub fn new(id: Uuid, fields: PetFields) -> Self {
        Self {
            id,
            fields,
            notes: Vec::new(),
            record: Vec::new(),
        }
    }
}

/// Request body for create and update.
///
/// `notes` and `record` are accepted only so that an update can detect and
/// reject them; they never reach the store through this type.
/// `birthdate` may be sent as a date or a full datetime; only the date is kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PetPatch {
    pub name: Patch<String>,
    #[serde(deserialize_with = "patch_birthdate")]
    pub birthdate: Patch<NaiveDate>,
    pub species: Patch<String>,
    pub breed: Patch<String>,
    pub genre: Patch<String>,
    pub alive: Patch<bool>,
    pub description: Patch<String>,
    #[serde(alias = "alergies")]
    pub allergies: Patch<Vec<String>>,
    pub notes: Patch<Value>,
    pub record: Patch<Value>,
}

impl PetPatch {
    /// True when the body tries to write relations directly
    pub fn touches_relations(&self) -> bool {
        self.notes.is_set() || self.record.is_set()
    }

    /// Keys the update explicitly clears
    pub fn cleared_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("name", self.name.is_clear()),
            ("birthdate", self.birthdate.is_clear()),
            ("species", self.species.is_clear()),
            ("breed", self.breed.is_clear()),
            ("genre", self.genre.is_clear()),
            ("alive", self.alive.is_clear()),
            ("description", self.description.is_clear()),
            ("allergies", self.allergies.is_clear()),
        ];
        flags
            .into_iter()
            .filter_map(|(key, cleared)| cleared.then_some(key))
            .collect()
    }

    /// Values the update explicitly sets, keyed like the stored document
    pub fn set_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(project(self, &PetFields::default())) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Projection used by both create and update: every fixed field comes from
/// the input when present and from `base` otherwise.
pub fn project(input: &PetPatch, base: &PetFields) -> PetFields {
    PetFields {
        name: input.name.resolve(&base.name),
        birthdate: input.birthdate.resolve(&base.birthdate),
        species: input.species.resolve(&base.species),
        breed: input.breed.resolve(&base.breed),
        genre: input.genre.resolve(&base.genre),
        alive: input.alive.resolve(&base.alive),
        description: input.description.resolve(&base.description),
        allergies: input.allergies.resolve(&base.allergies),
    }
}
