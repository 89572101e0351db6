use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub author: Uuid,
    #[serde(default)]
    pub public: bool,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// A note that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub author: Uuid,
    pub public: bool,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl NewNote {
    pub fn into_note(self, id: Uuid) -> Note {
        Note {
            id,
            author: self.author,
            public: self.public,
            text: self.text,
            date: self.date,
        }
    }
}
