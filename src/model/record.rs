// Medical record documents. Cases, tests and treatments are written by other
// services; this crate only reads and references them.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One entry of a pet's medical record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    #[serde(rename = "vitalSigns", default, skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<Value>,
    #[serde(default)]
    pub tests: Vec<Uuid>,
    #[serde(default)]
    pub treatments: Vec<Uuid>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Case {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            vital_signs: None,
            tests: Vec::new(),
            treatments: Vec::new(),
            details: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn case_keeps_unknown_attributes() {
        let id = Uuid::new_v4();
        let case: Case = serde_json::from_value(json!({
            "id": id,
            "vitalSigns": {"temperature": 38.5},
            "reason": "limping",
        }))
        .unwrap();
        assert_eq!(case.vital_signs, Some(json!({"temperature": 38.5})));
        assert!(case.tests.is_empty());
        assert_eq!(case.details["reason"], "limping");

        let back = serde_json::to_value(&case).unwrap();
        assert_eq!(back["vitalSigns"]["temperature"], 38.5);
        assert_eq!(back["reason"], "limping");
    }

    #[test]
    fn null_vitals_are_missing() {
        let case: Case = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "vitalSigns": null,
        }))
        .unwrap();
        assert_eq!(case.vital_signs, None);
    }
}
