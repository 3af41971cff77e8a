//! Domain models shared by the reconciler, sweeper and queue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stable external case key
///
/// Vejman sends ids as JSON numbers on some endpoints and strings on others.
/// Both decode to the same textual key for the mapping table, while the
/// original JSON value is kept for the queue payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseId {
    key: String,
    raw: serde_json::Value,
}

impl CaseId {
    /// Textual key used as the mapping row id
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl From<&str> for CaseId {
    fn from(value: &str) -> Self {
        CaseId {
            key: value.to_string(),
            raw: serde_json::Value::String(value.to_string()),
        }
    }
}

impl From<i64> for CaseId {
    fn from(value: i64) -> Self {
        CaseId {
            key: value.to_string(),
            raw: serde_json::Value::from(value),
        }
    }
}

impl Serialize for CaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(CaseId::from(s.as_str())),
            serde_json::Value::Number(n) => Ok(CaseId {
                key: n.to_string(),
                raw: serde_json::Value::Number(n),
            }),
            other => Err(serde::de::Error::custom(format!(
                "case_id must be a string or number, got {}",
                other
            ))),
        }
    }
}

/// External permit case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: CaseId,
    pub case_number: String,
    #[serde(default)]
    pub street_name: Option<String>,
}

/// Response envelope of the case endpoint
#[derive(Debug, Default, Deserialize)]
pub struct CaseList {
    #[serde(default)]
    pub cases: Vec<Case>,
}

/// Row of the `VejmanTilladelser` mapping table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FolderMapping {
    #[sqlx(rename = "ID")]
    pub case_id: String,
    #[sqlx(rename = "CaseNumber")]
    pub case_number: String,
    #[sqlx(rename = "SharePointFolder")]
    pub sharepoint_folder: String,
    #[sqlx(rename = "LastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Work item handed to the performer process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueElement {
    pub case_id: CaseId,
    pub case_number: String,
    pub sharepoint_folder: String,
}

impl QueueElement {
    /// Queue reference, the human readable case number
    pub fn reference(&self) -> &str {
        &self.case_number
    }

    /// JSON body; non-ASCII characters are kept as-is
    pub fn payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_from_number_or_string() {
        let list: CaseList = serde_json::from_str(
            r#"{"cases": [
                {"case_id": 1042, "case_number": "2024-001", "street_name": "Vestergade"},
                {"case_id": "X-7", "case_number": "2024-002", "street_name": null},
                {"case_id": 9, "case_number": "2024-003"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.cases.len(), 3);
        assert_eq!(list.cases[0].case_id.as_str(), "1042");
        assert_eq!(list.cases[1].case_id.as_str(), "X-7");
        assert_eq!(list.cases[1].street_name, None);
        assert_eq!(list.cases[2].street_name, None);
    }

    #[test]
    fn test_case_id_keeps_json_type_in_payload() {
        let case: Case = serde_json::from_str(
            r#"{"case_id": 1042, "case_number": "2024-1", "street_name": "Vestergade"}"#,
        )
        .unwrap();
        let element = QueueElement {
            case_id: case.case_id.clone(),
            case_number: case.case_number.clone(),
            sharepoint_folder: "Top/Vestergade_2024-1".to_string(),
        };
        let body: serde_json::Value = serde_json::from_str(&element.payload().unwrap()).unwrap();
        assert_eq!(body["case_id"], serde_json::json!(1042));
        assert_eq!(case.case_id.as_str(), "1042");

        let text: Case =
            serde_json::from_str(r#"{"case_id": "1042", "case_number": "2024-1"}"#).unwrap();
        assert_eq!(serde_json::to_string(&text.case_id).unwrap(), r#""1042""#);
        assert_eq!(text.case_id.as_str(), case.case_id.as_str());
    }

    #[test]
    fn test_case_id_rejects_objects() {
        let result: Result<Case, _> =
            serde_json::from_str(r#"{"case_id": {"a": 1}, "case_number": "1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_cases_key_is_empty() {
        let list: CaseList = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(list.cases.is_empty());
    }

    #[test]
    fn test_queue_payload_keeps_key_order_and_unicode() {
        let element = QueueElement {
            case_id: CaseId::from(77_i64),
            case_number: "2024-0815".to_string(),
            sharepoint_folder: "Delte dokumenter/TestTilladelser/Åboulevarden_2024-0815"
                .to_string(),
        };
        assert_eq!(element.reference(), "2024-0815");
        assert_eq!(
            element.payload().unwrap(),
            r#"{"case_id":77,"case_number":"2024-0815","sharepoint_folder":"Delte dokumenter/TestTilladelser/Åboulevarden_2024-0815"}"#
        );
    }
}
