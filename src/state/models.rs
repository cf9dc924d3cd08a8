//! Domain records exchanged with the form service

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identity of the person filling the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

impl User {
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_string(),
            email: "guest@example.com".to_string(),
        }
    }
}

/// How a question is answered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Document,
    /// Any other classification the service emits, kept verbatim
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Document => "document",
            Self::Other(other) => other,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "document" => Self::Document,
            _ => Self::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question detected on the scanned form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    pub fn is_document(&self) -> bool {
        self.field_type.is_document()
    }
}

/// A committed answer, keyed by question id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub field_type: FieldType,
}

/// A supporting document, keyed by its document-type label
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub extracted_text: String,
}

/// Question ids come back as JSON strings or numbers depending on the model
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_accepts_numbers() {
        let json = r#"{"id": 7, "question": "Full Name", "field_type": "text", "required": true}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, "7");
        assert!(q.required);
    }

    #[test]
    fn test_question_defaults() {
        let json = r#"{"id": "q1", "question": "Address"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.field_type, FieldType::Text);
        assert!(!q.required);
    }

    #[test]
    fn test_unknown_field_type_is_preserved() {
        let json = r#"{"id": "q1", "question": "Signature", "field_type": "signature"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.field_type, FieldType::Other("signature".to_string()));
        let back = serde_json::to_value(&q).unwrap();
        assert_eq!(back["field_type"], "signature");
    }

    #[test]
    fn test_document_field_type() {
        let q: Question =
            serde_json::from_str(r#"{"id": "3", "question": "Photo ID", "field_type": "document"}"#)
                .unwrap();
        assert!(q.is_document());
    }

    #[test]
    fn test_guest_identity() {
        let guest = User::guest();
        assert_eq!(guest.name, "Guest");
        assert_eq!(guest.email, "guest@example.com");
    }
}
