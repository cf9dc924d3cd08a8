//! Results and requests exchanged with the form service

use crate::state::{Answer, Document, Question, WorkflowState};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Could not reach the form service: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered `success: false`
    #[error("{0}")]
    Rejected(String),
    #[error("Form service returned {status}: {detail}")]
    Status { status: u16, detail: String },
}

/// Questions detected on a scanned form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedForm {
    pub extracted_text: String,
    pub questions: Vec<Question>,
}

/// Verdict on a single answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub suggestion: Option<String>,
}

impl Validation {
    /// Only an invalid verdict that comes with advice stops the user
    pub fn blocking_suggestion(&self) -> Option<&str> {
        if self.is_valid {
            return None;
        }
        self.suggestion
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Body of `POST /generate-filled-form`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledFormRequest {
    pub answers: HashMap<String, Answer>,
    pub documents: BTreeMap<String, Document>,
    /// `{}` when nobody logged in
    pub user_profile: serde_json::Value,
}

impl FilledFormRequest {
    pub fn from_state(state: &WorkflowState) -> Self {
        let user_profile = match &state.user {
            Some(user) => serde_json::json!({ "name": user.name, "email": user.email }),
            None => serde_json::json!({}),
        };
        Self {
            answers: state.answers.clone(),
            documents: state.documents.clone(),
            user_profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldType, User};

    #[test]
    fn test_request_without_user_sends_empty_profile() {
        let request = FilledFormRequest::from_state(&WorkflowState::default());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_profile"], serde_json::json!({}));
        assert_eq!(json["answers"], serde_json::json!({}));
        assert_eq!(json["documents"], serde_json::json!({}));
    }

    #[test]
    fn test_request_wire_shape() {
        let mut state = WorkflowState {
            user: Some(User::guest()),
            ..Default::default()
        };
        state.answers.insert(
            "1".to_string(),
            Answer {
                question: "Full Name".to_string(),
                answer: "Asha Devi".to_string(),
                field_type: FieldType::Text,
            },
        );
        state.documents.insert(
            "Aadhaar Card".to_string(),
            Document {
                filename: "aadhaar.jpg".to_string(),
                extracted_text: "1234".to_string(),
            },
        );

        let json = serde_json::to_value(FilledFormRequest::from_state(&state)).unwrap();
        assert_eq!(json["answers"]["1"]["answer"], "Asha Devi");
        assert_eq!(json["answers"]["1"]["field_type"], "text");
        assert_eq!(json["documents"]["Aadhaar Card"]["filename"], "aadhaar.jpg");
        assert_eq!(json["user_profile"]["email"], "guest@example.com");
    }

    #[test]
    fn test_blocking_suggestion() {
        let valid = Validation {
            is_valid: true,
            suggestion: Some("fine".to_string()),
        };
        assert_eq!(valid.blocking_suggestion(), None);

        let silent = Validation {
            is_valid: false,
            suggestion: Some("  ".to_string()),
        };
        assert_eq!(silent.blocking_suggestion(), None);

        let advice = Validation {
            is_valid: false,
            suggestion: Some("Enter a 10 digit number".to_string()),
        };
        assert_eq!(advice.blocking_suggestion(), Some("Enter a 10 digit number"));
    }
}
