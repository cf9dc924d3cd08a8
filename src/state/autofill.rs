//! Auto-fill of answers from data extracted out of an ID document
//!
//! Matching is a keyword heuristic over the question text, expressed as an
//! ordered rule table so that it can be tested without any UI.

use super::models::Question;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fields the service can extract from an ID document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedId {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
}

impl ExtractedId {
    /// Non-blank value for a field
    pub fn get(&self, field: IdField) -> Option<&str> {
        let value = match field {
            IdField::Name => &self.name,
            IdField::Dob => &self.dob,
            IdField::Address => &self.address,
            IdField::Phone => &self.phone,
            IdField::Email => &self.email,
            IdField::Gender => &self.gender,
            IdField::IdNumber => &self.id_number,
            IdField::FatherName => &self.father_name,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    Name,
    Dob,
    Address,
    Phone,
    Email,
    Gender,
    IdNumber,
    FatherName,
}

/// One row of the matching table
#[derive(Debug)]
pub struct FieldRule {
    pub field: IdField,
    /// The rule applies when the question contains any of these
    pub keywords: &'static [&'static str],
    /// ...unless it also contains any of these
    pub excludes: &'static [&'static str],
}

impl FieldRule {
    fn applies_to(&self, lowered: &str) -> bool {
        !self.excludes.iter().any(|e| lowered.contains(e))
            && self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Priority-ordered rules. Earlier rows win.
pub const RULES: &[FieldRule] = &[
    FieldRule {
        field: IdField::Name,
        keywords: &["name"],
        excludes: &["father"],
    },
    FieldRule {
        field: IdField::Dob,
        keywords: &["birth", "dob", "date of birth"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::Address,
        keywords: &["address"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::Phone,
        keywords: &["phone", "mobile", "contact"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::Email,
        keywords: &["email"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::Gender,
        keywords: &["gender", "sex"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::IdNumber,
        keywords: &["aadhaar", "aadhar", "id number"],
        excludes: &[],
    },
    FieldRule {
        field: IdField::FatherName,
        keywords: &["father"],
        excludes: &[],
    },
];

/// Find the extracted value that answers a question, if any
pub fn match_question<'a>(question_text: &str, extracted: &'a ExtractedId) -> Option<&'a str> {
    let lowered = question_text.to_lowercase();
    RULES
        .iter()
        .filter(|rule| rule.applies_to(&lowered))
        .find_map(|rule| extracted.get(rule.field))
}

/// Result of running the matcher over a question list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoFillOutcome {
    pub answers: HashMap<String, String>,
    /// Ids filled by this run
    pub filled: BTreeSet<String>,
}

/// Run the matcher over every question, overlaying matches onto `answers`
pub fn auto_fill(
    questions: &[Question],
    extracted: &ExtractedId,
    answers: &HashMap<String, String>,
) -> AutoFillOutcome {
    let mut outcome = AutoFillOutcome {
        answers: answers.clone(),
        filled: BTreeSet::new(),
    };

    for question in questions {
        if let Some(value) = match_question(&question.question, extracted) {
            outcome
                .answers
                .insert(question.id.clone(), value.to_string());
            outcome.filled.insert(question.id.clone());
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::models::FieldType;
    use pretty_assertions::assert_eq;

    fn question(id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            question: text.to_string(),
            field_type: FieldType::Text,
            required: false,
        }
    }

    fn ravi() -> ExtractedId {
        ExtractedId {
            name: Some("Ravi Kumar".to_string()),
            phone: Some("9999999999".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_father_name_without_extracted_father() {
        assert_eq!(match_question("Father's Name", &ravi()), None);
    }

    #[test]
    fn test_father_name_prefers_father_field() {
        let extracted = ExtractedId {
            name: Some("Ravi Kumar".to_string()),
            father_name: Some("Suresh Kumar".to_string()),
            ..Default::default()
        };
        assert_eq!(
            match_question("Father's Name", &extracted),
            Some("Suresh Kumar")
        );
        assert_eq!(match_question("FATHER NAME", &extracted), Some("Suresh Kumar"));
    }

    #[test]
    fn test_scenario_mapping() {
        let extracted = ravi();
        assert_eq!(match_question("Your Name", &extracted), Some("Ravi Kumar"));
        assert_eq!(match_question("Phone Number", &extracted), Some("9999999999"));
    }

    #[test]
    fn test_keyword_variants() {
        let extracted = ExtractedId {
            dob: Some("01/01/1990".to_string()),
            address: Some("12 MG Road".to_string()),
            phone: Some("98765".to_string()),
            email: Some("a@b.in".to_string()),
            gender: Some("Female".to_string()),
            id_number: Some("1234 5678 9012".to_string()),
            ..Default::default()
        };
        assert_eq!(match_question("DOB", &extracted), Some("01/01/1990"));
        assert_eq!(match_question("Date of Birth", &extracted), Some("01/01/1990"));
        assert_eq!(match_question("Permanent Address", &extracted), Some("12 MG Road"));
        assert_eq!(match_question("Mobile", &extracted), Some("98765"));
        assert_eq!(match_question("Contact No.", &extracted), Some("98765"));
        assert_eq!(match_question("E-mail / Email ID", &extracted), Some("a@b.in"));
        assert_eq!(match_question("Sex", &extracted), Some("Female"));
        assert_eq!(match_question("Aadhar No", &extracted), Some("1234 5678 9012"));
        assert_eq!(match_question("ID Number", &extracted), Some("1234 5678 9012"));
        assert_eq!(match_question("Occupation", &extracted), None);
    }

    #[test]
    fn test_empty_value_falls_through_to_later_rule() {
        // "Name and contact" hits the name rule first, but name is blank
        let extracted = ExtractedId {
            name: Some("   ".to_string()),
            phone: Some("12345".to_string()),
            ..Default::default()
        };
        assert_eq!(match_question("Name and contact", &extracted), Some("12345"));
    }

    #[test]
    fn test_auto_fill_scenario() {
        let questions = vec![
            question("1", "Father's Name"),
            question("2", "Your Name"),
            question("3", "Phone Number"),
        ];
        let outcome = auto_fill(&questions, &ravi(), &HashMap::new());

        assert_eq!(outcome.answers.get("1"), None);
        assert_eq!(outcome.answers["2"], "Ravi Kumar");
        assert_eq!(outcome.answers["3"], "9999999999");
        assert_eq!(
            outcome.filled,
            ["2", "3"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>()
        );
    }

    #[test]
    fn test_auto_fill_keeps_unmatched_answers() {
        let questions = vec![question("1", "Occupation"), question("2", "Name")];
        let mut answers = HashMap::new();
        answers.insert("1".to_string(), "Farmer".to_string());
        answers.insert("2".to_string(), "typed".to_string());

        let outcome = auto_fill(&questions, &ravi(), &answers);
        assert_eq!(outcome.answers["1"], "Farmer");
        assert_eq!(outcome.answers["2"], "Ravi Kumar");
    }

    #[test]
    fn test_auto_fill_is_idempotent() {
        let questions = vec![
            question("1", "Father's Name"),
            question("2", "Your Name"),
            question("3", "Phone Number"),
        ];
        let first = auto_fill(&questions, &ravi(), &HashMap::new());
        let second = auto_fill(&questions, &ravi(), &first.answers);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extracted_id_tolerates_nulls() {
        let json = r#"{"name": "Asha", "dob": null, "document_type": "aadhaar"}"#;
        let extracted: ExtractedId = serde_json::from_str(json).unwrap();
        assert_eq!(extracted.get(IdField::Name), Some("Asha"));
        assert_eq!(extracted.get(IdField::Dob), None);
    }
}
