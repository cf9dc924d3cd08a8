//! Screen-local UI state
//!
//! Each wizard step has a matching screen struct holding what is only
//! relevant while that screen is shown (cursor, inline messages, prompts).
//! The workflow data itself lives in the wizard.

use super::forms::{FormField, LoginForm};
use super::models::Question;
use super::wizard::{AnswerDrafts, WorkflowState};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UploadScreen {
    pub file: FormField,
    pub error: Option<String>,
}

impl Default for UploadScreen {
    fn default() -> Self {
        Self {
            file: FormField::path("file", "Form image"),
            error: None,
        }
    }
}

/// Validation verdict the user has been shown for one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub question_id: String,
    /// The answer the verdict was given for
    pub answer: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerScreen {
    /// Index of the question being answered
    pub index: usize,
    pub drafts: AnswerDrafts,
    /// Open ID-document prompt for auto-fill
    pub id_prompt: Option<FormField>,
    pub suggestion: Option<Suggestion>,
    /// Inline message (missing answers, voice hints)
    pub notice: Option<String>,
}

impl AnswerScreen {
    /// Fresh screen seeded from committed answers. The ID prompt is offered
    /// when nothing has been answered yet.
    pub fn open(state: &WorkflowState) -> Self {
        let drafts = AnswerDrafts::from_state(state);
        let untouched = state.questions.iter().all(|q| !drafts.is_answered(&q.id));
        Self {
            index: 0,
            drafts,
            id_prompt: untouched.then(Self::new_id_prompt),
            suggestion: None,
            notice: None,
        }
    }

    pub fn new_id_prompt() -> FormField {
        FormField::path("id_document", "ID card image (Aadhaar, PAN, Voter ID...)")
    }

    pub fn current<'a>(&self, questions: &'a [Question]) -> Option<&'a Question> {
        questions.get(self.index)
    }

    pub fn is_last(&self, total: usize) -> bool {
        self.index + 1 >= total
    }

    /// Move to the next question; false when already on the last one
    pub fn next(&mut self, total: usize) -> bool {
        if self.index + 1 < total {
            self.index += 1;
            self.suggestion = None;
            self.notice = None;
            true
        } else {
            false
        }
    }

    /// Move to the previous question; false when already on the first one
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            self.suggestion = None;
            self.notice = None;
            true
        } else {
            false
        }
    }

    /// True when the user already saw a suggestion for exactly this answer
    pub fn suggestion_dismissed_for(&self, question_id: &str, answer: &str) -> bool {
        self.suggestion
            .as_ref()
            .is_some_and(|s| s.question_id == question_id && s.answer == answer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentScreen {
    /// Selected row in the document question list
    pub selected: usize,
    /// Path prompt for the selected document type
    pub file: Option<FormField>,
    pub error: Option<String>,
}

impl DocumentScreen {
    pub fn move_down(&mut self, total: usize) {
        if total > 0 && self.selected < total - 1 {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewScreen {
    /// Where the generated PDF was written
    pub saved_to: Option<PathBuf>,
}

/// All screen-local state, one per step
#[derive(Debug, Clone, Default)]
pub struct Screens {
    pub login: LoginForm,
    pub upload: UploadScreen,
    pub answers: AnswerScreen,
    pub documents: DocumentScreen,
    pub review: ReviewScreen,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::models::{Answer, FieldType};

    fn state_with(questions: &[(&str, &str)]) -> WorkflowState {
        WorkflowState {
            questions: questions
                .iter()
                .map(|(id, text)| Question {
                    id: id.to_string(),
                    question: text.to_string(),
                    field_type: FieldType::Text,
                    required: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_offers_id_prompt_when_untouched() {
        let state = state_with(&[("1", "Name"), ("2", "Phone")]);
        let screen = AnswerScreen::open(&state);
        assert!(screen.id_prompt.is_some());
        assert_eq!(screen.index, 0);
    }

    #[test]
    fn test_open_skips_prompt_when_answers_exist() {
        let mut state = state_with(&[("1", "Name")]);
        state.answers.insert(
            "1".to_string(),
            Answer {
                question: "Name".to_string(),
                answer: "Asha".to_string(),
                field_type: FieldType::Text,
            },
        );
        let screen = AnswerScreen::open(&state);
        assert!(screen.id_prompt.is_none());
        assert_eq!(screen.drafts.get("1"), "Asha");
    }

    #[test]
    fn test_navigation_is_bounded() {
        let mut screen = AnswerScreen::default();
        assert!(!screen.prev());
        assert!(screen.next(2));
        assert!(screen.is_last(2));
        assert!(!screen.next(2));
        assert_eq!(screen.index, 1);
        assert!(screen.prev());
        assert_eq!(screen.index, 0);
    }

    #[test]
    fn test_navigation_clears_suggestion() {
        let mut screen = AnswerScreen {
            suggestion: Some(Suggestion {
                question_id: "1".to_string(),
                answer: "x".to_string(),
                text: "Use full name".to_string(),
            }),
            ..Default::default()
        };
        screen.next(3);
        assert!(screen.suggestion.is_none());
    }

    #[test]
    fn test_suggestion_dismissed_only_for_same_answer() {
        let screen = AnswerScreen {
            suggestion: Some(Suggestion {
                question_id: "1".to_string(),
                answer: "ravi".to_string(),
                text: "Capitalise".to_string(),
            }),
            ..Default::default()
        };
        assert!(screen.suggestion_dismissed_for("1", "ravi"));
        assert!(!screen.suggestion_dismissed_for("1", "Ravi"));
        assert!(!screen.suggestion_dismissed_for("2", "ravi"));
    }

    #[test]
    fn test_document_selection_bounds() {
        let mut screen = DocumentScreen::default();
        screen.move_up();
        assert_eq!(screen.selected, 0);
        screen.move_down(2);
        screen.move_down(2);
        assert_eq!(screen.selected, 1);
        screen.move_down(0);
        assert_eq!(screen.selected, 1);
    }
}
