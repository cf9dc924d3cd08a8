//! Form-filling workflow state and its transition rules

use super::autofill::{auto_fill, ExtractedId};
use super::models::{Answer, Document, Question, User};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Wizard step; selects the screen that is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    #[default]
    Login,
    UploadForm,
    AnswerQuestions,
    UploadDocuments,
    Review,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Login,
        Step::UploadForm,
        Step::AnswerQuestions,
        Step::UploadDocuments,
        Step::Review,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::UploadForm => "Upload Form",
            Self::AnswerQuestions => "Answer",
            Self::UploadDocuments => "Documents",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please enter your name and email")]
    MissingCredentials,
    #[error("No questions were detected on this form. Try a clearer photo.")]
    NoQuestions,
    #[error("Please answer all required questions. Missing: {}", question_list(.0))]
    MissingAnswers(Vec<Question>),
    #[error("Cannot {action} from the {from} step")]
    InvalidTransition { from: Step, action: &'static str },
}

fn question_list(questions: &[Question]) -> String {
    questions
        .iter()
        .map(|q| q.question.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything collected during one session
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub step: Step,
    pub user: Option<User>,
    pub extracted_text: String,
    pub questions: Vec<Question>,
    pub answers: HashMap<String, Answer>,
    pub documents: BTreeMap<String, Document>,
    pub auto_filled: BTreeSet<String>,
}

impl WorkflowState {
    pub fn has_document_questions(&self) -> bool {
        self.questions.iter().any(Question::is_document)
    }

    pub fn document_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_document())
    }

    /// Committed answer text for a question, empty when unanswered
    pub fn answer_text(&self, question_id: &str) -> &str {
        self.answers
            .get(question_id)
            .map(|a| a.answer.as_str())
            .unwrap_or("")
    }
}

/// In-progress answers on the answer screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerDrafts {
    values: HashMap<String, String>,
    auto_filled: BTreeSet<String>,
}

impl AnswerDrafts {
    /// Seed drafts from what has already been committed
    pub fn from_state(state: &WorkflowState) -> Self {
        let values = state
            .questions
            .iter()
            .map(|q| (q.id.clone(), state.answer_text(&q.id).to_string()))
            .collect();
        Self {
            values,
            auto_filled: state.auto_filled.clone(),
        }
    }

    pub fn get(&self, question_id: &str) -> &str {
        self.values.get(question_id).map(String::as_str).unwrap_or("")
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        !self.get(question_id).trim().is_empty()
    }

    pub fn is_auto_filled(&self, question_id: &str) -> bool {
        self.auto_filled.contains(question_id)
    }

    pub fn auto_filled_count(&self) -> usize {
        self.auto_filled.len()
    }

    /// Replace an answer by hand (typing or voice); drops the auto-fill badge
    pub fn set(&mut self, question_id: &str, value: impl Into<String>) {
        self.values.insert(question_id.to_string(), value.into());
        self.auto_filled.remove(question_id);
    }

    pub fn push_char(&mut self, question_id: &str, c: char) {
        self.values
            .entry(question_id.to_string())
            .or_default()
            .push(c);
        self.auto_filled.remove(question_id);
    }

    pub fn pop_char(&mut self, question_id: &str) {
        if let Some(value) = self.values.get_mut(question_id) {
            value.pop();
        }
        self.auto_filled.remove(question_id);
    }

    /// Overlay ID-document matches onto the drafts. Returns how many were filled.
    pub fn apply_auto_fill(&mut self, questions: &[Question], extracted: &ExtractedId) -> usize {
        let outcome = auto_fill(questions, extracted, &self.values);
        let filled = outcome.filled.len();
        self.values = outcome.answers;
        self.auto_filled.extend(outcome.filled);
        filled
    }
}

/// Questions that are required but have no non-blank draft, in form order
pub fn missing_required<'a>(questions: &'a [Question], drafts: &AnswerDrafts) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| q.required && !drafts.is_answered(&q.id))
        .collect()
}

/// Owns the workflow state; the only place the step changes
#[derive(Debug, Default)]
pub struct Wizard {
    state: WorkflowState,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot for views
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    fn expect_step(&self, step: Step, action: &'static str) -> Result<(), WizardError> {
        if self.state.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                from: self.state.step,
                action,
            })
        }
    }

    fn go(&mut self, step: Step) -> Step {
        tracing::debug!(from = %self.state.step, to = %step, "wizard transition");
        self.state.step = step;
        step
    }

    pub fn login(&mut self, name: &str, email: &str) -> Result<Step, WizardError> {
        self.expect_step(Step::Login, "log in")?;
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() {
            return Err(WizardError::MissingCredentials);
        }
        self.state.user = Some(User {
            name: name.to_string(),
            email: email.to_string(),
        });
        Ok(self.go(Step::UploadForm))
    }

    pub fn login_as_guest(&mut self) -> Result<Step, WizardError> {
        self.expect_step(Step::Login, "continue as guest")?;
        self.state.user = Some(User::guest());
        Ok(self.go(Step::UploadForm))
    }

    /// A fresh scan replaces the questions and clears everything derived from them
    pub fn form_scanned(
        &mut self,
        extracted_text: String,
        questions: Vec<Question>,
    ) -> Result<Step, WizardError> {
        self.expect_step(Step::UploadForm, "load scanned questions")?;
        if questions.is_empty() {
            return Err(WizardError::NoQuestions);
        }
        self.state.extracted_text = extracted_text;
        self.state.questions = questions;
        self.state.answers.clear();
        self.state.auto_filled.clear();
        self.state.documents.clear();
        Ok(self.go(Step::AnswerQuestions))
    }

    /// Commit drafts as they are, without the required-answer check
    pub fn record_answers(&mut self, drafts: &AnswerDrafts) {
        for question in &self.state.questions {
            if let Some(value) = drafts.values.get(&question.id) {
                self.state.answers.insert(
                    question.id.clone(),
                    Answer {
                        question: question.question.clone(),
                        answer: value.clone(),
                        field_type: question.field_type.clone(),
                    },
                );
            }
        }
        self.state.auto_filled = self.known_ids(&drafts.auto_filled);
    }

    pub fn submit_answers(&mut self, drafts: &AnswerDrafts) -> Result<Step, WizardError> {
        self.expect_step(Step::AnswerQuestions, "submit answers")?;

        let missing = missing_required(&self.state.questions, drafts);
        if !missing.is_empty() {
            return Err(WizardError::MissingAnswers(
                missing.into_iter().cloned().collect(),
            ));
        }

        self.state.answers = self
            .state
            .questions
            .iter()
            .map(|q| {
                (
                    q.id.clone(),
                    Answer {
                        question: q.question.clone(),
                        answer: drafts.get(&q.id).to_string(),
                        field_type: q.field_type.clone(),
                    },
                )
            })
            .collect();
        self.state.auto_filled = self.known_ids(&drafts.auto_filled);

        let next = if self.state.has_document_questions() {
            Step::UploadDocuments
        } else {
            Step::Review
        };
        Ok(self.go(next))
    }

    fn known_ids(&self, ids: &BTreeSet<String>) -> BTreeSet<String> {
        ids.iter()
            .filter(|id| self.state.questions.iter().any(|q| &q.id == *id))
            .cloned()
            .collect()
    }

    pub fn document_uploaded(
        &mut self,
        label: impl Into<String>,
        document: Document,
    ) -> Result<(), WizardError> {
        self.expect_step(Step::UploadDocuments, "attach a document")?;
        self.state.documents.insert(label.into(), document);
        Ok(())
    }

    /// Leave the document step; uploads are optional
    pub fn finish_documents(&mut self) -> Result<Step, WizardError> {
        self.expect_step(Step::UploadDocuments, "continue to review")?;
        Ok(self.go(Step::Review))
    }

    pub fn back(&mut self) -> Result<Step, WizardError> {
        let previous = match self.state.step {
            Step::AnswerQuestions => Step::UploadForm,
            Step::UploadDocuments | Step::Review => Step::AnswerQuestions,
            from => {
                return Err(WizardError::InvalidTransition {
                    from,
                    action: "go back",
                })
            }
        };
        Ok(self.go(previous))
    }

    /// Start over with a blank session
    pub fn restart(&mut self) -> Result<Step, WizardError> {
        self.expect_step(Step::Review, "start a new form")?;
        self.state = WorkflowState::default();
        tracing::info!("session restarted");
        Ok(self.state.step)
    }
}
