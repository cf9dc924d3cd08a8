//! Application state and core logic

use crate::backend::{
    BackendClientTrait, FilePayload, FilledFormRequest, HttpBackend, ScannedForm,
};
use crate::config::TuiConfig;
use crate::events::{AdvanceIntent, AppEvent, BackendReply, RequestKind, RequestTracker};
use crate::platform::{is_command, SUBMIT_SHORTCUT};
use crate::speech::{build_recognizer, Recognizer, SpeechOutcome, VoiceCapture};
use crate::state::{
    AnswerScreen, Document, DocumentScreen, ExtractedId, Form, FormField, LoginPhase, Question,
    ReviewScreen, Screens, Step, Suggestion, WelcomeState, Wizard, WizardError, WorkflowState,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Main application struct
pub struct App {
    wizard: Wizard,
    /// Per-screen UI state
    pub screens: Screens,
    backend: Arc<dyn BackendClientTrait>,
    pub voice: VoiceCapture,
    requests: RequestTracker,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Errors waiting to be shown in the modal dialog
    errors: VecDeque<String>,
    /// Transient feedback shown in the status bar
    pub status_message: Option<String>,
    config: TuiConfig,
    /// Logo animation on the welcome view
    pub welcome: WelcomeState,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App talking to the configured form service
    pub fn new(config: TuiConfig) -> Result<Self> {
        let client = HttpBackend::new(&config.backend_url(), config.request_timeout())
            .context("Could not create HTTP client")?;
        tracing::info!(backend = %client.base_url(), "form service configured");
        let backend: Arc<dyn BackendClientTrait> = Arc::new(client);
        let recognizer = build_recognizer(&config.speech, Arc::clone(&backend));
        Ok(Self::with_backend(config, backend, recognizer))
    }

    pub fn with_backend(
        config: TuiConfig,
        backend: Arc<dyn BackendClientTrait>,
        recognizer: Option<Arc<dyn Recognizer>>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            wizard: Wizard::new(),
            screens: Screens::default(),
            backend,
            voice: VoiceCapture::new(recognizer, events_tx.clone()),
            requests: RequestTracker::default(),
            events_tx,
            events_rx,
            errors: VecDeque::new(),
            status_message: None,
            config,
            welcome: WelcomeState::new(),
            quit: false,
        }
    }

    /// Read-only view of the workflow for rendering
    pub fn state(&self) -> &WorkflowState {
        self.wizard.state()
    }

    pub fn step(&self) -> Step {
        self.wizard.step()
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_busy(&self) -> bool {
        self.requests.is_busy()
    }

    pub fn busy_with(&self) -> Option<RequestKind> {
        self.requests.busy_with()
    }

    /// True while the welcome logo is still moving
    pub fn in_welcome_animation(&self) -> bool {
        self.wizard.step() == Step::Login
            && self.screens.login.phase == LoginPhase::Welcome
            && !self.welcome.is_settled()
    }

    pub fn update_welcome(&mut self, terminal_height: u16) {
        self.welcome.update(terminal_height);
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "showing error");
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    /// Question shown on the answer screen
    pub fn current_question(&self) -> Option<&Question> {
        self.screens.answers.current(&self.wizard.state().questions)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.dismiss_error();
            }
            return Ok(());
        }

        // Only Esc is live while a request is pending; it gives up on the reply
        if self.requests.is_busy() {
            if key.code == KeyCode::Esc {
                self.requests.abandon();
                self.status_message = Some("Cancelled".to_string());
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.status_message = None;

        let before = self.wizard.step();
        match before {
            Step::Login => self.handle_login_key(key),
            Step::UploadForm => self.handle_upload_key(key),
            Step::AnswerQuestions => self.handle_answers_key(key),
            Step::UploadDocuments => self.handle_documents_key(key),
            Step::Review => self.handle_review_key(key),
        }
        self.after_transition(before);
        Ok(())
    }

    /// Apply everything background tasks have reported so far
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        let before = self.wizard.step();
        match event {
            AppEvent::Backend { ticket, reply } => {
                if self.requests.complete(ticket) {
                    self.handle_reply(reply);
                }
            }
            AppEvent::Speech(outcome) => self.handle_speech(outcome),
        }
        self.after_transition(before);
    }

    /// Reset screen state when the step changed. Pending work belongs to
    /// the old screen, so it is dropped.
    fn after_transition(&mut self, before: Step) {
        let now = self.wizard.step();
        if now == before {
            return;
        }
        tracing::info!(from = %before, to = %now, "step changed");
        self.requests.abandon();
        self.voice.cancel();

        match now {
            Step::Login => {
                self.screens = Screens::default();
                self.welcome.settle();
            }
            Step::UploadForm => self.screens.upload.error = None,
            Step::AnswerQuestions => {
                self.screens.answers = AnswerScreen::open(self.wizard.state());
            }
            Step::UploadDocuments => self.screens.documents = DocumentScreen::default(),
            Step::Review => self.screens.review = ReviewScreen::default(),
        }
    }

    fn go_back(&mut self) {
        if let Err(e) = self.wizard.back() {
            self.push_error(e.to_string());
        }
    }

    /// Start a backend call on a background task. False when another
    /// request is still pending.
    fn spawn_request<F, Fut>(&mut self, kind: RequestKind, request: F) -> bool
    where
        F: FnOnce(Arc<dyn BackendClientTrait>) -> Fut,
        Fut: Future<Output = BackendReply> + Send + 'static,
    {
        let Some(ticket) = self.requests.begin(kind, self.wizard.step()) else {
            return false;
        };
        let request = request(Arc::clone(&self.backend));
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let reply = request.await;
            let _ = events.send(AppEvent::Backend { ticket, reply });
        });
        true
    }

    fn handle_reply(&mut self, reply: BackendReply) {
        match reply {
            BackendReply::Scanned(result) => self.on_scanned(result),
            BackendReply::Validated {
                question_id,
                answer,
                intent,
                result,
            } => self.on_validated(question_id, answer, intent, result),
            BackendReply::AutoFilled(result) => self.on_auto_filled(result),
            BackendReply::DocumentUploaded { label, result } => {
                self.on_document_uploaded(label, result)
            }
            BackendReply::FormGenerated(result) => self.on_form_generated(result),
        }
    }

    // ---- Login ----

    fn handle_login_key(&mut self, key: KeyEvent) {
        if is_command(&key) && key.code == KeyCode::Char('g') {
            self.welcome.settle();
            if let Err(e) = self.wizard.login_as_guest() {
                self.screens.login.error = Some(e.to_string());
            }
            return;
        }

        let login = &mut self.screens.login;
        match login.phase {
            LoginPhase::Welcome => {
                self.welcome.settle();
                match key.code {
                    KeyCode::Enter => login.show_details(),
                    KeyCode::Char('q') => self.quit = true,
                    _ => {}
                }
            }
            LoginPhase::Details => match key.code {
                KeyCode::Tab | KeyCode::Down => login.next_field(),
                KeyCode::BackTab | KeyCode::Up => login.prev_field(),
                KeyCode::Esc => login.show_welcome(),
                KeyCode::Enter => {
                    let result = self.wizard.login(login.name.as_text(), login.email.as_text());
                    if let Err(e) = result {
                        login.error = Some(e.to_string());
                    }
                }
                KeyCode::Backspace => login.get_active_field_mut().pop_char(),
                KeyCode::Char(c) if !is_command(&key) => {
                    login.get_active_field_mut().push_char(c);
                    login.error = None;
                }
                _ => {}
            },
        }
    }

    // ---- Form upload ----

    fn handle_upload_key(&mut self, key: KeyEvent) {
        let upload = &mut self.screens.upload;
        match key.code {
            KeyCode::Enter => self.start_scan(),
            KeyCode::Backspace => upload.file.pop_char(),
            KeyCode::Char(c) if !is_command(&key) => {
                upload.file.push_char(c);
                upload.error = None;
            }
            _ => {}
        }
    }

    fn start_scan(&mut self) {
        let upload = &mut self.screens.upload;
        if upload.file.is_blank() {
            upload.error = Some("Please select a form image first".to_string());
            return;
        }
        upload.error = None;
        let path = upload.file.expanded_path();
        tracing::info!(path = %path.display(), "scanning form");
        self.spawn_request(RequestKind::ScanForm, move |backend| async move {
            BackendReply::Scanned(scan_form_at(backend.as_ref(), &path).await)
        });
    }

    fn on_scanned(&mut self, result: Result<ScannedForm>) {
        match result {
            Ok(scanned) => {
                let count = scanned.questions.len();
                match self
                    .wizard
                    .form_scanned(scanned.extracted_text, scanned.questions)
                {
                    Ok(_) => self.status_message = Some(format!("Found {count} questions")),
                    Err(e) => self.push_error(e.to_string()),
                }
            }
            Err(e) => self.push_error(format!("{e:#}")),
        }
    }

    // ---- Answers ----

    fn handle_answers_key(&mut self, key: KeyEvent) {
        if self.screens.answers.id_prompt.is_some() {
            self.handle_id_prompt_key(key);
            return;
        }
        let Some(question) = self.current_question().cloned() else {
            return;
        };
        let command = is_command(&key);
        let total = self.wizard.state().questions.len();

        match key.code {
            KeyCode::Char('r') if command => self.toggle_voice(&question.id),
            KeyCode::Char('n') if command => self.advance(AdvanceIntent::Next),
            KeyCode::Char('p') if command => self.previous_question(),
            KeyCode::Char('s') if command => self.advance(AdvanceIntent::Submit),
            KeyCode::Char('u') if command => {
                self.voice.cancel();
                self.screens.answers.id_prompt = Some(AnswerScreen::new_id_prompt());
            }
            KeyCode::Enter => {
                let intent = if self.screens.answers.is_last(total) {
                    AdvanceIntent::Submit
                } else {
                    AdvanceIntent::Next
                };
                self.advance(intent);
            }
            KeyCode::Esc => {
                self.voice.cancel();
                self.wizard.record_answers(&self.screens.answers.drafts);
                self.go_back();
            }
            KeyCode::Backspace => {
                self.screens.answers.drafts.pop_char(&question.id);
                self.screens.answers.notice = None;
            }
            KeyCode::Char(c) if !command => {
                self.screens.answers.drafts.push_char(&question.id, c);
                self.screens.answers.notice = None;
            }
            _ => {}
        }
    }

    fn handle_id_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.screens.answers.id_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.screens.answers.id_prompt = None,
            KeyCode::Enter if prompt.is_blank() => self.screens.answers.id_prompt = None,
            KeyCode::Enter => {
                let path = prompt.expanded_path();
                tracing::info!(path = %path.display(), "auto-filling from ID");
                self.spawn_request(RequestKind::AutoFill, move |backend| async move {
                    BackendReply::AutoFilled(auto_fill_at(backend.as_ref(), &path).await)
                });
            }
            KeyCode::Backspace => prompt.pop_char(),
            KeyCode::Char(c) if !is_command(&key) => prompt.push_char(c),
            _ => {}
        }
    }

    fn on_auto_filled(&mut self, result: Result<ExtractedId>) {
        match result {
            Ok(extracted) => {
                let questions = &self.wizard.state().questions;
                let filled = self
                    .screens
                    .answers
                    .drafts
                    .apply_auto_fill(questions, &extracted);
                let total = questions.len();
                self.screens.answers.id_prompt = None;
                tracing::info!(filled, total, "auto-fill applied");
                self.status_message = Some(if filled > 0 {
                    format!("Auto-filled {filled} of {total} fields from your ID")
                } else {
                    "No matching fields found on this ID".to_string()
                });
            }
            Err(e) => self.push_error(format!("{e:#}")),
        }
    }

    /// Move forward from the current question, checking the answer first
    /// when answer validation is on
    fn advance(&mut self, intent: AdvanceIntent) {
        let Some(question) = self.current_question().cloned() else {
            return;
        };
        let answer = self
            .screens
            .answers
            .drafts
            .get(&question.id)
            .trim()
            .to_string();

        let needs_check = self.config.validate_answers()
            && !answer.is_empty()
            && !question.is_document()
            && !self
                .screens
                .answers
                .suggestion_dismissed_for(&question.id, &answer);
        if !needs_check {
            self.proceed(intent);
            return;
        }

        self.voice.cancel();
        let Question {
            id: question_id,
            question: question_text,
            ..
        } = question;
        self.spawn_request(RequestKind::ValidateAnswer, move |backend| async move {
            let result = backend
                .validate_answer(question_text, answer.clone())
                .await
                .map_err(anyhow::Error::from);
            BackendReply::Validated {
                question_id,
                answer,
                intent,
                result,
            }
        });
    }

    fn on_validated(
        &mut self,
        question_id: String,
        answer: String,
        intent: AdvanceIntent,
        result: Result<crate::backend::Validation>,
    ) {
        let still_current = self.current_question().is_some_and(|q| q.id == question_id)
            && self.screens.answers.drafts.get(&question_id).trim() == answer;
        if !still_current {
            return;
        }

        match result {
            Ok(validation) => match validation.blocking_suggestion() {
                Some(text) => {
                    self.screens.answers.suggestion = Some(Suggestion {
                        question_id,
                        answer,
                        text: text.to_string(),
                    });
                }
                None => self.proceed(intent),
            },
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "answer validation failed, continuing");
                self.proceed(intent);
            }
        }
    }

    fn proceed(&mut self, intent: AdvanceIntent) {
        self.voice.cancel();
        match intent {
            AdvanceIntent::Next => {
                let total = self.wizard.state().questions.len();
                if !self.screens.answers.next(total) {
                    self.screens.answers.notice = Some(format!(
                        "This is the last question. Press {SUBMIT_SHORTCUT} to submit."
                    ));
                }
            }
            AdvanceIntent::Submit => self.submit_answers(),
        }
    }

    fn submit_answers(&mut self) {
        match self.wizard.submit_answers(&self.screens.answers.drafts) {
            Ok(next) => tracing::info!(%next, "answers submitted"),
            Err(e @ WizardError::MissingAnswers(_)) => {
                if let WizardError::MissingAnswers(missing) = &e {
                    let questions = &self.wizard.state().questions;
                    if let Some(index) = missing
                        .first()
                        .and_then(|m| questions.iter().position(|q| q.id == m.id))
                    {
                        self.screens.answers.index = index;
                        self.screens.answers.suggestion = None;
                    }
                }
                self.screens.answers.notice = Some(e.to_string());
            }
            Err(e) => self.push_error(e.to_string()),
        }
    }

    fn previous_question(&mut self) {
        self.voice.cancel();
        self.screens.answers.prev();
    }

    fn toggle_voice(&mut self, question_id: &str) {
        if self.voice.is_listening() {
            self.voice.stop();
            self.status_message = Some("Processing speech...".to_string());
            return;
        }
        match self.voice.start(question_id) {
            Ok(_) => self.screens.answers.notice = None,
            Err(e) => {
                tracing::info!(error = %e, "voice input unavailable");
                self.screens.answers.notice = Some(e.hint().to_string());
            }
        }
    }

    fn handle_speech(&mut self, outcome: SpeechOutcome) {
        if !self.voice.accept(&outcome) || self.wizard.step() != Step::AnswerQuestions {
            tracing::debug!(session = outcome.session, "ignoring stale speech result");
            return;
        }
        let answers = &mut self.screens.answers;
        match outcome.outcome {
            Ok(text) => {
                answers.drafts.set(&outcome.question_id, text);
                answers.notice = None;
            }
            Err(e) => answers.notice = Some(e.hint().to_string()),
        }
    }

    // ---- Documents ----

    fn document_labels(&self) -> Vec<String> {
        self.wizard
            .state()
            .document_questions()
            .map(|q| q.question.clone())
            .collect()
    }

    fn handle_documents_key(&mut self, key: KeyEvent) {
        if self.screens.documents.file.is_some() {
            self.handle_document_path_key(key);
            return;
        }
        let labels = self.document_labels();
        let documents = &mut self.screens.documents;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => documents.move_up(),
            KeyCode::Down | KeyCode::Char('j') => documents.move_down(labels.len()),
            KeyCode::Char('s') if is_command(&key) => {
                if let Err(e) = self.wizard.finish_documents() {
                    self.push_error(e.to_string());
                }
            }
            KeyCode::Enter => {
                if let Some(label) = labels.get(documents.selected) {
                    documents.file = Some(FormField::path("document", label));
                    documents.error = None;
                }
            }
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn handle_document_path_key(&mut self, key: KeyEvent) {
        let labels = self.document_labels();
        let documents = &mut self.screens.documents;
        let Some(file) = documents.file.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                documents.file = None;
                documents.error = None;
            }
            KeyCode::Enter if file.is_blank() => {
                documents.error = Some("Please select a file first".to_string());
            }
            KeyCode::Enter => {
                let Some(label) = labels.get(documents.selected).cloned() else {
                    return;
                };
                let path = file.expanded_path();
                documents.error = None;
                tracing::info!(path = %path.display(), document = %label, "uploading document");
                self.spawn_request(RequestKind::UploadDocument, move |backend| async move {
                    let result = upload_document_at(backend.as_ref(), &path, &label).await;
                    BackendReply::DocumentUploaded { label, result }
                });
            }
            KeyCode::Backspace => file.pop_char(),
            KeyCode::Char(c) if !is_command(&key) => {
                file.push_char(c);
                documents.error = None;
            }
            _ => {}
        }
    }

    fn on_document_uploaded(&mut self, label: String, result: Result<Document>) {
        match result {
            Ok(document) => match self.wizard.document_uploaded(label.clone(), document) {
                Ok(()) => {
                    self.screens.documents.file = None;
                    self.status_message = Some(format!("Uploaded {label}"));
                }
                Err(e) => self.push_error(e.to_string()),
            },
            Err(e) => self.push_error(format!("{e:#}")),
        }
    }

    // ---- Review ----

    fn handle_review_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.start_pdf(),
            KeyCode::Char('c') => self.copy_summary(),
            KeyCode::Char('n') if self.screens.review.saved_to.is_some() => {
                if let Err(e) = self.wizard.restart() {
                    self.push_error(e.to_string());
                }
            }
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn start_pdf(&mut self) {
        let request = FilledFormRequest::from_state(self.wizard.state());
        self.spawn_request(RequestKind::GeneratePdf, move |backend| async move {
            let result = backend
                .generate_filled_form(request)
                .await
                .map_err(anyhow::Error::from);
            BackendReply::FormGenerated(result)
        });
    }

    fn on_form_generated(&mut self, result: Result<Vec<u8>>) {
        let saved = result.and_then(|bytes| {
            save_pdf(&self.config.download_dir(), &bytes, Local::now())
        });
        match saved {
            Ok(path) => {
                tracing::info!(path = %path.display(), "filled form saved");
                self.status_message = Some(format!("Saved {}", path.display()));
                self.screens.review.saved_to = Some(path);
            }
            Err(e) => self.push_error(format!("Failed to generate PDF: {e:#}")),
        }
    }

    fn copy_summary(&mut self) {
        let summary = review_summary(self.wizard.state());
        match copy_to_clipboard(&summary) {
            Ok(()) => self.status_message = Some("Copied summary to clipboard".to_string()),
            Err(e) => self.push_error(format!("Could not copy to clipboard: {e}")),
        }
    }
}

async fn scan_form_at(backend: &dyn BackendClientTrait, path: &Path) -> Result<ScannedForm> {
    let file = FilePayload::read(path).await?;
    Ok(backend.scan_form(file).await?)
}

async fn auto_fill_at(backend: &dyn BackendClientTrait, path: &Path) -> Result<ExtractedId> {
    let file = FilePayload::read(path).await?;
    Ok(backend.auto_fill_from_id(file).await?)
}

async fn upload_document_at(
    backend: &dyn BackendClientTrait,
    path: &Path,
    label: &str,
) -> Result<Document> {
    let file = FilePayload::read(path).await?;
    Ok(backend.upload_document(file, label.to_string()).await?)
}

/// `filled_form.pdf`, or a timestamped name when that is taken
fn pdf_destination(dir: &Path, now: DateTime<Local>) -> PathBuf {
    let plain = dir.join("filled_form.pdf");
    if !plain.exists() {
        return plain;
    }
    dir.join(format!("filled_form-{}.pdf", now.format("%Y%m%d-%H%M%S")))
}

fn save_pdf(dir: &Path, bytes: &[u8], now: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
    let path = pdf_destination(dir, now);
    std::fs::write(&path, bytes).with_context(|| format!("Could not write {}", path.display()))?;
    Ok(path)
}

/// Plain-text summary of the session for the clipboard
fn review_summary(state: &WorkflowState) -> String {
    let mut lines = Vec::new();
    if let Some(user) = &state.user {
        lines.push(format!("Name: {}", user.name));
        lines.push(format!("Email: {}", user.email));
        lines.push(String::new());
    }
    lines.push("Answers".to_string());
    for question in &state.questions {
        let answer = state.answer_text(&question.id);
        let answer = if answer.trim().is_empty() {
            "(not answered)"
        } else {
            answer
        };
        lines.push(format!("- {}: {}", question.question, answer));
    }
    if !state.documents.is_empty() {
        lines.push(String::new());
        lines.push("Documents".to_string());
        for (label, document) in &state.documents {
            lines.push(format!("- {}: {}", label, document.filename));
        }
    }
    lines.join("\n")
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
