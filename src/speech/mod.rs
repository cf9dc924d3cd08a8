//! Voice input for the answer screen
//!
//! A [`Recognizer`] turns one utterance into text. [`VoiceCapture`] runs at
//! most one recognition session at a time on a background task and reports
//! the result to the UI loop as [`AppEvent::Speech`].

mod recognizer;

pub use recognizer::{BackendRecognizer, CommandRecognizer};

use crate::backend::BackendClientTrait;
use crate::config::{SpeechConfig, SpeechEngine};
use crate::events::AppEvent;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Language passed to recognizers when none is configured
pub const DEFAULT_LANGUAGE: &str = "en-IN";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech recognition unsupported")]
    Unsupported,
    #[error("no speech detected")]
    NoSpeech,
    #[error("microphone access denied")]
    NotAllowed,
    #[error("speech recognition failed: {0}")]
    Other(String),
}

impl SpeechError {
    /// Message shown to the user under the answer field
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Unsupported => "Voice input is not available. Please type your answer.",
            Self::NoSpeech => "No speech detected. Please try again or type your answer.",
            Self::NotAllowed => "Microphone access denied. Please type your answer.",
            Self::Other(_) => "Voice recognition error. Please type your answer.",
        }
    }

    pub(crate) fn from_spawn(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::Unsupported,
            io::ErrorKind::PermissionDenied => Self::NotAllowed,
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Captures one utterance and returns its transcript
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Whether capture can work on this machine at all
    fn is_available(&self) -> bool;

    /// Listen until the utterance ends or `stop` fires. A stopped session
    /// still returns what was heard.
    async fn listen(&self, stop: oneshot::Receiver<()>) -> Result<String, SpeechError>;
}

/// Result of one capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOutcome {
    pub session: u64,
    /// Question the transcript belongs to
    pub question_id: String,
    pub outcome: Result<String, SpeechError>,
}

struct ActiveSession {
    id: u64,
    question_id: String,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Runs voice capture sessions, one at a time
pub struct VoiceCapture {
    recognizer: Option<Arc<dyn Recognizer>>,
    events: mpsc::UnboundedSender<AppEvent>,
    next_session: u64,
    active: Option<ActiveSession>,
}

impl VoiceCapture {
    pub fn new(
        recognizer: Option<Arc<dyn Recognizer>>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            recognizer,
            events,
            next_session: 0,
            active: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.as_ref().is_some_and(|r| r.is_available())
    }

    /// Start listening for `question_id`, replacing any running session
    pub fn start(&mut self, question_id: &str) -> Result<u64, SpeechError> {
        let recognizer = match &self.recognizer {
            Some(r) if r.is_available() => Arc::clone(r),
            _ => return Err(SpeechError::Unsupported),
        };
        self.cancel();

        self.next_session += 1;
        let session = self.next_session;
        let (stop_tx, stop_rx) = oneshot::channel();
        let events = self.events.clone();
        let qid = question_id.to_string();

        let task = tokio::spawn(async move {
            let outcome = recognizer.listen(stop_rx).await.and_then(clean_transcript);
            let _ = events.send(AppEvent::Speech(SpeechOutcome {
                session,
                question_id: qid,
                outcome,
            }));
        });

        tracing::debug!(session, question_id, "voice capture started");
        self.active = Some(ActiveSession {
            id: session,
            question_id: question_id.to_string(),
            stop: Some(stop_tx),
            task,
        });
        Ok(session)
    }

    /// Stop listening; the session's result is still delivered
    pub fn stop(&mut self) {
        if let Some(stop) = self.active.as_mut().and_then(|s| s.stop.take()) {
            let _ = stop.send(());
            tracing::debug!("voice capture stopping");
        }
    }

    /// End the session and drop whatever it would have produced
    pub fn cancel(&mut self) {
        if let Some(session) = self.active.take() {
            session.task.abort();
            tracing::debug!(session = session.id, "voice capture cancelled");
        }
    }

    /// True while the microphone is open
    pub fn is_listening(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.stop.is_some())
    }

    /// True between start and delivery of the result
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn listening_for(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.question_id.as_str())
    }

    /// Claim a delivered outcome. False when it belongs to a replaced or
    /// cancelled session.
    pub fn accept(&mut self, outcome: &SpeechOutcome) -> bool {
        match &self.active {
            Some(session) if session.id == outcome.session => {
                self.active = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for VoiceCapture {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn clean_transcript(text: String) -> Result<String, SpeechError> {
    let text = text.trim();
    if text.is_empty() {
        Err(SpeechError::NoSpeech)
    } else {
        Ok(text.to_string())
    }
}

/// Build the configured recognizer, if any
pub fn build_recognizer(
    config: &SpeechConfig,
    backend: Arc<dyn BackendClientTrait>,
) -> Option<Arc<dyn Recognizer>> {
    let program = config.program.as_deref()?.trim();
    if program.is_empty() {
        return None;
    }
    let language = config
        .language
        .clone()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let recognizer: Arc<dyn Recognizer> = match config.engine {
        SpeechEngine::Command => Arc::new(CommandRecognizer::new(
            program,
            config.args.clone(),
            language,
        )),
        SpeechEngine::Backend => Arc::new(BackendRecognizer::new(
            program,
            config.args.clone(),
            language,
            backend,
        )),
    };
    tracing::info!(engine = ?config.engine, program, "voice input configured");
    Some(recognizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackendClientTrait;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn capture_with(
        recognizer: MockRecognizer,
    ) -> (VoiceCapture, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (VoiceCapture::new(Some(Arc::new(recognizer)), tx), rx)
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> SpeechOutcome {
        match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(AppEvent::Speech(outcome))) => outcome,
            other => panic!("expected speech outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_hints() {
        assert_eq!(
            SpeechError::Unsupported.hint(),
            "Voice input is not available. Please type your answer."
        );
        assert_eq!(
            SpeechError::NoSpeech.hint(),
            "No speech detected. Please try again or type your answer."
        );
        assert_eq!(
            SpeechError::NotAllowed.hint(),
            "Microphone access denied. Please type your answer."
        );
        assert_eq!(
            SpeechError::Other("boom".to_string()).hint(),
            "Voice recognition error. Please type your answer."
        );
    }

    #[test]
    fn test_spawn_error_mapping() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(SpeechError::from_spawn(not_found), SpeechError::Unsupported);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(SpeechError::from_spawn(denied), SpeechError::NotAllowed);
        let other = io::Error::other("broken pipe");
        assert!(matches!(SpeechError::from_spawn(other), SpeechError::Other(_)));
    }

    #[tokio::test]
    async fn test_start_without_recognizer_is_unsupported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut voice = VoiceCapture::new(None, tx);
        assert_eq!(voice.start("1"), Err(SpeechError::Unsupported));
        assert!(!voice.is_active());
    }

    #[tokio::test]
    async fn test_start_with_unavailable_recognizer_is_unsupported() {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_is_available().return_const(false);
        recognizer.expect_listen().never();
        let (mut voice, _rx) = capture_with(recognizer);
        assert_eq!(voice.start("1"), Err(SpeechError::Unsupported));
        assert!(!voice.is_supported());
    }

    #[tokio::test]
    async fn test_transcript_is_delivered_trimmed() {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_is_available().return_const(true);
        recognizer
            .expect_listen()
            .times(1)
            .returning(|_| Ok("  Ravi Kumar \n".to_string()));
        let (mut voice, mut rx) = capture_with(recognizer);

        let session = voice.start("7").unwrap();
        assert!(voice.is_listening());
        assert_eq!(voice.listening_for(), Some("7"));

        let outcome = next_outcome(&mut rx).await;
        assert_eq!(
            outcome,
            SpeechOutcome {
                session,
                question_id: "7".to_string(),
                outcome: Ok("Ravi Kumar".to_string()),
            }
        );
        assert!(voice.accept(&outcome));
        assert!(!voice.is_active());
    }

    #[tokio::test]
    async fn test_blank_transcript_is_no_speech() {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_is_available().return_const(true);
        recognizer
            .expect_listen()
            .returning(|_| Ok("   ".to_string()));
        let (mut voice, mut rx) = capture_with(recognizer);

        voice.start("1").unwrap();
        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome.outcome, Err(SpeechError::NoSpeech));
    }

    #[tokio::test]
    async fn test_outcome_of_replaced_session_is_rejected() {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_is_available().return_const(true);
        recognizer
            .expect_listen()
            .returning(|_| Ok("hello".to_string()));
        let (mut voice, _rx) = capture_with(recognizer);

        let first = voice.start("1").unwrap();
        let second = voice.start("2").unwrap();
        assert_ne!(first, second);

        let stale = SpeechOutcome {
            session: first,
            question_id: "1".to_string(),
            outcome: Ok("hello".to_string()),
        };
        assert!(!voice.accept(&stale));
        assert!(voice.is_active());
    }

    #[tokio::test]
    async fn test_stop_keeps_session_and_cancel_drops_it() {
        let mut recognizer = MockRecognizer::new();
        recognizer.expect_is_available().return_const(true);
        recognizer
            .expect_listen()
            .returning(|_| Ok("later".to_string()));
        let (mut voice, _rx) = capture_with(recognizer);

        voice.start("1").unwrap();
        voice.stop();
        assert!(!voice.is_listening());
        assert!(voice.is_active());

        voice.cancel();
        assert!(!voice.is_active());
    }

    #[test]
    fn test_build_recognizer_requires_program() {
        let backend: Arc<dyn BackendClientTrait> = Arc::new(MockBackendClientTrait::new());
        let config = SpeechConfig::default();
        assert!(build_recognizer(&config, Arc::clone(&backend)).is_none());

        let blank = SpeechConfig {
            program: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(build_recognizer(&blank, backend).is_none());
    }

    #[test]
    fn test_build_recognizer_with_program() {
        let backend: Arc<dyn BackendClientTrait> = Arc::new(MockBackendClientTrait::new());
        let config = SpeechConfig {
            engine: SpeechEngine::Backend,
            program: Some("arecord".to_string()),
            args: vec!["{output}".to_string()],
            language: None,
        };
        assert!(build_recognizer(&config, backend).is_some());
    }
}
