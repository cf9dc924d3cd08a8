//! Messages from background tasks back to the UI loop

use crate::backend::{ScannedForm, Validation};
use crate::speech::SpeechOutcome;
use crate::state::{Document, ExtractedId, Step};

/// Identifies one backend request
pub type Ticket = u64;

#[derive(Debug)]
pub enum AppEvent {
    Backend { ticket: Ticket, reply: BackendReply },
    Speech(SpeechOutcome),
}

/// Result of a finished backend request
#[derive(Debug)]
pub enum BackendReply {
    Scanned(anyhow::Result<ScannedForm>),
    Validated {
        question_id: String,
        answer: String,
        /// What the user asked for once the answer is accepted
        intent: AdvanceIntent,
        result: anyhow::Result<Validation>,
    },
    AutoFilled(anyhow::Result<ExtractedId>),
    DocumentUploaded {
        label: String,
        result: anyhow::Result<Document>,
    },
    FormGenerated(anyhow::Result<Vec<u8>>),
}

/// Where the answer screen goes after a validated answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceIntent {
    Next,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ScanForm,
    ValidateAnswer,
    AutoFill,
    UploadDocument,
    GeneratePdf,
}

impl RequestKind {
    /// Busy indicator text
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScanForm => "Scanning form...",
            Self::ValidateAnswer => "Checking answer...",
            Self::AutoFill => "Reading ID document...",
            Self::UploadDocument => "Uploading document...",
            Self::GeneratePdf => "Generating PDF...",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    kind: RequestKind,
    step: Step,
}

/// Hands out tickets and allows one request in flight at a time
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_ticket: Ticket,
    pending: Option<Pending>,
}

impl RequestTracker {
    /// Claim the request slot. None while another request is pending.
    pub fn begin(&mut self, kind: RequestKind, step: Step) -> Option<Ticket> {
        if self.pending.is_some() {
            return None;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(Pending { ticket, kind, step });
        tracing::debug!(ticket, ?kind, %step, "request started");
        Some(ticket)
    }

    /// Release the slot for a reply. False means the reply is stale.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => {
                tracing::debug!(ticket, "ignoring stale reply");
                false
            }
        }
    }

    /// Forget the pending request so its reply is ignored
    pub fn abandon(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                ticket = pending.ticket,
                kind = ?pending.kind,
                step = %pending.step,
                "request abandoned"
            );
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn busy_with(&self) -> Option<RequestKind> {
        self.pending.map(|p| p.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_request_at_a_time() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin(RequestKind::ScanForm, Step::UploadForm);
        assert!(first.is_some());
        assert!(tracker.is_busy());
        assert_eq!(tracker.busy_with(), Some(RequestKind::ScanForm));
        assert!(tracker
            .begin(RequestKind::ScanForm, Step::UploadForm)
            .is_none());
    }

    #[test]
    fn test_complete_frees_slot() {
        let mut tracker = RequestTracker::default();
        let ticket = tracker.begin(RequestKind::AutoFill, Step::AnswerQuestions).unwrap();
        assert!(tracker.complete(ticket));
        assert!(!tracker.is_busy());
        assert!(tracker
            .begin(RequestKind::GeneratePdf, Step::Review)
            .is_some());
    }

    #[test]
    fn test_abandoned_reply_is_stale() {
        let mut tracker = RequestTracker::default();
        let old = tracker.begin(RequestKind::ScanForm, Step::UploadForm).unwrap();
        tracker.abandon();
        assert!(!tracker.is_busy());

        let new = tracker.begin(RequestKind::ScanForm, Step::UploadForm).unwrap();
        assert_ne!(old, new);
        assert!(!tracker.complete(old));
        assert!(tracker.is_busy());
        assert!(tracker.complete(new));
    }

    #[test]
    fn test_busy_labels() {
        assert_eq!(RequestKind::GeneratePdf.label(), "Generating PDF...");
        assert_eq!(RequestKind::ValidateAnswer.label(), "Checking answer...");
    }
}
