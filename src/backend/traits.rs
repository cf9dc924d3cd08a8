//! Trait abstraction for the form service client to enable mocking in tests

use super::payload::FilePayload;
use super::types::{BackendError, FilledFormRequest, ScannedForm, Validation};
use crate::state::{Document, ExtractedId};
use async_trait::async_trait;

/// Operations offered by the form service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendClientTrait: Send + Sync {
    /// OCR a form image and detect its questions
    async fn scan_form(&self, file: FilePayload) -> Result<ScannedForm, BackendError>;

    /// Ask whether an answer makes sense for a question
    async fn validate_answer(
        &self,
        question: String,
        answer: String,
    ) -> Result<Validation, BackendError>;

    /// Extract personal fields from an ID card image
    async fn auto_fill_from_id(&self, file: FilePayload) -> Result<ExtractedId, BackendError>;

    /// OCR a supporting document
    async fn upload_document(
        &self,
        file: FilePayload,
        document_type: String,
    ) -> Result<Document, BackendError>;

    /// Render the completed form as PDF bytes
    async fn generate_filled_form(
        &self,
        request: FilledFormRequest,
    ) -> Result<Vec<u8>, BackendError>;

    /// Transcribe a recorded audio clip
    async fn speech_to_text(&self, audio: FilePayload) -> Result<String, BackendError>;
}
