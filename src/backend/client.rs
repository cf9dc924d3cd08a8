//! HTTP client for the form service
//!
//! The service does OCR, question detection, answer validation, ID field
//! extraction, speech transcription and PDF assembly. Every endpoint except
//! PDF generation takes a multipart upload and answers with a JSON envelope
//! carrying a `success` flag.

use super::payload::FilePayload;
use super::traits::BackendClientTrait;
use super::types::{BackendError, FilledFormRequest, ScannedForm, Validation};
use crate::state::{Document, ExtractedId, Question};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Default service address
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Deserialize)]
struct ScanFormResponse {
    success: bool,
    #[serde(default)]
    extracted_text: String,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateAnswerResponse {
    success: bool,
    #[serde(default = "default_true")]
    is_valid: bool,
    #[serde(default)]
    suggestion: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct AutoFillResponse {
    success: bool,
    #[serde(default)]
    data: Option<ExtractedId>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadDocumentResponse {
    success: bool,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    extracted_text: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpeechToTextResponse {
    success: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

/// Turn a failed response body into something a person can read.
///
/// The body may be JSON `{ "detail": ... }` or arbitrary bytes.
pub fn decode_error_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body).trim().to_string();
    match serde_json::from_str::<ErrorDetail>(&text) {
        Ok(ErrorDetail {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorDetail { detail }) => detail.to_string(),
        Err(_) if text.is_empty() => "empty response".to_string(),
        Err(_) => text,
    }
}

fn rejected(error: Option<String>, fallback: &str) -> BackendError {
    BackendError::Rejected(
        error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}

fn file_part(file: FilePayload) -> Result<Part, BackendError> {
    Ok(Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.mime)?)
}

/// Client for the form service
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, BackendError> {
        tracing::debug!(endpoint, "POST multipart");
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await?;
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail: decode_error_body(&body),
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl BackendClientTrait for HttpBackend {
    async fn scan_form(&self, file: FilePayload) -> Result<ScannedForm, BackendError> {
        let form = Form::new().part("file", file_part(file)?);
        let response: ScanFormResponse = self.post_multipart("scan-form", form).await?;
        if !response.success {
            return Err(rejected(response.error, "Failed to scan form"));
        }
        tracing::info!(questions = response.questions.len(), "form scanned");
        Ok(ScannedForm {
            extracted_text: response.extracted_text,
            questions: response.questions,
        })
    }

    async fn validate_answer(
        &self,
        question: String,
        answer: String,
    ) -> Result<Validation, BackendError> {
        let form = Form::new().text("question", question).text("answer", answer);
        let response: ValidateAnswerResponse = self.post_multipart("validate-answer", form).await?;
        if !response.success {
            return Err(rejected(response.error, "Failed to validate answer"));
        }
        Ok(Validation {
            is_valid: response.is_valid,
            suggestion: response.suggestion,
        })
    }

    async fn auto_fill_from_id(&self, file: FilePayload) -> Result<ExtractedId, BackendError> {
        let form = Form::new().part("file", file_part(file)?);
        let response: AutoFillResponse = self.post_multipart("auto-fill-from-id", form).await?;
        match response {
            AutoFillResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            AutoFillResponse { error, .. } => {
                Err(rejected(error, "Failed to extract data from ID"))
            }
        }
    }

    async fn upload_document(
        &self,
        file: FilePayload,
        document_type: String,
    ) -> Result<Document, BackendError> {
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("document_type", document_type);
        let response: UploadDocumentResponse = self.post_multipart("upload-document", form).await?;
        if !response.success {
            return Err(rejected(response.error, "Failed to upload document"));
        }
        Ok(Document {
            filename: response.filename,
            extracted_text: response.extracted_text,
        })
    }

    async fn generate_filled_form(
        &self,
        request: FilledFormRequest,
    ) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(answers = request.answers.len(), "POST generate-filled-form");
        let response = self
            .client
            .post(self.url("generate-filled-form"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                detail: decode_error_body(&body),
            });
        }
        Ok(body.to_vec())
    }

    async fn speech_to_text(&self, audio: FilePayload) -> Result<String, BackendError> {
        let form = Form::new().part("file", file_part(audio)?);
        let response: SpeechToTextResponse = self.post_multipart("speech-to-text", form).await?;
        if !response.success {
            return Err(rejected(response.error, "Failed to transcribe audio"));
        }
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_body_detail_string() {
        let body = br#"{"detail": "PDF template missing"}"#;
        assert_eq!(decode_error_body(body), "PDF template missing");
    }

    #[test]
    fn test_decode_error_body_detail_structured() {
        let body = br#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#;
        let decoded = decode_error_body(body);
        assert!(decoded.contains("field required"));
    }

    #[test]
    fn test_decode_error_body_plain_text() {
        assert_eq!(
            decode_error_body(b"Internal Server Error"),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_decode_error_body_binary_and_empty() {
        assert_eq!(decode_error_body(b""), "empty response");
        let decoded = decode_error_body(&[0xff, 0xfe, b'o', b'k']);
        assert!(decoded.ends_with("ok"));
    }

    #[test]
    fn test_scan_response_parsing() {
        let json = r#"{
            "success": true,
            "extracted_text": "NAME ____",
            "questions": [
                {"id": 1, "question": "Full Name", "field_type": "text", "required": true},
                {"id": "2", "question": "Photo", "field_type": "document", "required": false}
            ],
            "total_questions": 2
        }"#;
        let parsed: ScanFormResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.questions[0].id, "1");
        assert!(parsed.questions[1].is_document());
    }

    #[test]
    fn test_failed_scan_response_parsing() {
        let json = r#"{"success": false, "error": "ERROR: OCR failed"}"#;
        let parsed: ScanFormResponse = serde_json::from_str(json).unwrap();
        assert!(!parsed.success);
        assert!(parsed.questions.is_empty());
        let err = rejected(parsed.error, "Failed to scan form");
        assert_eq!(err.to_string(), "ERROR: OCR failed");
    }

    #[test]
    fn test_rejected_falls_back_on_blank_error() {
        let err = rejected(Some("  ".to_string()), "Failed to upload document");
        assert_eq!(err.to_string(), "Failed to upload document");
    }

    #[test]
    fn test_validate_response_defaults_to_valid() {
        let parsed: ValidateAnswerResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(parsed.is_valid);
        assert!(parsed.suggestion.is_none());
    }

    #[test]
    fn test_auto_fill_response_with_null_data() {
        let json = r#"{"success": false, "error": "No text found", "data": null}"#;
        let parsed: AutoFillResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.data.is_none());
    }

    #[test]
    fn test_base_url_is_normalised() {
        let backend = HttpBackend::new("http://localhost:8000/", None).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("scan-form"), "http://localhost:8000/scan-form");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let result = backend
            .validate_answer("Name".to_string(), "Ravi".to_string())
            .await;
        tokio_test::assert_err!(&result);
        assert!(matches!(result, Err(BackendError::Network(_))));
    }
}
