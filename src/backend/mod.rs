//! Form service client over HTTP

mod client;
mod payload;
mod traits;
mod types;

pub use client::{HttpBackend, DEFAULT_BACKEND_URL};
pub use payload::FilePayload;
pub use traits::BackendClientTrait;
pub use types::{BackendError, FilledFormRequest, ScannedForm, Validation};

#[cfg(test)]
pub use traits::MockBackendClientTrait;
