//! Form domain layer
//!
//! Type-safe input handling for the login details and the file path prompts.

mod field;
mod form_state;

pub use field::{FieldKind, FormField};
pub use form_state::{Form, LoginForm, LoginPhase};
