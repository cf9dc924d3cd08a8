//! Application state module

mod autofill;
mod forms;
mod models;
mod screens;
mod welcome;
mod wizard;

pub use autofill::*;
pub use forms::*;
pub use models::*;
pub use screens::*;
pub use welcome::*;
pub use wizard::*;
