//! Form state for the login details form

use super::field::FormField;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> &mut FormField;
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

/// Which part of the login screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    /// Logo and feature list with a "Get Started" prompt
    #[default]
    Welcome,
    /// Name and email inputs
    Details,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub phase: LoginPhase,
    pub name: FormField,
    pub email: FormField,
    pub active_field_index: usize,
    /// Inline validation message
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            phase: LoginPhase::Welcome,
            name: FormField::text("name", "Your Name", "Enter your full name"),
            email: FormField::email("email", "Email Address", "your.email@example.com"),
            active_field_index: 0,
            error: None,
        }
    }

    pub fn show_details(&mut self) {
        self.phase = LoginPhase::Details;
        self.active_field_index = 0;
        self.error = None;
    }

    pub fn show_welcome(&mut self) {
        self.phase = LoginPhase::Welcome;
        self.error = None;
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for LoginForm {
    fn field_count(&self) -> usize {
        2
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(1);
    }
    fn get_active_field_mut(&mut self) -> &mut FormField {
        match self.active_field_index {
            0 => &mut self.name,
            _ => &mut self.email,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.name),
            1 => Some(&self.email),
            _ => None,
        }
    }
}
