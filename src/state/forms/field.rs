//! Form field value objects

/// What kind of text a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    /// A filesystem path to an image
    Path,
}

/// Represents a single input field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
    pub placeholder: &'static str,
}

impl FormField {
    /// Create a new text field
    pub fn text(name: &str, label: &str, placeholder: &'static str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: String::new(),
            kind: FieldKind::Text,
            placeholder,
        }
    }

    /// Create a new email field
    pub fn email(name: &str, label: &str, placeholder: &'static str) -> Self {
        Self {
            kind: FieldKind::Email,
            ..Self::text(name, label, placeholder)
        }
    }

    /// Create a new image path field
    pub fn path(name: &str, label: &str) -> Self {
        Self {
            kind: FieldKind::Path,
            ..Self::text(name, label, "e.g. ~/Pictures/form.jpg")
        }
    }

    pub fn as_text(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn push_char(&mut self, c: char) {
        if c == '\n' && self.kind != FieldKind::Text {
            return;
        }
        self.value.push(c);
    }

    pub fn pop_char(&mut self) {
        self.value.pop();
    }

    /// Paths typed with a leading `~` are resolved against the home directory
    pub fn expanded_path(&self) -> std::path::PathBuf {
        let raw = self.value.trim();
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        std::path::PathBuf::from(raw)
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        let mut field = FormField::text("name", "Your Name", "");
        field.push_char('A');
        field.push_char('b');
        field.pop_char();
        assert_eq!(field.as_text(), "A");
    }

    #[test]
    fn test_path_field_ignores_newlines() {
        let mut field = FormField::path("file", "Form image");
        field.push_char('\n');
        field.push_char('a');
        assert_eq!(field.as_text(), "a");
    }

    #[test]
    fn test_blank_detection() {
        let mut field = FormField::email("email", "Email", "");
        assert!(field.is_blank());
        field.value = "   ".to_string();
        assert!(field.is_blank());
        field.value = "a@b.in".to_string();
        assert!(!field.is_blank());
    }

    #[test]
    fn test_expanded_path_passthrough() {
        let mut field = FormField::path("file", "Form image");
        field.value = "  /tmp/form.png ".to_string();
        assert_eq!(field.expanded_path(), std::path::PathBuf::from("/tmp/form.png"));
    }

    #[test]
    fn test_expanded_path_home() {
        let mut field = FormField::path("file", "Form image");
        field.value = "~/form.png".to_string();
        let path = field.expanded_path();
        assert!(path.ends_with("form.png"));
    }
}
