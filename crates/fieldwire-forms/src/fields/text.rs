//! Text field types.

use crate::form::FormFieldDef;
use crate::widgets::TextInput;

/// Creates a plain text field.
pub fn text_field(name: &str, label: &str, required: bool) -> FormFieldDef {
    let field = FormFieldDef::new(name, label, TextInput::new());
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates a numeric field without a display mask.
pub fn number_field(name: &str, label: &str, required: bool) -> FormFieldDef {
    let field = FormFieldDef::new(name, label, TextInput::number());
    if required {
        field.required()
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwire_bus::ValueKind;

    #[test]
    fn test_text_field() {
        let field = text_field("project_name", "Project name", true);
        assert_eq!(field.name, "project_name");
        assert!(field.required);
        assert_eq!(field.kind(), ValueKind::Text);
    }

    #[test]
    fn test_number_field() {
        let field = number_field("headcount", "Headcount", false);
        assert!(!field.required);
        assert_eq!(field.kind(), ValueKind::Number);
    }
}
