//! Option selector field types.

use crate::form::FormFieldDef;
use crate::widgets::OptionsInput;

/// Creates a single-choice field rendered as a radio group.
pub fn options_field(
    name: &str,
    label: &str,
    choices: Vec<(&str, &str)>,
    required: bool,
) -> FormFieldDef {
    let field = FormFieldDef::new(name, label, OptionsInput::new(choices));
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates an inline yes/no choice.
pub fn yes_no_field(name: &str, label: &str, required: bool) -> FormFieldDef {
    let field = FormFieldDef::new(name, label, OptionsInput::yes_no());
    if required {
        field.required()
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_field() {
        let choices = vec![("small", "Small"), ("large", "Large")];
        let field = options_field("size", "Size", choices, true);
        assert_eq!(field.name, "size");
        assert!(field.required);
        assert!(field.widget.parse("large").is_ok());
        assert!(field.widget.parse("medium").is_err());
    }

    #[test]
    fn test_yes_no_field() {
        let field = yes_no_field("jedi_migration", "Migrating?", false);
        assert!(!field.required);
        assert_eq!(field.widget.input_type(), "radio");
    }
}
