//! Checkbox field types.

use crate::form::FormFieldDef;
use crate::widgets::CheckboxInput;

/// Creates a boolean field (checkbox).
pub fn checkbox_field(name: &str, label: &str) -> FormFieldDef {
    FormFieldDef::new(name, label, CheckboxInput::new().label(label))
}

/// Creates a toggle switch.
pub fn toggle_field(name: &str, label: &str) -> FormFieldDef {
    FormFieldDef::new(name, label, CheckboxInput::switch().label(label))
}
