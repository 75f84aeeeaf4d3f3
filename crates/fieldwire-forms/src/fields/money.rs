//! Masked currency field.

use crate::form::FormFieldDef;
use crate::widgets::MoneyInput;

/// Creates a dollar amount field displayed through a number mask.
pub fn money_field(name: &str, label: &str, required: bool) -> FormFieldDef {
    let field = FormFieldDef::new(name, label, MoneyInput::new().placeholder("$0"));
    if required {
        field.required()
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwire_bus::{FieldValue, ValueKind};

    #[test]
    fn test_money_field() {
        let field = money_field("estimated_monthly_spend", "Monthly spend", true);
        assert_eq!(field.kind(), ValueKind::Number);
        assert!(field.required);
        assert_eq!(field.widget.display(&FieldValue::from(1234)), "$1,234");
    }
}
