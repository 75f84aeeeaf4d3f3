//! Bootstrap 5 form widgets.

use fieldwire_bus::{FieldValue, ValueKind};

use super::{html_escape, Widget, WidgetAttrs};
use crate::mask::NumberMask;

/// Bootstrap 5 text input widget.
#[derive(Debug, Clone)]
pub struct TextInput {
    /// The HTML input type (text or number).
    pub input_type: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for TextInput {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
        }
    }
}

impl TextInput {
    /// Creates a new text input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a number input.
    pub fn number() -> Self {
        Self {
            input_type: "number".to_string(),
            ..Default::default()
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    fn is_number(&self) -> bool {
        self.input_type == "number"
    }
}

impl Widget for TextInput {
    fn render(&self, name: &str, value: Option<&str>, attrs: &WidgetAttrs) -> String {
        let value_attr = value
            .map(|v| format!(r#" value="{}""#, html_escape(v)))
            .unwrap_or_default();

        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        format!(
            r#"<input type="{}" class="{}" id="{}" name="{}"{}{}{}>"#,
            self.input_type,
            attrs.class_with("form-control"),
            attrs.id_for(name),
            name,
            value_attr,
            placeholder_attr,
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        &self.input_type
    }

    fn kind(&self) -> ValueKind {
        if self.is_number() {
            ValueKind::Number
        } else {
            ValueKind::Text
        }
    }

    fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        if !self.is_number() {
            return Ok(FieldValue::Text(raw.to_string()));
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(FieldValue::Number(0.0));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number)
            .ok_or_else(|| format!("{raw:?} is not a number"))
    }
}

/// Masked currency input.
///
/// Displays its number through a [`NumberMask`] and accepts masked or plain
/// text as input.
#[derive(Debug, Clone)]
pub struct MoneyInput {
    /// Mask used for display and parsing.
    pub mask: NumberMask,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for MoneyInput {
    fn default() -> Self {
        Self {
            mask: NumberMask::dollars(),
            placeholder: None,
        }
    }
}

impl MoneyInput {
    /// Creates a dollar input that accepts cents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom mask.
    pub fn with_mask(mask: NumberMask) -> Self {
        Self {
            mask,
            placeholder: None,
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

impl Widget for MoneyInput {
    fn render(&self, name: &str, value: Option<&str>, attrs: &WidgetAttrs) -> String {
        let value_attr = value
            .map(|v| format!(r#" value="{}""#, html_escape(&self.mask.conform(v))))
            .unwrap_or_default();

        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        format!(
            r#"<input type="text" inputmode="decimal" data-mask="money" class="{}" id="{}" name="{}"{}{}{}>"#,
            attrs.class_with("form-control"),
            attrs.id_for(name),
            name,
            value_attr,
            placeholder_attr,
            attrs.extra_html()
        )
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Number
    }

    fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        if raw.trim().is_empty() {
            return Ok(FieldValue::Number(0.0));
        }
        self.mask
            .unmask(raw)
            .map(FieldValue::Number)
            .ok_or_else(|| format!("{raw:?} is not an amount"))
    }

    fn display(&self, value: &FieldValue) -> String {
        self.mask.conform(&value.to_string())
    }
}

/// Bootstrap 5 radio group selecting one of several options.
#[derive(Debug, Clone, Default)]
pub struct OptionsInput {
    /// Available choices (value, label).
    pub choices: Vec<(String, String)>,
    /// Whether to display inline.
    pub inline: bool,
}

impl OptionsInput {
    /// Creates a new options input with the given choices.
    pub fn new(choices: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            inline: false,
        }
    }

    /// A yes/no choice.
    pub fn yes_no() -> Self {
        Self::new(vec![("yes", "Yes"), ("no", "No")]).inline()
    }

    /// Makes the radios display inline.
    #[must_use]
    pub const fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

impl Widget for OptionsInput {
    fn render(&self, name: &str, value: Option<&str>, _attrs: &WidgetAttrs) -> String {
        let wrapper_class = if self.inline {
            "form-check form-check-inline"
        } else {
            "form-check"
        };

        let mut html = String::new();

        for (i, (opt_value, label)) in self.choices.iter().enumerate() {
            let id = format!("id_{name}_{i}");
            let checked = value.is_some_and(|v| v == opt_value);
            let checked_attr = if checked { " checked" } else { "" };

            html.push_str(&format!(
                r#"<div class="{}">
  <input class="form-check-input" type="radio" id="{}" name="{}" value="{}"{checked_attr}>
  <label class="form-check-label" for="{}">{}</label>
</div>
"#,
                wrapper_class,
                id,
                name,
                html_escape(opt_value),
                id,
                html_escape(label)
            ));
        }

        html
    }

    fn input_type(&self) -> &str {
        "radio"
    }

    fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        if raw.is_empty() || self.choices.iter().any(|(value, _)| value == raw) {
            Ok(FieldValue::Text(raw.to_string()))
        } else {
            Err(format!("{raw:?} is not one of the available options"))
        }
    }
}

/// Bootstrap 5 checkbox, optionally styled as a toggle switch.
#[derive(Debug, Clone, Default)]
pub struct CheckboxInput {
    /// Label for the checkbox.
    pub label: Option<String>,
    /// Whether to use switch style.
    pub is_switch: bool,
}

impl CheckboxInput {
    /// Creates a new checkbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a switch-style toggle.
    pub fn switch() -> Self {
        Self {
            is_switch: true,
            ..Default::default()
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Widget for CheckboxInput {
    fn render(&self, name: &str, value: Option<&str>, attrs: &WidgetAttrs) -> String {
        let id = attrs.id_for(name);
        let checked = value.is_some_and(|v| matches!(v, "true" | "on" | "1"));
        let checked_attr = if checked { " checked" } else { "" };

        let wrapper_class = if self.is_switch {
            "form-check form-switch"
        } else {
            "form-check"
        };

        let label_html = self
            .label
            .as_ref()
            .map(|l| {
                format!(
                    r#"<label class="form-check-label" for="{}">{}</label>"#,
                    id,
                    html_escape(l)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div class="{}">
  <input class="form-check-input" type="checkbox" id="{}" name="{}" value="true"{checked_attr}>
  {}
</div>"#,
            wrapper_class, id, name, label_html
        )
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(FieldValue::Bool(true)),
            "false" | "off" | "0" | "" => Ok(FieldValue::Bool(false)),
            _ => Err(format!("{raw:?} is not a checkbox state")),
        }
    }
}
