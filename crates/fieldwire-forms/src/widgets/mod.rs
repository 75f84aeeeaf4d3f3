//! Form widgets: HTML rendering plus parsing of raw user input.

mod bootstrap;

pub use bootstrap::{CheckboxInput, MoneyInput, OptionsInput, TextInput};

use std::collections::BTreeMap;

use fieldwire_bus::{FieldValue, ValueKind};

/// Attributes that can be applied to a widget.
#[derive(Debug, Clone, Default)]
pub struct WidgetAttrs {
    /// HTML attributes, rendered in key order.
    pub attrs: BTreeMap<String, String>,
}

impl WidgetAttrs {
    /// Creates new empty widget attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Renders the attributes except `class` and `id` as ` key="value"`
    /// pairs, each with a leading space.
    pub fn extra_html(&self) -> String {
        self.attrs
            .iter()
            .filter(|(k, _)| k.as_str() != "class" && k.as_str() != "id")
            .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
            .collect()
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub(crate) fn id_for(&self, name: &str) -> String {
        self.get("id")
            .cloned()
            .unwrap_or_else(|| format!("id_{name}"))
    }

    pub(crate) fn class_with(&self, base: &str) -> String {
        match self.get("class") {
            Some(extra) => format!("{base} {extra}"),
            None => base.to_string(),
        }
    }
}

/// A form widget.
///
/// Besides rendering, a widget knows which [`ValueKind`] its field carries,
/// how to read raw user input into a [`FieldValue`], and how to show a value.
pub trait Widget: Send + Sync {
    /// Renders the widget as HTML.
    ///
    /// # Arguments
    /// * `name` - The field name (used for the name attribute)
    /// * `value` - The current display value (if any)
    /// * `attrs` - Additional HTML attributes
    fn render(&self, name: &str, value: Option<&str>, attrs: &WidgetAttrs) -> String;

    /// Returns the HTML input type.
    fn input_type(&self) -> &str {
        "text"
    }

    /// Returns the kind of value the widget produces.
    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    /// Parses raw user input. The error is a human-readable message.
    fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        Ok(FieldValue::Text(raw.to_string()))
    }

    /// Formats a value for display inside the widget.
    fn display(&self, value: &FieldValue) -> String {
        value.to_string()
    }
}

/// The value a field holds before the user touches it.
pub fn empty_value(kind: ValueKind) -> FieldValue {
    match kind {
        ValueKind::Text => FieldValue::Text(String::new()),
        ValueKind::Number => FieldValue::Number(0.0),
        ValueKind::Bool => FieldValue::Bool(false),
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_widget_attrs() {
        let attrs = WidgetAttrs::new()
            .with("class", "wide")
            .with("id", "my-input")
            .with("placeholder", "Amount");
        assert_eq!(attrs.extra_html(), r#" placeholder="Amount""#);
        assert_eq!(attrs.id_for("x"), "my-input");
        assert_eq!(attrs.class_with("form-control"), "form-control wide");
        assert_eq!(WidgetAttrs::new().id_for("x"), "id_x");
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(empty_value(ValueKind::Text), FieldValue::from(""));
        assert_eq!(empty_value(ValueKind::Number), FieldValue::from(0));
        assert_eq!(empty_value(ValueKind::Bool), FieldValue::from(false));
    }
}
