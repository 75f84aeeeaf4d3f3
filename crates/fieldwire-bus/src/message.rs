//! The message contract shared by producers and consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;

/// The closed set of value kinds a form field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text or a selected option.
    Text,
    /// A numeric amount.
    Number,
    /// A toggle.
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
        })
    }
}

/// A field value.
///
/// Serialized untagged, so JSON `"yes"`, `500` and `true` map to
/// `Text`, `Number` and `Bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A boolean toggle.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
}

impl FieldValue {
    /// Returns the kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Number(_) => ValueKind::Number,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number, if this is a numeric value.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Reads the value as a number, tolerating numeric text.
    ///
    /// Empty text reads as `0`. Booleans, non-numeric text and non-finite
    /// numbers are contract violations.
    pub fn coerce_number(&self, field: &str) -> Result<f64, ContractViolation> {
        match self {
            Self::Number(n) if n.is_finite() => Ok(*n),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| ContractViolation::new(field, ValueKind::Number, self.describe()))
            }
            _ => Err(ContractViolation::new(field, ValueKind::Number, self.describe())),
        }
    }

    /// Reads the value as text. Numbers and booleans are formatted.
    pub fn coerce_text(&self) -> String {
        self.to_string()
    }

    /// Reads the value as a flag. Only booleans qualify.
    pub fn coerce_bool(&self, field: &str) -> Result<bool, ContractViolation> {
        self.as_bool()
            .ok_or_else(|| ContractViolation::new(field, ValueKind::Bool, self.describe()))
    }

    /// Short description used in contract violation messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => format!("text {text:?}"),
            Self::Number(n) => format!("number {n}"),
            Self::Bool(b) => format!("bool {b}"),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Opaque identifier of a mounted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentUid(u64);

impl ComponentUid {
    /// Wraps a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// "Field `name` now holds `value`", emitted by a component whose parent is
/// `parent_uid`.
///
/// `parent_uid` is context only; the bus never routes on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMessage {
    /// Field name, unique within a form.
    pub name: String,
    /// The field's value.
    pub value: FieldValue,
    /// Parent component of the emitting field, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<ComponentUid>,
}

impl FieldMessage {
    /// Creates a message without parent context.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            parent_uid: None,
        }
    }

    /// Attaches the emitting component's parent.
    #[must_use]
    pub const fn with_parent(mut self, parent_uid: ComponentUid) -> Self {
        self.parent_uid = Some(parent_uid);
        self
    }
}

/// A message carried on [`Channel::FieldChange`](crate::Channel::FieldChange).
pub type FieldChangeMessage = FieldMessage;

/// A message carried on [`Channel::FieldMount`](crate::Channel::FieldMount).
pub type FieldMountMessage = FieldMessage;
