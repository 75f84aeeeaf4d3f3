//! Error types for forms.

use fieldwire_bus::BusError;
use thiserror::Error;

/// Form-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The bus rejected the form (duplicate or unknown field names).
    #[error(transparent)]
    Bus(#[from] BusError),

    /// A field was mounted twice.
    #[error("field {0} is already mounted")]
    AlreadyMounted(String),

    /// A field received input before it was mounted.
    #[error("field {0} is not mounted")]
    NotMounted(String),

    /// Invalid field value.
    #[error("invalid value for field {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The form has no field with this name.
    #[error("unknown field: {0}")]
    UnknownField(String),
}

impl FormError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
