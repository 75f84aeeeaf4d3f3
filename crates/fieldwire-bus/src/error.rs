//! Error types for the notification bus.

use thiserror::Error;

use crate::channel::Channel;
use crate::message::ValueKind;
use crate::subscription::SubscriptionId;

/// Bus-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// A channel name did not match any known channel.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// Two fields of the same form share a name.
    #[error("duplicate field name: {0}")]
    DuplicateFieldName(String),

    /// A field name is empty or otherwise unusable.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// A binding refers to a field the form does not declare.
    #[error("binding refers to unknown field: {0}")]
    UnknownField(String),

    /// Reentrant emits overflowed the per-emit deferral budget.
    #[error("deferred emit limit of {limit} exceeded on {channel}; dropped {dropped} message(s)")]
    DeferredLimitExceeded {
        /// Channel of the outermost emit.
        channel: Channel,
        /// Configured limit.
        limit: usize,
        /// Number of messages dropped.
        dropped: usize,
    },
}

/// A message value did not have the shape a consumer expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field}: expected {expected}, found {found}")]
pub struct ContractViolation {
    /// Name of the offending field.
    pub field: String,
    /// The kind the consumer asked for.
    pub expected: ValueKind,
    /// What arrived instead.
    pub found: String,
}

impl ContractViolation {
    /// Creates a new contract violation.
    pub fn new(field: impl Into<String>, expected: ValueKind, found: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }
}

/// Error returned by a subscriber's handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The message broke the consumer's value contract.
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Creates a free-form handler error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Why a handler invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The handler returned an error.
    Error(HandlerError),
    /// The handler panicked; carries the panic payload when it was a string.
    Panic(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err}"),
            Self::Panic(payload) => write!(f, "handler panicked: {payload}"),
        }
    }
}

/// One isolated handler failure, as handed to an [`ErrorReporter`].
///
/// [`ErrorReporter`]: crate::reporter::ErrorReporter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler {subscription} on {channel} failed for field {field}: {reason}")]
pub struct HandlerFailure {
    /// Channel being delivered.
    pub channel: Channel,
    /// Name of the field in the message.
    pub field: String,
    /// The failing subscription.
    pub subscription: SubscriptionId,
    /// What went wrong.
    pub reason: FailureReason,
}

/// Result type alias for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
