//! Explicit field-name to setter bindings for consumers.
//!
//! A consumer declares, up front, which fields it listens to and how each
//! value lands in its state. Bindings are checked against the form's
//! [`FieldRegistry`] before subscribing, so a typo in a field name fails at
//! startup instead of silently never matching.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::bus::FieldBus;
use crate::channel::Channel;
use crate::error::{BusError, ContractViolation, HandlerError, Result};
use crate::message::{FieldMessage, FieldValue};
use crate::registry::FieldRegistry;
use crate::subscription::Subscription;

type Setter<S> = Box<dyn Fn(&mut S, &FieldValue) -> std::result::Result<(), ContractViolation>>;

/// Setters keyed by field name.
pub struct FieldBindings<S> {
    setters: BTreeMap<String, Setter<S>>,
}

impl<S> Default for FieldBindings<S> {
    fn default() -> Self {
        Self {
            setters: BTreeMap::new(),
        }
    }
}

impl<S> fmt::Debug for FieldBindings<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBindings")
            .field("names", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S> FieldBindings<S> {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a field name to a setter. A later binding for the same name
    /// replaces the earlier one.
    #[must_use]
    pub fn bind<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut S, &FieldValue) -> std::result::Result<(), ContractViolation> + 'static,
    {
        self.setters.insert(name.into(), Box::new(setter));
        self
    }

    /// Checks that every bound name is declared by the form.
    pub fn validate(&self, registry: &FieldRegistry) -> Result<()> {
        match self.setters.keys().find(|name| !registry.contains(name)) {
            Some(unknown) => Err(BusError::UnknownField(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Applies a message to the state.
    ///
    /// Returns `Ok(false)` when no binding matches the message's name.
    pub fn apply(
        &self,
        state: &mut S,
        message: &FieldMessage,
    ) -> std::result::Result<bool, ContractViolation> {
        let Some(setter) = self.setters.get(&message.name) else {
            return Ok(false);
        };
        setter(state, &message.value)?;
        Ok(true)
    }

    /// Iterates the bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }
}

/// Subscribes shared consumer state to `field-change` through bindings.
///
/// The bindings are validated against `registry` first. Contract violations
/// raised by setters surface as handler failures on the bus reporter.
pub fn bind_consumer<S: 'static>(
    bus: &FieldBus,
    state: Rc<RefCell<S>>,
    bindings: FieldBindings<S>,
    registry: &FieldRegistry,
) -> Result<Subscription> {
    bindings.validate(registry)?;
    debug!(fields = ?bindings.names().collect::<Vec<_>>(), "binding consumer");

    Ok(bus.subscribe(Channel::FieldChange, move |message| {
        let mut state = state.borrow_mut();
        bindings
            .apply(&mut state, message)
            .map(|_| ())
            .map_err(HandlerError::from)
    }))
}
