//! Page-level error reporting for isolated handler failures.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{error, warn};

use crate::error::{BusError, HandlerFailure};

/// Receives failures the bus isolated instead of propagating.
pub trait ErrorReporter {
    /// Called once per failed handler invocation.
    fn handler_failed(&self, failure: &HandlerFailure);

    /// Called for bus-level problems detected during delivery.
    fn bus_error(&self, error: &BusError) {
        warn!(%error, "field bus error");
    }
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn handler_failed(&self, failure: &HandlerFailure) {
        error!(
            channel = %failure.channel,
            field = %failure.field,
            subscription = %failure.subscription,
            reason = %failure.reason,
            "field handler failed"
        );
    }
}

/// Reporter that keeps every failure in memory.
///
/// Clones share the same log, so one clone can be installed on a bus while
/// another is inspected.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    failures: Rc<RefCell<Vec<HandlerFailure>>>,
    bus_errors: Rc<RefCell<Vec<BusError>>>,
}

impl CollectingReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler failures seen so far.
    pub fn failures(&self) -> Vec<HandlerFailure> {
        self.failures.borrow().clone()
    }

    /// Returns the bus errors seen so far.
    pub fn bus_errors(&self) -> Vec<BusError> {
        self.bus_errors.borrow().clone()
    }

    /// Returns whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.failures.borrow().is_empty() && self.bus_errors.borrow().is_empty()
    }
}

impl ErrorReporter for CollectingReporter {
    fn handler_failed(&self, failure: &HandlerFailure) {
        self.failures.borrow_mut().push(failure.clone());
    }

    fn bus_error(&self, error: &BusError) {
        self.bus_errors.borrow_mut().push(error.clone());
    }
}
