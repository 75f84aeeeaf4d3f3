//! # fieldwire-bus
//!
//! A synchronous publish/subscribe relay that keeps sibling form components
//! consistent.
//!
//! Field widgets (producers) announce their initial value on `field-mount`
//! and every user edit on `field-change`. Aggregate components (consumers)
//! subscribe and update derived state. Delivery is a broadcast: every
//! subscriber sees every message and filters by field name itself.
//!
//! This crate provides:
//! - [`FieldBus`]: the relay, with registration-order delivery, deferred
//!   reentrant emits and per-handler failure isolation
//! - [`FieldMessage`] and [`FieldValue`]: the typed message contract
//! - [`Subscription`]: a release-on-drop registration handle
//! - [`FieldRegistry`]: per-form field-name uniqueness
//! - [`FieldBindings`] and [`bind_consumer`]: explicit name-to-setter
//!   dispatch for consumers
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use fieldwire_bus::{Channel, FieldBus, FieldMessage};
//!
//! let bus = FieldBus::new();
//! let monthly = Rc::new(Cell::new(0.0));
//!
//! let sink = Rc::clone(&monthly);
//! let subscription = bus.subscribe(Channel::FieldChange, move |message| {
//!     if message.name == "estimated_monthly_spend" {
//!         sink.set(message.value.coerce_number(&message.name)?);
//!     }
//!     Ok(())
//! });
//!
//! let report = bus.emit_change(FieldMessage::new("estimated_monthly_spend", 500));
//! assert_eq!(report.delivered, 1);
//! assert_eq!(monthly.get() * 12.0, 6000.0);
//!
//! subscription.release();
//! assert_eq!(bus.subscriber_count(Channel::FieldChange), 0);
//! ```
//!
//! ## Bindings
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use fieldwire_bus::{
//!     bind_consumer, FieldBindings, FieldBus, FieldMessage, FieldRegistry, FieldValue,
//! };
//!
//! #[derive(Default)]
//! struct Summary {
//!     migration: String,
//! }
//!
//! let bus = FieldBus::new();
//! let registry = FieldRegistry::from_names(["jedi_migration"]).unwrap();
//! let state = Rc::new(RefCell::new(Summary::default()));
//!
//! let bindings = FieldBindings::new().bind(
//!     "jedi_migration",
//!     |s: &mut Summary, v: &FieldValue| {
//!         s.migration = v.coerce_text();
//!         Ok(())
//!     },
//! );
//! let _subscription = bind_consumer(&bus, Rc::clone(&state), bindings, &registry).unwrap();
//!
//! let _ = bus.emit_change(FieldMessage::new("jedi_migration", "yes"));
//! assert_eq!(state.borrow().migration, "yes");
//! ```

mod binding;
mod bus;
mod channel;
mod error;
mod message;
mod registry;
mod reporter;
mod subscription;

pub use binding::{bind_consumer, FieldBindings};
pub use bus::{BusConfig, EmitReport, FieldBus, DEFAULT_DEFERRED_LIMIT};
pub use channel::Channel;
pub use error::{
    BusError, ContractViolation, FailureReason, HandlerError, HandlerFailure, Result,
};
pub use message::{
    ComponentUid, FieldChangeMessage, FieldMessage, FieldMountMessage, FieldValue, ValueKind,
};
pub use registry::FieldRegistry;
pub use reporter::{CollectingReporter, ErrorReporter, TracingReporter};
pub use subscription::{Subscription, SubscriptionId};
