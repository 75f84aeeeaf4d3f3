//! The field notification bus.
//!
//! # Delivery
//!
//! An emit delivers one message to every handler registered on the channel
//! when the emit started, synchronously and in registration order. Nothing
//! is retained afterwards, so late subscribers never see earlier messages.
//!
//! # Invariants
//!
//! 1. Each handler registered before an emit call is invoked exactly once
//!    for it. Handlers registered after the call never see the message,
//!    even when it was queued and is delivered later.
//! 2. Handlers of one pass run strictly one after another, oldest first.
//! 3. A released handler is never invoked again, including later in a pass
//!    that is already running.
//! 4. An emit issued from inside a handler is queued and delivered after the
//!    current pass, before the outermost emit returns.
//! 5. A failing handler never prevents delivery to the remaining ones.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::channel::Channel;
use crate::error::{BusError, FailureReason, HandlerError, HandlerFailure};
use crate::message::{ComponentUid, FieldChangeMessage, FieldMessage, FieldMountMessage};
use crate::reporter::{ErrorReporter, TracingReporter};
use crate::subscription::{Slot, Subscription, SubscriptionId};

/// Default bound on deferred messages processed per outermost emit.
pub const DEFAULT_DEFERRED_LIMIT: usize = 1024;

/// Bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Convert handler panics into reported failures.
    pub catch_panics: bool,
    /// Maximum number of reentrant emits delivered per outermost emit.
    pub deferred_limit: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            deferred_limit: DEFAULT_DEFERRED_LIMIT,
        }
    }
}

/// Outcome of one emit call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handler invocations that succeeded.
    pub delivered: usize,
    /// Handler invocations that failed and were reported.
    pub failed: usize,
    /// Reentrant messages delivered after the first pass.
    pub deferred: usize,
    /// Reentrant messages dropped because of the deferral limit.
    pub dropped: usize,
    /// This emit was itself issued from a handler and has been queued.
    pub queued: bool,
}

impl EmitReport {
    fn absorb(&mut self, pass: Self) {
        self.delivered += pass.delivered;
        self.failed += pass.failed;
    }
}

/// A reentrant emit waiting for the current pass to finish.
struct Pending {
    channel: Channel,
    message: FieldMessage,
    /// First subscription id registered after the emit call.
    horizon: u64,
}

pub(crate) struct BusInner {
    config: BusConfig,
    reporter: RefCell<Rc<dyn ErrorReporter>>,
    channels: [RefCell<Vec<Rc<Slot>>>; 2],
    next_subscription: Cell<u64>,
    next_uid: Cell<u64>,
    delivering: Cell<bool>,
    pending: RefCell<VecDeque<Pending>>,
}

impl BusInner {
    pub(crate) fn contains(&self, channel: Channel, id: SubscriptionId) -> bool {
        self.channels[channel.index()]
            .borrow()
            .iter()
            .any(|slot| slot.id == id)
    }

    pub(crate) fn remove(&self, channel: Channel, id: SubscriptionId) {
        // The slot is dropped after the borrow ends: its handler may own
        // other subscriptions whose drop re-enters this list.
        let removed = {
            let mut slots = self.channels[channel.index()].borrow_mut();
            slots
                .iter()
                .position(|slot| slot.id == id)
                .map(|pos| slots.remove(pos))
        };
        if let Some(slot) = removed {
            slot.active.set(false);
            debug!(channel = %channel, subscription = %id, "unsubscribed");
        }
    }

    fn reporter(&self) -> Rc<dyn ErrorReporter> {
        Rc::clone(&self.reporter.borrow())
    }
}

/// Resets the delivery state even if a handler panic escapes.
struct DeliveryGuard<'a>(&'a BusInner);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.delivering.set(false);
        self.0.pending.borrow_mut().clear();
    }
}

/// A publish/subscribe relay for field notifications.
///
/// The bus is constructed once and handed to every component that publishes
/// or listens. Clones are handles to the same subscriber lists. The bus is
/// single-threaded and not `Send`.
#[derive(Clone)]
pub struct FieldBus {
    inner: Rc<BusInner>,
}

impl Default for FieldBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBus")
            .field("config", &self.inner.config)
            .field("field_change", &self.subscriber_count(Channel::FieldChange))
            .field("field_mount", &self.subscriber_count(Channel::FieldMount))
            .field("delivering", &self.inner.delivering.get())
            .finish()
    }
}

impl FieldBus {
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            inner: Rc::new(BusInner {
                config,
                reporter: RefCell::new(Rc::new(TracingReporter)),
                channels: [RefCell::new(Vec::new()), RefCell::new(Vec::new())],
                next_subscription: Cell::new(1),
                next_uid: Cell::new(1),
                delivering: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Installs the reporter that receives isolated handler failures.
    #[must_use]
    pub fn with_reporter(self, reporter: impl ErrorReporter + 'static) -> Self {
        self.set_reporter(reporter);
        self
    }

    /// Replaces the error reporter.
    pub fn set_reporter(&self, reporter: impl ErrorReporter + 'static) {
        *self.inner.reporter.borrow_mut() = Rc::new(reporter);
    }

    /// Returns the configuration.
    pub fn config(&self) -> BusConfig {
        self.inner.config
    }

    /// Allocates a fresh component identifier.
    pub fn allocate_uid(&self) -> ComponentUid {
        let raw = self.inner.next_uid.get();
        self.inner.next_uid.set(raw + 1);
        ComponentUid::new(raw)
    }

    /// Registers a handler on a channel.
    ///
    /// The handler receives every message emitted on the channel from now
    /// until the returned handle is released or dropped.
    pub fn subscribe<F>(&self, channel: Channel, handler: F) -> Subscription
    where
        F: FnMut(&FieldMessage) -> Result<(), HandlerError> + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);

        let slot = Rc::new(Slot {
            id,
            active: Cell::new(true),
            handler: RefCell::new(Box::new(handler)),
        });
        self.inner.channels[channel.index()].borrow_mut().push(slot);
        debug!(channel = %channel, subscription = %id, "subscribed");

        Subscription::new(id, channel, Rc::downgrade(&self.inner))
    }

    /// Unregisters a handler. Releasing twice is a no-op.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        subscription.release();
    }

    /// Returns the number of handlers registered on a channel.
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.inner.channels[channel.index()].borrow().len()
    }

    /// Returns whether a delivery pass is running.
    pub fn is_delivering(&self) -> bool {
        self.inner.delivering.get()
    }

    /// Broadcasts a change notification on `field-change`.
    pub fn emit_change(&self, message: FieldChangeMessage) -> EmitReport {
        self.emit(Channel::FieldChange, message)
    }

    /// Broadcasts a mount notification on `field-mount`.
    pub fn emit_mount(&self, message: FieldMountMessage) -> EmitReport {
        self.emit(Channel::FieldMount, message)
    }

    /// Broadcasts a message on a channel.
    ///
    /// Called from inside a handler, the message is queued and the returned
    /// report has `queued` set.
    pub fn emit(&self, channel: Channel, message: FieldMessage) -> EmitReport {
        let inner = &*self.inner;

        if inner.delivering.get() {
            debug!(channel = %channel, field = %message.name, "deferring reentrant emit");
            let horizon = inner.next_subscription.get();
            inner.pending.borrow_mut().push_back(Pending {
                channel,
                message,
                horizon,
            });
            return EmitReport {
                queued: true,
                ..EmitReport::default()
            };
        }

        inner.delivering.set(true);
        let _guard = DeliveryGuard(inner);

        let mut report = self.deliver(channel, &message, u64::MAX);

        loop {
            let next = inner.pending.borrow_mut().pop_front();
            let Some(next) = next else {
                break;
            };

            if report.deferred >= inner.config.deferred_limit {
                let dropped = 1 + inner.pending.borrow_mut().drain(..).count();
                warn!(
                    channel = %channel,
                    limit = inner.config.deferred_limit,
                    dropped,
                    "dropping reentrant emits"
                );
                inner.reporter().bus_error(&BusError::DeferredLimitExceeded {
                    channel,
                    limit: inner.config.deferred_limit,
                    dropped,
                });
                report.dropped = dropped;
                break;
            }

            let pass = self.deliver(next.channel, &next.message, next.horizon);
            report.absorb(pass);
            report.deferred += 1;
        }

        report
    }

    /// Runs one pass over the handlers whose id is below `horizon`.
    fn deliver(&self, channel: Channel, message: &FieldMessage, horizon: u64) -> EmitReport {
        let snapshot: Vec<Rc<Slot>> = self.inner.channels[channel.index()]
            .borrow()
            .iter()
            .filter(|slot| slot.id.0 < horizon)
            .cloned()
            .collect();
        debug!(
            channel = %channel,
            field = %message.name,
            subscribers = snapshot.len(),
            "delivering"
        );

        let mut report = EmitReport::default();
        for slot in snapshot {
            if !slot.active.get() {
                continue;
            }
            match self.invoke(&slot, message) {
                Ok(()) => report.delivered += 1,
                Err(reason) => {
                    report.failed += 1;
                    let failure = HandlerFailure {
                        channel,
                        field: message.name.clone(),
                        subscription: slot.id,
                        reason,
                    };
                    self.inner.reporter().handler_failed(&failure);
                }
            }
        }
        report
    }

    fn invoke(&self, slot: &Slot, message: &FieldMessage) -> Result<(), FailureReason> {
        let Ok(mut guard) = slot.handler.try_borrow_mut() else {
            return Err(FailureReason::Error(HandlerError::failed(
                "handler is already running",
            )));
        };
        let handler: &mut dyn FnMut(&FieldMessage) -> Result<(), HandlerError> = &mut **guard;

        let result = if self.inner.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| handler(message)))
                .map_err(|payload| FailureReason::Panic(panic_message(&*payload)))?
        } else {
            handler(message)
        };
        result.map_err(FailureReason::Error)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::CollectingReporter;

    fn recorder(bus: &FieldBus, channel: Channel) -> (Subscription, Rc<RefCell<Vec<FieldMessage>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = bus.subscribe(channel, move |msg| {
            sink.borrow_mut().push(msg.clone());
            Ok(())
        });
        (sub, seen)
    }

    #[test]
    fn test_emit_reaches_subscriber_once() {
        let bus = FieldBus::new();
        let (_sub, seen) = recorder(&bus, Channel::FieldChange);

        let report = bus.emit_change(FieldMessage::new("estimated_monthly_spend", 500));

        assert_eq!(report.delivered, 1);
        assert_eq!(
            *seen.borrow(),
            vec![FieldMessage::new("estimated_monthly_spend", 500)]
        );
    }

    #[test]
    fn test_channels_are_separate() {
        let bus = FieldBus::new();
        let (_change, changes) = recorder(&bus, Channel::FieldChange);
        let (_mount, mounts) = recorder(&bus, Channel::FieldMount);

        let _ = bus.emit_mount(FieldMessage::new("jedi_migration", "yes"));

        assert!(changes.borrow().is_empty());
        assert_eq!(mounts.borrow().len(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let bus = FieldBus::new();
        let (sub, seen) = recorder(&bus, Channel::FieldChange);
        assert_eq!(bus.subscriber_count(Channel::FieldChange), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(Channel::FieldChange), 0);

        let report = bus.emit_change(FieldMessage::new("a", 1));
        assert_eq!(report.delivered, 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_release_is_idempotent() {
        let bus = FieldBus::new();
        let (a, _) = recorder(&bus, Channel::FieldChange);
        let (_b, seen_b) = recorder(&bus, Channel::FieldChange);

        bus.unsubscribe(&a);
        bus.unsubscribe(&a);
        a.release();
        assert!(!a.is_active());

        let _ = bus.emit_change(FieldMessage::new("a", 1));
        assert_eq!(seen_b.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(Channel::FieldChange), 1);
    }

    #[test]
    fn test_release_after_bus_dropped() {
        let bus = FieldBus::new();
        let (sub, _) = recorder(&bus, Channel::FieldChange);
        drop(bus);
        assert!(!sub.is_active());
        sub.release();
    }

    #[test]
    fn test_handler_error_is_isolated() {
        let reporter = CollectingReporter::new();
        let bus = FieldBus::new().with_reporter(reporter.clone());

        let _bad = bus.subscribe(Channel::FieldChange, |_| Err(HandlerError::failed("boom")));
        let (_good, seen) = recorder(&bus, Channel::FieldChange);

        let report = bus.emit_change(FieldMessage::new("a", 1));

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(seen.borrow().len(), 1);

        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "a");
        assert_eq!(
            failures[0].reason,
            FailureReason::Error(HandlerError::failed("boom"))
        );
    }

    #[test]
    fn test_handler_panic_is_isolated() {
        let reporter = CollectingReporter::new();
        let bus = FieldBus::new().with_reporter(reporter.clone());

        let bad = bus.subscribe(Channel::FieldChange, |_| panic!("handler exploded"));
        let (_good, seen) = recorder(&bus, Channel::FieldChange);

        let report = bus.emit_change(FieldMessage::new("a", 1));

        assert_eq!(report.failed, 1);
        assert_eq!(seen.borrow().len(), 1);
        assert!(bad.is_active());
        assert!(!bus.is_delivering());
        assert_eq!(
            reporter.failures()[0].reason,
            FailureReason::Panic("handler exploded".into())
        );
    }

    #[test]
    fn test_reentrant_emit_is_deferred() {
        let bus = FieldBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let relay = bus.clone();
        let log = Rc::clone(&order);
        let _first = bus.subscribe(Channel::FieldChange, move |msg| {
            log.borrow_mut().push(format!("first:{}", msg.name));
            if msg.name == "a" {
                let report = relay.emit_change(FieldMessage::new("b", 2));
                assert!(report.queued);
            }
            Ok(())
        });
        let log = Rc::clone(&order);
        let _second = bus.subscribe(Channel::FieldChange, move |msg| {
            log.borrow_mut().push(format!("second:{}", msg.name));
            Ok(())
        });

        let report = bus.emit_change(FieldMessage::new("a", 1));

        assert_eq!(
            *order.borrow(),
            vec!["first:a", "second:a", "first:b", "second:b"]
        );
        assert_eq!(report.deferred, 1);
        assert_eq!(report.delivered, 4);
    }

    #[test]
    fn test_deferred_limit() {
        let reporter = CollectingReporter::new();
        let bus = FieldBus::with_config(BusConfig {
            deferred_limit: 3,
            ..BusConfig::default()
        })
        .with_reporter(reporter.clone());

        let relay = bus.clone();
        let _echo = bus.subscribe(Channel::FieldChange, move |msg| {
            let _ = relay.emit_change(msg.clone());
            Ok(())
        });

        let report = bus.emit_change(FieldMessage::new("loop", 1));

        assert_eq!(report.deferred, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(
            reporter.bus_errors(),
            vec![BusError::DeferredLimitExceeded {
                channel: Channel::FieldChange,
                limit: 3,
                dropped: 1,
            }]
        );
        assert!(!bus.is_delivering());
    }

    #[test]
    fn test_allocate_uid_increases() {
        let bus = FieldBus::new();
        let a = bus.allocate_uid();
        let b = bus.allocate_uid();
        assert!(b > a);
    }
}
