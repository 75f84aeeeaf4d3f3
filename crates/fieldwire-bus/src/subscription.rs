//! Subscription handles.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Weak;

use crate::bus::BusInner;
use crate::channel::Channel;
use crate::error::HandlerError;
use crate::message::FieldMessage;

/// Identifier of one registration on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Handler = Box<dyn FnMut(&FieldMessage) -> Result<(), HandlerError>>;

/// A registered handler.
///
/// `active` is cleared on release so a delivery pass holding a snapshot
/// skips the handler from that point on.
pub(crate) struct Slot {
    pub(crate) id: SubscriptionId,
    pub(crate) active: Cell<bool>,
    pub(crate) handler: RefCell<Handler>,
}

/// Handle to a registered handler.
///
/// Releasing the handle, explicitly or by dropping it, unregisters the
/// handler. Releasing more than once is a no-op.
pub struct Subscription {
    id: SubscriptionId,
    channel: Channel,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub(crate) const fn new(id: SubscriptionId, channel: Channel, bus: Weak<BusInner>) -> Self {
        Self { id, channel, bus }
    }

    /// Returns the subscription id.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the channel this handle listens on.
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|bus| bus.contains(self.channel, self.id))
    }

    /// Unregisters the handler. Safe to call any number of times.
    pub fn release(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.channel, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
