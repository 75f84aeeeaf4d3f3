#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fieldwire_bus::{Channel, FieldBus, FieldMessage, Subscription};

/// Shared log of `(subscriber label, message)` pairs in invocation order.
pub type Log = Rc<RefCell<Vec<(String, FieldMessage)>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Subscribes a handler that appends every message it sees to `log`.
pub fn record(bus: &FieldBus, channel: Channel, label: &str, log: &Log) -> Subscription {
    let label = label.to_string();
    let log = Rc::clone(log);
    bus.subscribe(channel, move |message| {
        log.borrow_mut().push((label.clone(), message.clone()));
        Ok(())
    })
}

/// Labels of the entries in `log`, in order.
pub fn labels(log: &Log) -> Vec<String> {
    log.borrow().iter().map(|(label, _)| label.clone()).collect()
}

/// Messages received by the subscriber called `label`.
pub fn received(log: &Log, label: &str) -> Vec<FieldMessage> {
    log.borrow()
        .iter()
        .filter(|(l, _)| l == label)
        .map(|(_, m)| m.clone())
        .collect()
}
