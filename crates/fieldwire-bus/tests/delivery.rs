//! Delivery guarantees of the field bus.

mod common;
use common::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fieldwire_bus::{Channel, FieldBus, FieldMessage, FieldValue};

#[test]
fn test_consumer_receives_change_exactly_once() {
    let bus = FieldBus::new();
    let log = new_log();
    let _a = record(&bus, Channel::FieldChange, "A", &log);

    let _ = bus.emit_change(FieldMessage::new("estimated_monthly_spend", 500));

    assert_eq!(
        received(&log, "A"),
        vec![FieldMessage::new("estimated_monthly_spend", 500)]
    );
}

#[test]
fn test_subscribers_run_in_registration_order() {
    let bus = FieldBus::new();
    let clock = Rc::new(Cell::new(0_u32));
    let entries = Rc::new(RefCell::new(Vec::new()));

    let mut subs = Vec::new();
    for label in ["A", "B"] {
        let clock = Rc::clone(&clock);
        let entries = Rc::clone(&entries);
        subs.push(bus.subscribe(Channel::FieldChange, move |_| {
            let started = clock.get();
            clock.set(started + 1);
            entries.borrow_mut().push((label, started));
            clock.set(clock.get() + 1);
            Ok(())
        }));
    }

    let _ = bus.emit_change(FieldMessage::new("x", 1));

    let entries = entries.borrow();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "A");
    assert_eq!(entries[1].0, "B");
    assert!(entries[0].1 < entries[1].1);
}

#[test]
fn test_unsubscribed_consumer_is_never_invoked() {
    let bus = FieldBus::new();
    let log = new_log();
    let a = record(&bus, Channel::FieldChange, "A", &log);

    bus.unsubscribe(&a);
    let _ = bus.emit_change(FieldMessage::new("x", 1));

    assert!(log.borrow().is_empty());
}

#[test]
fn test_late_subscriber_gets_no_replay() {
    let bus = FieldBus::new();
    let _ = bus.emit_mount(FieldMessage::new("jedi_migration", "yes"));

    let log = new_log();
    let _c = record(&bus, Channel::FieldMount, "C", &log);

    assert!(log.borrow().is_empty());
}

#[test]
fn test_derived_annual_spend() {
    let bus = FieldBus::new();
    let monthly = Rc::new(Cell::new(0.0_f64));

    let sink = Rc::clone(&monthly);
    let _consumer = bus.subscribe(Channel::FieldChange, move |message| {
        if message.name == "estimated_monthly_spend" {
            sink.set(message.value.coerce_number(&message.name)?);
        }
        Ok(())
    });

    let _ = bus.emit_change(FieldMessage::new("estimated_monthly_spend", 500));

    let annual_spend = monthly.get() * 12.0;
    assert!((annual_spend - 6000.0).abs() < f64::EPSILON);
}

#[test]
fn test_double_unsubscribe_leaves_others_alone() {
    let bus = FieldBus::new();
    let log = new_log();
    let a = record(&bus, Channel::FieldChange, "A", &log);
    let _b = record(&bus, Channel::FieldChange, "B", &log);

    a.release();
    a.release();

    let _ = bus.emit_change(FieldMessage::new("x", 1));
    assert_eq!(labels(&log), vec!["B"]);
}

#[test]
fn test_subscribe_during_delivery_waits_for_next_emit() {
    let bus = FieldBus::new();
    let log = new_log();
    let late = Rc::new(RefCell::new(None));

    let registrar = bus.clone();
    let slot = Rc::clone(&late);
    let inner_log = Rc::clone(&log);
    let _a = bus.subscribe(Channel::FieldChange, move |_| {
        if slot.borrow().is_none() {
            *slot.borrow_mut() = Some(record(&registrar, Channel::FieldChange, "late", &inner_log));
        }
        Ok(())
    });

    let _ = bus.emit_change(FieldMessage::new("first", 1));
    assert!(received(&log, "late").is_empty());

    let _ = bus.emit_change(FieldMessage::new("second", 2));
    assert_eq!(
        received(&log, "late"),
        vec![FieldMessage::new("second", 2)]
    );
}

#[test]
fn test_queued_emit_skips_handlers_registered_after_it() {
    let bus = FieldBus::new();
    let log = new_log();

    let relay = bus.clone();
    let _echo = bus.subscribe(Channel::FieldChange, move |message| {
        if message.name == "first" {
            let report = relay.emit_change(FieldMessage::new("second", 2));
            assert!(report.queued);
        }
        Ok(())
    });

    let late = Rc::new(RefCell::new(None));
    let registrar = bus.clone();
    let slot = Rc::clone(&late);
    let inner_log = Rc::clone(&log);
    let _registrar = bus.subscribe(Channel::FieldChange, move |_| {
        if slot.borrow().is_none() {
            *slot.borrow_mut() = Some(record(&registrar, Channel::FieldChange, "late", &inner_log));
        }
        Ok(())
    });

    let report = bus.emit_change(FieldMessage::new("first", 1));
    assert_eq!(report.deferred, 1);
    assert!(received(&log, "late").is_empty());

    let _ = bus.emit_change(FieldMessage::new("third", 3));
    assert_eq!(received(&log, "late"), vec![FieldMessage::new("third", 3)]);
}

#[test]
fn test_unsubscribe_during_delivery_skips_rest_of_pass() {
    let bus = FieldBus::new();
    let log = new_log();
    let victim = Rc::new(RefCell::new(None));

    let target = Rc::clone(&victim);
    let _killer = bus.subscribe(Channel::FieldChange, move |_| {
        if let Some(sub) = target.borrow_mut().take() {
            drop(sub);
        }
        Ok(())
    });
    *victim.borrow_mut() = Some(record(&bus, Channel::FieldChange, "victim", &log));
    let _witness = record(&bus, Channel::FieldChange, "witness", &log);

    let report = bus.emit_change(FieldMessage::new("x", 1));

    assert_eq!(labels(&log), vec!["witness"]);
    assert_eq!(report.delivered, 2);
}

#[test]
fn test_parent_uid_is_context_not_routing() {
    let bus = FieldBus::new();
    let log = new_log();
    let _a = record(&bus, Channel::FieldChange, "A", &log);
    let _b = record(&bus, Channel::FieldChange, "B", &log);

    let parent = bus.allocate_uid();
    let _ = bus.emit_change(FieldMessage::new("x", FieldValue::Bool(true)).with_parent(parent));

    let all = log.borrow();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|(_, m)| m.parent_uid == Some(parent)));
}
