//! Mounted fields that publish their values on the bus.
//!
//! A [`FieldProducer`] is one live field widget. It announces its starting
//! value on `field-mount` exactly once, then emits `field-change` for every
//! accepted edit. A [`MountedForm`] mounts a whole [`FormSpec`] under one
//! parent component id.

use std::collections::BTreeMap;

use fieldwire_bus::{
    ComponentUid, EmitReport, FieldBus, FieldMessage, FieldRegistry, FieldValue, ValueKind,
};
use tracing::debug;

use crate::error::{FormError, Result};
use crate::form::{render_field, render_form, FormFieldDef, FormSpec};

/// One field widget bound to a bus.
#[derive(Debug)]
pub struct FieldProducer {
    def: FormFieldDef,
    bus: FieldBus,
    parent_uid: Option<ComponentUid>,
    value: FieldValue,
    mounted: bool,
}

impl FieldProducer {
    /// Creates an unmounted producer for a field definition.
    pub fn new(bus: &FieldBus, def: FormFieldDef, parent_uid: Option<ComponentUid>) -> Self {
        let value = def.starting_value();
        Self {
            def,
            bus: bus.clone(),
            parent_uid,
            value,
            mounted: false,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the kind of value the field carries.
    pub fn kind(&self) -> ValueKind {
        self.def.kind()
    }

    /// Returns the current value.
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Returns whether `mount` has run.
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Returns the field definition.
    pub const fn definition(&self) -> &FormFieldDef {
        &self.def
    }

    /// Announces the field and its starting value on `field-mount`.
    pub fn mount(&mut self) -> Result<EmitReport> {
        if self.mounted {
            return Err(FormError::AlreadyMounted(self.def.name.clone()));
        }
        self.mounted = true;
        debug!(field = %self.def.name, value = %self.value, "mounting field");
        Ok(self.bus.emit_mount(self.message()))
    }

    /// Applies raw user input and emits the parsed value on `field-change`.
    ///
    /// Input the widget cannot parse is rejected and nothing is emitted.
    pub fn input(&mut self, raw: &str) -> Result<EmitReport> {
        self.ensure_mounted()?;
        let value = self
            .def
            .widget
            .parse(raw)
            .map_err(|message| FormError::invalid(&self.def.name, message))?;
        Ok(self.commit(value))
    }

    /// Sets a typed value and emits it on `field-change`.
    pub fn set(&mut self, value: impl Into<FieldValue>) -> Result<EmitReport> {
        self.ensure_mounted()?;
        let value = value.into();
        if value.kind() != self.kind() {
            return Err(FormError::invalid(
                &self.def.name,
                format!("expected {}, got {}", self.kind(), value.describe()),
            ));
        }
        Ok(self.commit(value))
    }

    /// Formats the current value the way the widget shows it.
    pub fn display_value(&self) -> String {
        self.def.widget.display(&self.value)
    }

    /// Renders the field with its current value.
    pub fn render(&self) -> String {
        render_field(&self.def, Some(&self.display_value()))
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(FormError::NotMounted(self.def.name.clone()))
        }
    }

    fn commit(&mut self, value: FieldValue) -> EmitReport {
        debug!(field = %self.def.name, value = %value, "field changed");
        self.value = value;
        self.bus.emit_change(self.message())
    }

    fn message(&self) -> FieldMessage {
        FieldMessage {
            name: self.def.name.clone(),
            value: self.value.clone(),
            parent_uid: self.parent_uid,
        }
    }
}

/// A form whose fields are mounted on a bus.
#[derive(Debug)]
pub struct MountedForm {
    uid: ComponentUid,
    registry: FieldRegistry,
    fields: Vec<FieldProducer>,
}

impl MountedForm {
    /// Mounts every field of `spec`, in declaration order, under a freshly
    /// allocated parent id.
    pub fn mount(bus: &FieldBus, spec: FormSpec) -> Result<Self> {
        let uid = bus.allocate_uid();
        let (defs, registry) = spec.into_parts();
        debug!(form = %uid, fields = defs.len(), "mounting form");

        let mut fields = Vec::with_capacity(defs.len());
        for def in defs {
            let mut producer = FieldProducer::new(bus, def, Some(uid));
            let _ = producer.mount()?;
            fields.push(producer);
        }

        Ok(Self {
            uid,
            registry,
            fields,
        })
    }

    /// Returns the form's component id, the `parent_uid` of its messages.
    pub const fn uid(&self) -> ComponentUid {
        self.uid
    }

    /// Returns the registry of field names.
    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Returns the mounted fields in declaration order.
    pub fn fields(&self) -> &[FieldProducer] {
        &self.fields
    }

    /// Returns a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldProducer> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns a field by name, mutably.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldProducer> {
        self.fields.iter_mut().find(|field| field.name() == name)
    }

    /// Feeds raw user input to a field.
    pub fn input(&mut self, name: &str, raw: &str) -> Result<EmitReport> {
        self.require(name)?.input(raw)
    }

    /// Sets a typed value on a field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<EmitReport> {
        self.require(name)?.set(value)
    }

    /// Returns the current value of every field.
    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|field| (field.name().to_string(), field.value().clone()))
            .collect()
    }

    /// Renders the whole form with current values.
    pub fn render(&self, action: &str, method: &str) -> String {
        let values: BTreeMap<String, String> = self
            .fields
            .iter()
            .map(|field| (field.name().to_string(), field.display_value()))
            .collect();
        render_form(
            self.fields.iter().map(FieldProducer::definition),
            &values,
            action,
            method,
        )
    }

    fn require(&mut self, name: &str) -> Result<&mut FieldProducer> {
        self.field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{checkbox_field, money_field, yes_no_field};
    use crate::form::FormBuilder;
    use fieldwire_bus::Channel;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &FieldBus, channel: Channel) -> (fieldwire_bus::Subscription, Rc<RefCell<Vec<FieldMessage>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = bus.subscribe(channel, move |msg| {
            sink.borrow_mut().push(msg.clone());
            Ok(())
        });
        (sub, seen)
    }

    #[test]
    fn test_mount_once() {
        let bus = FieldBus::new();
        let (_sub, mounts) = recorder(&bus, Channel::FieldMount);
        let mut field = FieldProducer::new(&bus, yes_no_field("jedi_migration", "M", false).initial("yes"), None);

        field.mount().unwrap();
        assert_eq!(
            field.mount().unwrap_err(),
            FormError::AlreadyMounted("jedi_migration".into())
        );
        assert_eq!(*mounts.borrow(), vec![FieldMessage::new("jedi_migration", "yes")]);
    }

    #[test]
    fn test_input_before_mount() {
        let bus = FieldBus::new();
        let mut field = FieldProducer::new(&bus, money_field("spend", "Spend", false), None);
        assert_eq!(
            field.input("5").unwrap_err(),
            FormError::NotMounted("spend".into())
        );
    }

    #[test]
    fn test_money_input_emits_number() {
        let bus = FieldBus::new();
        let (_sub, changes) = recorder(&bus, Channel::FieldChange);
        let parent = bus.allocate_uid();
        let mut field = FieldProducer::new(&bus, money_field("spend", "Spend", false), Some(parent));
        field.mount().unwrap();

        let report = field.input("$1,500").unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(field.value(), &FieldValue::from(1500));
        assert_eq!(field.display_value(), "$1,500");
        assert_eq!(
            *changes.borrow(),
            vec![FieldMessage::new("spend", 1500).with_parent(parent)]
        );
    }

    #[test]
    fn test_rejected_input_emits_nothing() {
        let bus = FieldBus::new();
        let (_sub, changes) = recorder(&bus, Channel::FieldChange);
        let mut field = FieldProducer::new(&bus, yes_no_field("m", "M", false), None);
        field.mount().unwrap();

        assert!(matches!(field.input("maybe"), Err(FormError::InvalidValue { .. })));
        assert!(matches!(field.set(3), Err(FormError::InvalidValue { .. })));
        assert!(changes.borrow().is_empty());
        assert_eq!(field.value(), &FieldValue::from(""));
    }

    #[test]
    fn test_mounted_form() {
        let bus = FieldBus::new();
        let (_sub, mounts) = recorder(&bus, Channel::FieldMount);
        let spec = FormBuilder::new()
            .field(money_field("spend", "Spend", true))
            .field(checkbox_field("agree", "Agree"))
            .build()
            .unwrap();

        let mut form = MountedForm::mount(&bus, spec).unwrap();
        let names: Vec<String> = mounts.borrow().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["spend", "agree"]);
        assert!(mounts.borrow().iter().all(|m| m.parent_uid == Some(form.uid())));

        form.input("agree", "on").unwrap();
        assert_eq!(form.values()["agree"], FieldValue::from(true));
        assert_eq!(
            form.input("missing", "x").unwrap_err(),
            FormError::UnknownField("missing".into())
        );

        let html = form.render("/details", "POST");
        assert!(html.contains("checked"));
        assert!(html.contains(r#"value="$0""#));
    }
}
