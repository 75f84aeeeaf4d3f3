//! Field definitions, form building and form rendering.

use std::collections::BTreeMap;

use fieldwire_bus::{FieldRegistry, FieldValue, ValueKind};
use ironhtml::html;
use ironhtml_elements::Div;

use crate::error::{FormError, Result};
use crate::widgets::{empty_value, Widget, WidgetAttrs};

/// Definition of a form field.
pub struct FormFieldDef {
    /// Field name, unique within the form.
    pub name: String,
    /// Field label.
    pub label: String,
    /// Whether the field is marked as required.
    pub required: bool,
    /// The widget to render.
    pub widget: Box<dyn Widget>,
    /// Help text.
    pub help_text: Option<String>,
    /// Initial value.
    pub initial: Option<FieldValue>,
    /// Widget attributes.
    pub attrs: WidgetAttrs,
    /// Whether the field is disabled.
    pub disabled: bool,
}

impl std::fmt::Debug for FormFieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormFieldDef")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind())
            .field("required", &self.required)
            .field("help_text", &self.help_text)
            .field("initial", &self.initial)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl FormFieldDef {
    /// Creates a new field definition.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        widget: impl Widget + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
            widget: Box::new(widget),
            help_text: None,
            initial: None,
            attrs: WidgetAttrs::new(),
            disabled: false,
        }
    }

    /// Returns the kind of value this field carries.
    pub fn kind(&self) -> ValueKind {
        self.widget.kind()
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<FieldValue>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets a widget attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Disables the field.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The value the field starts with: its initial value, or the empty
    /// value of its kind.
    pub fn starting_value(&self) -> FieldValue {
        self.initial
            .clone()
            .unwrap_or_else(|| empty_value(self.kind()))
    }

    /// Checks that the initial value matches the widget's kind.
    fn check_initial(&self) -> Result<()> {
        match &self.initial {
            Some(value) if value.kind() != self.kind() => Err(FormError::invalid(
                &self.name,
                format!("initial value is {}, field expects {}", value.describe(), self.kind()),
            )),
            _ => Ok(()),
        }
    }
}

/// A validated set of field definitions.
///
/// Field names are unique; the registry lists them for consumers that bind
/// by name.
#[derive(Debug)]
pub struct FormSpec {
    fields: Vec<FormFieldDef>,
    registry: FieldRegistry,
}

impl FormSpec {
    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FormFieldDef] {
        &self.fields
    }

    /// Returns a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the registry of field names.
    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub(crate) fn into_parts(self) -> (Vec<FormFieldDef>, FieldRegistry) {
        (self.fields, self.registry)
    }
}

/// A simple form builder for creating forms programmatically.
#[derive(Debug, Default)]
pub struct FormBuilder {
    fields: Vec<FormFieldDef>,
}

impl FormBuilder {
    /// Creates a new form builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the form.
    #[must_use]
    pub fn field(mut self, field: FormFieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates field names and initial values and returns the form.
    pub fn build(self) -> Result<FormSpec> {
        let mut registry = FieldRegistry::new();
        for field in &self.fields {
            registry.register(field.name.as_str())?;
            field.check_initial()?;
        }
        Ok(FormSpec {
            fields: self.fields,
            registry,
        })
    }
}

/// Renders a form field with Bootstrap 5 styling.
///
/// `value` is the display value; when absent the field's initial value is
/// shown.
pub fn render_field(field: &FormFieldDef, value: Option<&str>) -> String {
    let id = format!("id_{}", field.name);

    let required_marker = if field.required { " *" } else { "" };
    let label_text = format!("{}{}", field.label, required_marker);

    let mut attrs = field.attrs.clone();
    attrs.set("id", &id);

    if field.disabled {
        attrs.set("disabled", "disabled");
    }

    if field.required {
        attrs.set("required", "required");
    }

    let initial = field
        .initial
        .as_ref()
        .map(|value| field.widget.display(value));
    let actual_value = value.or(initial.as_deref());
    let widget_html = field.widget.render(&field.name, actual_value, &attrs);

    let label_el = html! {
        label.for_(#id).class("form-label") { #label_text }
    };

    let help_text = field.help_text.clone();

    html! { div.class("mb-3") }
        .raw(label_el.render())
        .raw(&widget_html)
        .when(help_text.is_some(), |d| {
            d.child::<Div, _>(|h| {
                h.class("form-text")
                    .text(help_text.as_deref().unwrap_or(""))
            })
        })
        .render()
}

/// Renders a complete form with Bootstrap 5 styling.
///
/// `values` maps field names to display values.
pub fn render_form<'a>(
    fields: impl IntoIterator<Item = &'a FormFieldDef>,
    values: &BTreeMap<String, String>,
    action: &str,
    method: &str,
) -> String {
    let mut form = html! {
        form.action(#action).method(#method)
    };

    for field in fields {
        let value = values.get(&field.name).map(String::as_str);
        let field_html = render_field(field, value);
        form = form.child::<Div, _>(|d| d.raw(&field_html));
    }

    form = form.child::<Div, _>(|d| {
        let btn = html! {
            button.type_("submit").class("btn btn-primary") {
                "Submit"
            }
        };
        d.raw(btn.render())
    });

    form.render()
}
