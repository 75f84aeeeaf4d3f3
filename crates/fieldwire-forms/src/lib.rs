//! # fieldwire-forms
//!
//! Form field widgets that publish their values on a [`fieldwire_bus`] bus,
//! plus the aggregate components that listen to them.
//!
//! This crate provides:
//! - Form field definitions and Bootstrap 5 widgets
//! - A number mask for currency inputs
//! - [`FieldProducer`] and [`MountedForm`]: mounted fields that emit on
//!   `field-mount` and `field-change`
//! - [`DetailsOfUse`]: a consumer deriving annual spend and support flags
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldwire_bus::FieldBus;
//! use fieldwire_forms::{
//!     details_of_use_form, DetailsOfUse, DetailsOfUseConfig, MountedForm,
//! };
//!
//! let bus = FieldBus::new();
//! let config = DetailsOfUseConfig::default();
//!
//! let spec = details_of_use_form(&config).unwrap();
//! let details = DetailsOfUse::attach(&bus, &config, spec.registry()).unwrap();
//! let mut form = MountedForm::mount(&bus, spec).unwrap();
//!
//! form.input("estimated_monthly_spend", "$500").unwrap();
//! form.input("jedi_migration", "yes").unwrap();
//!
//! assert_eq!(details.state().annual_spend_str(), "$6,000");
//! assert!(details.state().is_jedi_migration());
//! ```
//!
//! ## Using Field Helpers
//!
//! ```rust
//! use fieldwire_forms::fields::{checkbox_field, money_field, text_field, yes_no_field};
//! use fieldwire_forms::FormBuilder;
//!
//! let form = FormBuilder::new()
//!     .field(text_field("project", "Project name", true))
//!     .field(money_field("budget", "Monthly budget", true))
//!     .field(yes_no_field("migration", "Migrating?", false))
//!     .field(checkbox_field("agree", "I agree"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(form.registry().len(), 4);
//! ```

mod details_of_use;
mod error;
pub mod fields;
mod form;
mod mask;
mod producer;
pub mod widgets;

pub use details_of_use::{
    details_of_use_form, DetailsOfUse, DetailsOfUseConfig, DetailsOfUseHandle,
    DetailsOfUseSummary, ESTIMATED_MONTHLY_SPEND, JEDI_MIGRATION, TECHNICAL_SUPPORT_TEAM,
};
pub use error::{FormError, Result};
pub use form::{render_field, render_form, FormBuilder, FormFieldDef, FormSpec};
pub use mask::{format_dollars, NumberMask};
pub use producer::{FieldProducer, MountedForm};
