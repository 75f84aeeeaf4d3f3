//! The "details of use" aggregate.
//!
//! Listens to the spend and support fields of its sibling widgets and keeps
//! derived values (annual spend, migration flags) current.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use fieldwire_bus::{bind_consumer, FieldBindings, FieldBus, FieldRegistry, FieldValue, Subscription};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::fields::{money_field, yes_no_field};
use crate::form::{FormBuilder, FormSpec};
use crate::mask::format_dollars;

/// Field carrying the estimated monthly spend, in dollars.
pub const ESTIMATED_MONTHLY_SPEND: &str = "estimated_monthly_spend";
/// Field carrying the migration answer (`"yes"`, `"no"` or `""`).
pub const JEDI_MIGRATION: &str = "jedi_migration";
/// Field carrying the support-team answer (`"yes"`, `"no"` or `""`).
pub const TECHNICAL_SUPPORT_TEAM: &str = "technical_support_team";

/// Initial data for the aggregate. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsOfUseConfig {
    /// Starting monthly spend.
    pub estimated_monthly_spend: f64,
    /// Starting migration answer.
    pub jedi_migration: String,
    /// Starting support-team answer.
    pub technical_support_team: String,
}

/// Local state of the aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsOfUse {
    /// Latest monthly spend.
    pub estimated_monthly_spend: f64,
    /// Latest migration answer.
    pub jedi_migration: String,
    /// Latest support-team answer.
    pub technical_support_team: String,
}

/// Derived values, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsOfUseSummary {
    /// Latest monthly spend.
    pub estimated_monthly_spend: f64,
    /// Monthly spend times twelve.
    pub annual_spend: f64,
    /// Annual spend formatted as dollars.
    pub annual_spend_str: String,
    /// Whether a migration answer was picked.
    pub jedi_migration_option_selected: bool,
    /// Whether the migration answer is yes.
    pub is_jedi_migration: bool,
    /// Whether the support-team answer is yes.
    pub has_technical_support_team: bool,
}

impl DetailsOfUse {
    /// Field names the aggregate listens to.
    pub const FIELDS: [&'static str; 3] =
        [ESTIMATED_MONTHLY_SPEND, JEDI_MIGRATION, TECHNICAL_SUPPORT_TEAM];

    /// Creates the state from initial data.
    pub fn from_config(config: &DetailsOfUseConfig) -> Self {
        Self {
            estimated_monthly_spend: config.estimated_monthly_spend,
            jedi_migration: config.jedi_migration.clone(),
            technical_support_team: config.technical_support_team.clone(),
        }
    }

    /// Monthly spend times twelve.
    pub fn annual_spend(&self) -> f64 {
        self.estimated_monthly_spend * 12.0
    }

    /// Annual spend formatted as dollars.
    pub fn annual_spend_str(&self) -> String {
        format_dollars(self.annual_spend())
    }

    /// Whether a migration answer was picked.
    pub fn jedi_migration_option_selected(&self) -> bool {
        !self.jedi_migration.is_empty()
    }

    /// Whether the answer to the migration question is yes.
    pub fn is_jedi_migration(&self) -> bool {
        self.jedi_migration == "yes"
    }

    /// Whether the answer to the support-team question is yes.
    pub fn has_technical_support_team(&self) -> bool {
        self.technical_support_team == "yes"
    }

    /// Snapshot of the derived values.
    pub fn summary(&self) -> DetailsOfUseSummary {
        DetailsOfUseSummary {
            estimated_monthly_spend: self.estimated_monthly_spend,
            annual_spend: self.annual_spend(),
            annual_spend_str: self.annual_spend_str(),
            jedi_migration_option_selected: self.jedi_migration_option_selected(),
            is_jedi_migration: self.is_jedi_migration(),
            has_technical_support_team: self.has_technical_support_team(),
        }
    }

    /// Setters for the three fields.
    pub fn bindings() -> FieldBindings<Self> {
        FieldBindings::new()
            .bind(ESTIMATED_MONTHLY_SPEND, |state: &mut Self, value: &FieldValue| {
                state.estimated_monthly_spend = value.coerce_number(ESTIMATED_MONTHLY_SPEND)?;
                Ok(())
            })
            .bind(JEDI_MIGRATION, |state: &mut Self, value: &FieldValue| {
                state.jedi_migration = value.coerce_text();
                Ok(())
            })
            .bind(TECHNICAL_SUPPORT_TEAM, |state: &mut Self, value: &FieldValue| {
                state.technical_support_team = value.coerce_text();
                Ok(())
            })
    }

    /// Creates the aggregate and subscribes it to `field-change`.
    ///
    /// Fails when `registry` lacks one of [`Self::FIELDS`].
    pub fn attach(
        bus: &FieldBus,
        config: &DetailsOfUseConfig,
        registry: &FieldRegistry,
    ) -> Result<DetailsOfUseHandle> {
        let state = Rc::new(RefCell::new(Self::from_config(config)));
        let subscription = bind_consumer(bus, Rc::clone(&state), Self::bindings(), registry)?;
        debug!(subscription = %subscription.id(), "details of use attached");
        Ok(DetailsOfUseHandle {
            state,
            subscription,
        })
    }
}

/// A live [`DetailsOfUse`] subscribed to a bus.
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct DetailsOfUseHandle {
    state: Rc<RefCell<DetailsOfUse>>,
    subscription: Subscription,
}

impl DetailsOfUseHandle {
    /// Borrows the current state.
    pub fn state(&self) -> Ref<'_, DetailsOfUse> {
        self.state.borrow()
    }

    /// Returns the derived values.
    pub fn summary(&self) -> DetailsOfUseSummary {
        self.state.borrow().summary()
    }

    /// Returns whether the aggregate is still subscribed.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Unsubscribes and returns the final state.
    pub fn detach(self) -> DetailsOfUse {
        self.subscription.release();
        let state = self.state.borrow().clone();
        state
    }
}

/// Builds the form whose fields the aggregate listens to, seeded with
/// `config`.
pub fn details_of_use_form(config: &DetailsOfUseConfig) -> Result<FormSpec> {
    FormBuilder::new()
        .field(
            money_field(ESTIMATED_MONTHLY_SPEND, "Estimated monthly spend", true)
                .initial(config.estimated_monthly_spend)
                .help_text("Best estimate of cloud spend per month"),
        )
        .field(
            yes_no_field(JEDI_MIGRATION, "Are you migrating an existing application?", true)
                .initial(config.jedi_migration.as_str()),
        )
        .field(
            yes_no_field(
                TECHNICAL_SUPPORT_TEAM,
                "Do you have a technical support team?",
                true,
            )
            .initial(config.technical_support_team.as_str()),
        )
        .build()
}
