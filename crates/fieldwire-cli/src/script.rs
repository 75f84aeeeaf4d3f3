//! Replay scripts: a JSON list of emits and user inputs applied to a
//! mounted details-of-use form.

use std::path::Path;

use anyhow::Context;
use fieldwire_bus::{
    BusError, Channel, CollectingReporter, EmitReport, ErrorReporter, FieldBus, FieldMessage,
    FieldValue, HandlerFailure, TracingReporter,
};
use fieldwire_forms::{
    details_of_use_form, DetailsOfUse, DetailsOfUseConfig, DetailsOfUseHandle,
    DetailsOfUseSummary, MountedForm,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One replay step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Publishes a message on a channel.
    ///
    /// A `field-change` for a field of the form goes through that field, so
    /// the form keeps its value. Anything else goes straight to the bus.
    Emit {
        channel: Channel,
        name: String,
        value: FieldValue,
    },
    /// Feeds raw text to a mounted field, as a user would type it.
    Input { input: String, raw: String },
}

/// Parses a script from JSON text.
pub fn parse(text: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(text).context("invalid replay script")
}

/// Reads and parses a script file.
pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("in {}", path.display()))
}

/// Logs failures and keeps them for the final report.
#[derive(Debug, Clone, Default)]
struct ReplayReporter {
    log: TracingReporter,
    collected: CollectingReporter,
}

impl ErrorReporter for ReplayReporter {
    fn handler_failed(&self, failure: &HandlerFailure) {
        self.log.handler_failed(failure);
        self.collected.handler_failed(failure);
    }

    fn bus_error(&self, error: &BusError) {
        self.log.bus_error(error);
        self.collected.bus_error(error);
    }
}

/// Result of a replay run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayOutcome {
    /// Steps that reached the bus.
    pub applied: usize,
    /// Steps the form refused.
    pub rejected: usize,
    /// Handler invocations that failed.
    pub handler_failures: usize,
    /// Derived values after the last step.
    pub summary: DetailsOfUseSummary,
}

/// A details-of-use form and its aggregate, mounted on a private bus.
pub struct Replay {
    bus: FieldBus,
    form: MountedForm,
    details: DetailsOfUseHandle,
    reporter: ReplayReporter,
    applied: usize,
    rejected: usize,
}

impl Replay {
    /// Mounts the form and attaches the aggregate, both seeded from
    /// `config`.
    pub fn start(config: &DetailsOfUseConfig) -> anyhow::Result<Self> {
        let reporter = ReplayReporter::default();
        let bus = FieldBus::new().with_reporter(reporter.clone());
        let spec = details_of_use_form(config)?;
        let details = DetailsOfUse::attach(&bus, config, spec.registry())?;
        let form = MountedForm::mount(&bus, spec)?;
        Ok(Self {
            bus,
            form,
            details,
            reporter,
            applied: 0,
            rejected: 0,
        })
    }

    /// Applies one step.
    ///
    /// Input the form refuses is logged and counted, not fatal.
    pub fn apply(&mut self, step: &Step) -> Option<EmitReport> {
        let result = match step {
            Step::Emit {
                channel: Channel::FieldChange,
                name,
                value,
            } if self.form.field(name).is_some() => self.form.set(name, value.clone()),
            Step::Emit {
                channel,
                name,
                value,
            } => Ok(self
                .bus
                .emit(*channel, FieldMessage::new(name.as_str(), value.clone()))),
            Step::Input { input, raw } => self.form.input(input, raw),
        };

        match result {
            Ok(report) => {
                debug!(?report, "step applied");
                self.applied += 1;
                Some(report)
            }
            Err(err) => {
                warn!(error = %err, "step rejected");
                self.rejected += 1;
                None
            }
        }
    }

    /// Applies every step in order.
    pub fn run(&mut self, steps: &[Step]) {
        for step in steps {
            let _ = self.apply(step);
        }
    }

    /// Returns the counters and the current derived values.
    pub fn outcome(&self) -> ReplayOutcome {
        ReplayOutcome {
            applied: self.applied,
            rejected: self.rejected,
            handler_failures: self.reporter.collected.failures().len(),
            summary: self.details.summary(),
        }
    }

    /// Renders the form with its current values.
    pub fn render(&self, action: &str, method: &str) -> String {
        self.form.render(action, method)
    }
}

impl std::fmt::Debug for Replay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replay")
            .field("form", &self.form.uid())
            .field("applied", &self.applied)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

/// Formats an outcome for the terminal.
pub fn format_outcome(outcome: &ReplayOutcome) -> String {
    let summary = &outcome.summary;
    let answer = |selected: bool, yes: bool| match (selected, yes) {
        (false, _) => "unanswered",
        (true, true) => "yes",
        (true, false) => "no",
    };
    format!(
        "steps applied:            {}\n\
         steps rejected:           {}\n\
         handler failures:         {}\n\
         monthly spend:            {}\n\
         annual spend:             {}\n\
         migrating:                {}\n\
         technical support team:   {}\n",
        outcome.applied,
        outcome.rejected,
        outcome.handler_failures,
        summary.estimated_monthly_spend,
        summary.annual_spend_str,
        answer(summary.jedi_migration_option_selected, summary.is_jedi_migration),
        if summary.has_technical_support_team {
            "yes"
        } else {
            "no"
        },
    )
}
