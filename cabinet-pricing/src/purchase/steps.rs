//! Purchase wizard step planning.
//!
//! The wizard always opens on the period choice and ends on confirmation. The
//! steps in between depend only on what the chosen period lets the subscriber
//! decide.

use serde::{Deserialize, Serialize};

use crate::catalog::{ServerOption, TariffPeriod};

/// Case-insensitive server-name marker for capacity reserved to trials.
pub const DEFAULT_TRIAL_SERVER_MARKER: &str = "trial";

/// One step of the purchase wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStep {
    /// Choose the period.
    Period,
    /// Choose a traffic option.
    Traffic,
    /// Choose servers.
    Servers,
    /// Choose the device count.
    Devices,
    /// Review and confirm.
    Confirm,
}

/// Derives the ordered wizard steps for a period.
///
/// - `traffic` iff the period's traffic is selectable and has at least one option
/// - `servers` iff more than one server is available
/// - `devices` iff the device range has `max > min`
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{
///     catalog::TariffPeriod,
///     purchase::{PurchaseStep, build_purchase_steps},
/// };
///
/// let period: TariffPeriod = serde_json::from_str(
///     r#"{ "days": 30, "price_kopeks": 19900, "devices": { "min": 3, "max": 3 } }"#,
/// ).unwrap();
///
/// assert_eq!(
///     build_purchase_steps(&period, 1),
///     vec![PurchaseStep::Period, PurchaseStep::Confirm],
/// );
/// ```
#[must_use]
pub fn build_purchase_steps(
    period: &TariffPeriod,
    available_servers_count: usize,
) -> Vec<PurchaseStep> {
    let mut steps = vec![PurchaseStep::Period];

    if period.traffic.selectable && !period.traffic.options.is_empty() {
        steps.push(PurchaseStep::Traffic);
    }
    if available_servers_count > 1 {
        steps.push(PurchaseStep::Servers);
    }
    if period.devices.is_adjustable() {
        steps.push(PurchaseStep::Devices);
    }

    steps.push(PurchaseStep::Confirm);
    steps
}

/// Filters a period's servers to the ones the subscriber may select.
///
/// Unavailable servers are always dropped. When the subscription being
/// purchased is itself a trial, servers whose name contains the trial marker
/// (case-insensitive) are dropped too.
#[must_use]
pub fn available_servers_for_period(
    period: &TariffPeriod,
    is_trial_subscription: bool,
) -> Vec<&ServerOption> {
    available_servers_with_marker(period, is_trial_subscription, DEFAULT_TRIAL_SERVER_MARKER)
}

/// Same as [`available_servers_for_period`] with a configurable trial marker.
#[must_use]
pub fn available_servers_with_marker<'a>(
    period: &'a TariffPeriod,
    is_trial_subscription: bool,
    trial_marker: &str,
) -> Vec<&'a ServerOption> {
    let marker = trial_marker.to_lowercase();

    period
        .servers
        .iter()
        .filter(|server| server.is_available)
        .filter(|server| {
            !is_trial_subscription
                || marker.is_empty()
                || !server.name.to_lowercase().contains(&marker)
        })
        .collect()
}

/// Cursor over a built step list.
///
/// Rebuild the wizard whenever the chosen period changes; the cursor never
/// outlives the step list it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseWizard {
    steps: Vec<PurchaseStep>,
    position: usize,
}

impl PurchaseWizard {
    /// Builds the wizard for a period, positioned on the first step.
    #[must_use]
    pub fn new(period: &TariffPeriod, available_servers_count: usize) -> Self {
        Self { steps: build_purchase_steps(period, available_servers_count), position: 0 }
    }

    /// All steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[PurchaseStep] {
        &self.steps
    }

    /// The current step.
    #[must_use]
    pub fn current(&self) -> PurchaseStep {
        self.steps.get(self.position).copied().unwrap_or(PurchaseStep::Confirm)
    }

    /// Returns `true` on the confirmation step.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 >= self.steps.len()
    }

    /// Moves forward and returns the new step; stays on the last step.
    pub fn next(&mut self) -> PurchaseStep {
        if !self.is_last() {
            self.position += 1;
        }
        self.current()
    }

    /// Moves back and returns the new step; stays on the first step.
    pub fn back(&mut self) -> PurchaseStep {
        self.position = self.position.saturating_sub(1);
        self.current()
    }
}
