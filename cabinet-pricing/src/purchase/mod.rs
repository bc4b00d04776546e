//! New-subscription purchase wizard: step planning, server availability and totals.

pub mod quote;
pub mod steps;

pub use quote::{PurchaseQuote, PurchaseSelection};
pub use steps::{
    DEFAULT_TRIAL_SERVER_MARKER, PurchaseStep, PurchaseWizard, available_servers_for_period,
    available_servers_with_marker, build_purchase_steps,
};
