//! Error types for the cabinet pricing engine.
//!
//! The pure calculators in [`pricing`](crate::pricing), [`purchase`](crate::purchase),
//! [`addons`](crate::addons) and [`switch`](crate::switch) are total and never return
//! these errors for well-typed input. Errors come from three places:
//!
//! - **Selections** ([`PricingError::InvalidSelection`]): a caller referenced a traffic
//!   option, server or device count the catalog does not offer
//! - **External failures** ([`PricingError::Http`], [`PricingError::Service`],
//!   [`PricingError::Decode`]): the cabinet backend could not be reached or rejected
//!   a request
//! - **Catalog data** ([`PricingError::InvalidTariff`]): a tariff cannot serve the
//!   operation, such as an expired-subscription fallback into a tariff without periods
//! - **Configuration** ([`PricingError::Config`]): invalid TOML settings
//!
//! Insufficient balance is deliberately *not* an error for previews: it is computed
//! up front as a [`BalanceCheck`](crate::pricing::BalanceCheck). It only shows up here
//! when the backend rejects a submission with an
//! [`InsufficientBalance`](ServiceFailure::InsufficientBalance) payload.
//!
//! # Examples
//!
//! ```
//! use cabinet_pricing::error::{PricingError, Result};
//!
//! fn require_period(days: u32) -> Result<u32> {
//!     if days == 0 {
//!         return Err(PricingError::InvalidSelection("period must be at least one day".into()));
//!     }
//!     Ok(days)
//! }
//! ```

use thiserror::Error;

use crate::money::{Kopeks, MoneyFormatter};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur in the pricing engine.
///
/// # Error Recovery
///
/// - **Transient errors** ([`Http`](Self::Http)): surface to the user; retrying is an
///   explicit user action, never automatic
/// - **Selection errors** ([`InvalidSelection`](Self::InvalidSelection)): rebuild the
///   selection from the current catalog
/// - **Tariff errors** ([`InvalidTariff`](Self::InvalidTariff)): refetch the catalog;
///   the tariff cannot be offered as it stands
/// - **Service rejections** ([`Service`](Self::Service)): inspect the
///   [`ServiceFailure`]; an expired subscription may be re-routed into a purchase
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum PricingError {
    /// HTTP request to the cabinet backend failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The cabinet backend rejected the request.
    #[error("cabinet service rejected the request: {0}")]
    Service(ServiceFailure),

    /// The backend answered with a body that could not be decoded.
    #[error("invalid service response: {0}")]
    Decode(String),

    /// A selection references something the catalog does not offer.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// A tariff is malformed (for example, it has no periods).
    #[error("invalid tariff: {0}")]
    InvalidTariff(String),

    /// Configuration failed validation or could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PricingError {
    /// Returns the service failure carried by this error, if any.
    #[must_use]
    pub fn service_failure(&self) -> Option<&ServiceFailure> {
        match self {
            Self::Service(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A rejection reported by the purchase-execution service.
///
/// Decoded from the failure payloads the backend attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceFailure {
    /// Balance does not cover the operation
    /// (`code = insufficient_balance | insufficient_funds`).
    InsufficientBalance {
        /// Amount the operation costs.
        required: Kopeks,
        /// Balance at the time of the attempt.
        balance: Kopeks,
        /// Amount the subscriber still has to top up.
        missing: Kopeks,
    },

    /// The subscription expired before a tariff switch could be applied
    /// (`error_code = subscription_expired`).
    SubscriptionExpired {
        /// Whether the backend asks the client to continue with a fresh purchase.
        use_purchase_flow: bool,
    },

    /// Any other rejection.
    Other {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend, if any.
        message: String,
    },
}

impl ServiceFailure {
    /// Returns `true` if the backend asks to continue with a fresh purchase.
    #[must_use]
    pub const fn requests_purchase_flow(&self) -> bool {
        matches!(self, Self::SubscriptionExpired { use_purchase_flow: true })
    }

    /// Returns a message suitable for showing to the subscriber.
    ///
    /// Amounts are rendered with the default [`MoneyFormatter`]; use
    /// [`user_message_with`](Self::user_message_with) for other currencies.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.user_message_with(&MoneyFormatter::default())
    }

    /// Returns a message for the subscriber with amounts rendered by `formatter`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabinet_pricing::{
    ///     error::ServiceFailure,
    ///     money::{CurrencyFormat, Kopeks, MoneyFormatter},
    /// };
    ///
    /// let failure = ServiceFailure::InsufficientBalance {
    ///     required: Kopeks::new(10_000),
    ///     balance: Kopeks::new(3_950),
    ///     missing: Kopeks::new(6_050),
    /// };
    /// let usd = MoneyFormatter::new(CurrencyFormat::usd());
    /// assert_eq!(failure.user_message_with(&usd), "insufficient balance, $60.50 missing");
    /// ```
    #[must_use]
    pub fn user_message_with(&self, formatter: &MoneyFormatter) -> String {
        match self {
            Self::InsufficientBalance { missing, .. } => {
                format!("insufficient balance, {} missing", formatter.format(*missing))
            }
            Self::SubscriptionExpired { .. } => "subscription has expired".to_owned(),
            Self::Other { message, .. } if !message.is_empty() => message.clone(),
            Self::Other { status, .. } => format!("request failed with status {status}"),
        }
    }
}

impl std::fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientBalance { required, balance, missing } => write!(
                f,
                "insufficient balance (required {}, balance {}, missing {})",
                required.get(),
                balance.get(),
                missing.get()
            ),
            Self::SubscriptionExpired { use_purchase_flow } => {
                write!(f, "subscription expired (use_purchase_flow={use_purchase_flow})")
            }
            Self::Other { status, message } => write!(f, "status {status}: {message}"),
        }
    }
}
