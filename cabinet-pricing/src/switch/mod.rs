//! Tariff switching: eligibility, previews and the expired-subscription fallback.
//!
//! The switch cost itself is never computed locally. The backend returns it as
//! a [`SwitchPreview`], which is kept in a [`PreviewSlot`] keyed by the target
//! tariff so a preview can only ever be confirmed for the tariff it describes.

pub mod eligibility;
pub mod fallback;
pub mod preview;

pub use eligibility::{SubscriptionState, can_switch};
pub use fallback::{SwitchResolution, resolve_switch_failure};
pub use preview::{PreviewSlot, SwitchPreview};
