//! Server add/remove editing for an existing subscription.
//!
//! A [`ServerEditSession`] captures the connected servers once, as an
//! immutable [`ServerBaseline`]. Toggling only touches the live selection, so
//! the diff is always taken against what the subscription had when editing
//! started, never against an intermediate state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ServerId, ServerOption},
    error::{PricingError, Result},
    money::Kopeks,
};

/// Servers connected when an edit session was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBaseline(BTreeSet<ServerId>);

impl ServerBaseline {
    /// Returns `true` if the server was connected at baseline.
    #[must_use]
    pub fn contains(&self, id: &ServerId) -> bool {
        self.0.contains(id)
    }

    /// Iterates the baseline servers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerId> {
        self.0.iter()
    }

    /// Number of baseline servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Changes between the baseline and the live selection, each sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDiff {
    /// Selected but not in the baseline.
    pub added: Vec<ServerId>,
    /// In the baseline but no longer selected.
    pub removed: Vec<ServerId>,
    /// In both.
    pub unchanged: Vec<ServerId>,
}

impl ServerDiff {
    /// Returns `true` if nothing was added or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// An in-progress server edit.
#[derive(Debug, Clone)]
pub struct ServerEditSession {
    baseline: ServerBaseline,
    selected: BTreeSet<ServerId>,
}

impl ServerEditSession {
    /// Opens a session over the currently connected servers.
    #[must_use]
    pub fn open<I>(connected: I) -> Self
    where
        I: IntoIterator<Item = ServerId>,
    {
        let baseline: BTreeSet<ServerId> = connected.into_iter().collect();
        Self { selected: baseline.clone(), baseline: ServerBaseline(baseline) }
    }

    /// The servers connected when the session was opened.
    #[must_use]
    pub const fn baseline(&self) -> &ServerBaseline {
        &self.baseline
    }

    /// Flips the selection of a server; returns whether it is now selected.
    pub fn toggle(&mut self, id: &ServerId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Returns `true` if the server is currently selected.
    #[must_use]
    pub fn is_selected(&self, id: &ServerId) -> bool {
        self.selected.contains(id)
    }

    /// Currently selected servers, in id order.
    #[must_use]
    pub fn selected(&self) -> Vec<ServerId> {
        self.selected.iter().cloned().collect()
    }

    /// Compares the live selection against the baseline.
    #[must_use]
    pub fn diff(&self) -> ServerDiff {
        let baseline = &self.baseline.0;
        ServerDiff {
            added: self.selected.difference(baseline).cloned().collect(),
            removed: baseline.difference(&self.selected).cloned().collect(),
            unchanged: self.selected.intersection(baseline).cloned().collect(),
        }
    }

    /// Cost of the added servers, from their catalog prices.
    ///
    /// Catalog prices are already prorated to the subscription's remaining
    /// days. Removing a server is free and refunds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidSelection`] if an added server is missing
    /// from the catalog or unavailable.
    pub fn cost(&self, catalog: &[ServerOption]) -> Result<Kopeks> {
        self.selected
            .difference(&self.baseline.0)
            .map(|id| {
                catalog
                    .iter()
                    .find(|server| &server.uuid == id && server.is_available)
                    .map(|server| server.price_kopeks)
                    .ok_or_else(|| {
                        PricingError::InvalidSelection(format!("server {id} is not available"))
                    })
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn id(raw: &str) -> ServerId {
        ServerId::new(raw)
    }

    fn catalog() -> Vec<ServerOption> {
        [("nl", 2_000, true), ("de", 1_500, true), ("fi", 1_000, true), ("us", 3_000, false)]
            .into_iter()
            .map(|(uuid, price, is_available)| ServerOption {
                uuid: id(uuid),
                name: uuid.to_uppercase(),
                is_available,
                price_kopeks: Kopeks::new(price),
                country_code: None,
            })
            .collect()
    }

    #[test]
    fn test_fresh_session_has_empty_diff() {
        let session = ServerEditSession::open([id("nl"), id("de")]);
        let diff = session.diff();
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, vec![id("de"), id("nl")]);
        assert_eq!(session.cost(&catalog()).unwrap(), Kopeks::ZERO);
    }

    #[test]
    fn test_add_and_remove() {
        let mut session = ServerEditSession::open([id("nl"), id("de")]);
        assert!(session.toggle(&id("fi")));
        assert!(!session.toggle(&id("nl")));

        let diff = session.diff();
        assert_eq!(diff.added, vec![id("fi")]);
        assert_eq!(diff.removed, vec![id("nl")]);
        assert_eq!(diff.unchanged, vec![id("de")]);
        assert_eq!(session.cost(&catalog()).unwrap(), Kopeks::new(1_000));
    }

    #[test]
    fn test_baseline_survives_toggles() {
        let mut session = ServerEditSession::open([id("nl")]);
        session.toggle(&id("nl"));
        session.toggle(&id("de"));
        session.toggle(&id("nl"));

        assert!(session.baseline().contains(&id("nl")));
        assert!(!session.baseline().contains(&id("de")));
        assert_eq!(session.baseline().len(), 1);
        assert_eq!(session.diff().added, vec![id("de")]);
        assert!(session.diff().removed.is_empty());
    }

    #[test]
    fn test_removal_is_free() {
        let mut session = ServerEditSession::open([id("nl"), id("de")]);
        session.toggle(&id("nl"));
        assert_eq!(session.cost(&catalog()).unwrap(), Kopeks::ZERO);
    }

    #[test]
    fn test_unknown_or_unavailable_added_rejected() {
        let mut session = ServerEditSession::open([]);
        session.toggle(&id("us"));
        assert!(matches!(session.cost(&catalog()), Err(PricingError::InvalidSelection(_))));

        let mut session = ServerEditSession::open([]);
        session.toggle(&id("mars"));
        assert!(session.cost(&catalog()).is_err());
    }

    #[test]
    fn test_unknown_baseline_server_is_not_priced() {
        let session = ServerEditSession::open([id("legacy")]);
        assert_eq!(session.cost(&catalog()).unwrap(), Kopeks::ZERO);
    }

    proptest! {
        #[test]
        fn test_diff_partitions_selection(
            baseline in proptest::collection::vec(0u8..12, 0..8),
            toggles in proptest::collection::vec(0u8..12, 0..20),
        ) {
            let mut session = ServerEditSession::open(baseline.iter().map(|n| id(&n.to_string())));
            for n in &toggles {
                session.toggle(&id(&n.to_string()));
            }
            let diff = session.diff();

            for added in &diff.added {
                prop_assert!(!diff.removed.contains(added));
            }
            let mut union: Vec<ServerId> = diff.added.iter().chain(&diff.unchanged).cloned().collect();
            union.sort();
            prop_assert_eq!(union, session.selected());
        }
    }
}
