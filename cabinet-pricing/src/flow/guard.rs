//! At-most-one-in-flight submission tracking.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Logical operation a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    /// New subscription purchase.
    Purchase,
    /// Tariff switch.
    Switch,
    /// Traffic top-up.
    Traffic,
    /// Device limit change.
    Devices,
    /// Server set change.
    Servers,
}

impl SubmissionKind {
    const COUNT: usize = 5;

    const fn index(self) -> usize {
        match self {
            Self::Purchase => 0,
            Self::Switch => 1,
            Self::Traffic => 2,
            Self::Devices => 3,
            Self::Servers => 4,
        }
    }
}

/// Tracks which operations have a submission in flight.
///
/// Each [`SubmissionKind`] has its own flag, so a purchase in flight does not
/// block a traffic top-up.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: [AtomicBool; SubmissionKind::COUNT],
}

impl SubmissionGuard {
    /// Creates a guard with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the operation, or returns `None` if a submission is outstanding.
    ///
    /// The claim is released when the returned ticket is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabinet_pricing::flow::{SubmissionGuard, SubmissionKind};
    ///
    /// let guard = SubmissionGuard::new();
    /// let ticket = guard.try_acquire(SubmissionKind::Purchase).unwrap();
    /// assert!(guard.try_acquire(SubmissionKind::Purchase).is_none());
    ///
    /// drop(ticket);
    /// assert!(guard.try_acquire(SubmissionKind::Purchase).is_some());
    /// ```
    #[must_use]
    pub fn try_acquire(&self, kind: SubmissionKind) -> Option<SubmissionTicket<'_>> {
        let flag = &self.in_flight[kind.index()];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionTicket { flag, kind })
    }

    /// Returns `true` if a submission of this kind is outstanding.
    #[must_use]
    pub fn is_in_flight(&self, kind: SubmissionKind) -> bool {
        self.in_flight[kind.index()].load(Ordering::Acquire)
    }
}

/// Claim on an operation; releases it on drop.
#[derive(Debug)]
#[must_use = "the claim is released as soon as the ticket is dropped"]
pub struct SubmissionTicket<'a> {
    flag: &'a AtomicBool,
    kind: SubmissionKind,
}

impl SubmissionTicket<'_> {
    /// The claimed operation.
    pub const fn kind(&self) -> SubmissionKind {
        self.kind
    }
}

impl Drop for SubmissionTicket<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_kinds_are_independent() {
        let guard = SubmissionGuard::new();
        let purchase = guard.try_acquire(SubmissionKind::Purchase).unwrap();
        assert_eq!(purchase.kind(), SubmissionKind::Purchase);

        let traffic = guard.try_acquire(SubmissionKind::Traffic);
        assert!(traffic.is_some());
        assert!(guard.is_in_flight(SubmissionKind::Purchase));
        assert!(!guard.is_in_flight(SubmissionKind::Switch));
    }

    #[test]
    fn test_released_on_drop() {
        let guard = SubmissionGuard::new();
        {
            let _ticket = guard.try_acquire(SubmissionKind::Devices).unwrap();
            assert!(guard.is_in_flight(SubmissionKind::Devices));
        }
        assert!(!guard.is_in_flight(SubmissionKind::Devices));
    }

    #[test]
    fn test_single_winner_across_threads() {
        let guard = Arc::new(SubmissionGuard::new());
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    // Hold the ticket until every thread has tried.
                    let ticket = guard.try_acquire(SubmissionKind::Switch);
                    let won = ticket.is_some();
                    barrier.wait();
                    won
                })
            })
            .collect();

        let winners = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
        assert_eq!(winners, 1);
    }
}
