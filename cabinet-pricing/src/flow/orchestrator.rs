//! Submission orchestration over a [`CabinetApi`].
//!
//! [`CabinetFlow`] forwards final selections to the backend. It never retries:
//! a failed submission is returned to the caller, except for the single
//! expired-subscription case that continues as a purchase.

use tokio::sync::Mutex;
use tracing::{instrument, warn};

use super::guard::{SubmissionGuard, SubmissionKind, SubmissionTicket};
use crate::{
    addons::{DeviceAddonCost, DeviceReduction, ServerEditSession},
    catalog::{Tariff, TariffId, TrafficPackage},
    error::{PricingError, Result, ServiceFailure},
    pricing::PromoSnapshot,
    purchase::PurchaseQuote,
    service::{
        CabinetApi, DeviceAddRequest, DeviceReduceRequest, MutationResult, PurchaseRequest,
        ServerUpdateRequest, SwitchRequest, TrafficPurchaseRequest,
    },
    switch::{PreviewSlot, SwitchPreview, SwitchResolution, resolve_switch_failure},
};

/// Outcome of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// The submission was sent and answered.
    Completed(T),
    /// Another submission of the same kind was in flight; nothing was sent.
    Ignored,
}

impl<T> Submission<T> {
    /// Returns the completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Ignored => None,
        }
    }

    /// Returns `true` if nothing was sent.
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Result of a switch submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The backend switched the tariff.
    Switched(MutationResult),
    /// The subscription had expired; continue with a purchase of this period.
    PurchaseFlow {
        /// Tariff to preselect.
        tariff_id: TariffId,
        /// Period to preselect.
        period_days: u32,
    },
}

/// Tariffs and promo fetched together for one session.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Tariff catalog.
    pub tariffs: Vec<Tariff>,
    /// Promo discount at fetch time.
    pub promo: PromoSnapshot,
}

/// Orchestrates previews and submissions against the cabinet backend.
#[derive(Debug)]
pub struct CabinetFlow<A> {
    api: A,
    guard: SubmissionGuard,
    switch_preview: Mutex<PreviewSlot<SwitchPreview>>,
}

impl<A: CabinetApi> CabinetFlow<A> {
    /// Wraps a backend client.
    pub fn new(api: A) -> Self {
        Self { api, guard: SubmissionGuard::new(), switch_preview: Mutex::new(PreviewSlot::new()) }
    }

    /// The wrapped backend client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Fetches the tariffs and the promo concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<CatalogSnapshot> {
        let (tariffs, promo) = tokio::try_join!(self.api.tariffs(), self.api.promo_discount())?;
        Ok(CatalogSnapshot { tariffs, promo })
    }

    /// Makes `target` the switch target, discarding a preview for any other tariff.
    pub async fn select_switch_target(&self, target: TariffId) {
        self.switch_preview.lock().await.select_target(target);
    }

    /// Fetches the switch preview for `target` and keeps it for confirmation.
    ///
    /// Returns `None` if the target changed while the preview was loading; the
    /// stale preview is dropped.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self), fields(tariff_id = %target))]
    pub async fn preview_switch(&self, target: TariffId) -> Result<Option<SwitchPreview>> {
        self.select_switch_target(target).await;
        let preview = self.api.preview_switch(target).await?;

        let mut slot = self.switch_preview.lock().await;
        if slot.store(target, preview.clone()) {
            Ok(Some(preview))
        } else {
            warn!(tariff_id = %target, "discarding switch preview for a stale target");
            Ok(None)
        }
    }

    /// The stored preview, only if it was computed for `target`.
    pub async fn switch_preview(&self, target: TariffId) -> Option<SwitchPreview> {
        self.switch_preview.lock().await.get(target).cloned()
    }

    /// Submits a switch to `target`.
    ///
    /// The stored preview for `target` is consumed. An expired-subscription
    /// rejection that asks for the purchase flow resolves to
    /// [`SwitchOutcome::PurchaseFlow`] seeded with the target's first period.
    /// Confirming without a prior preview is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidSelection`] without sending anything when
    /// another tariff has been selected since `target`. Returns
    /// [`PricingError::InvalidTariff`] when the backend asks for the purchase
    /// flow but `target` has no period to buy. Returns every other backend
    /// error unchanged.
    #[instrument(skip(self, target), fields(tariff_id = %target.id))]
    pub async fn confirm_switch(&self, target: &Tariff) -> Result<Submission<SwitchOutcome>> {
        let Some(_ticket) = self.acquire(SubmissionKind::Switch) else {
            return Ok(Submission::Ignored);
        };
        {
            let mut slot = self.switch_preview.lock().await;
            if slot.selects_other_than(target.id) {
                warn!(
                    tariff_id = %target.id,
                    selected = ?slot.target(),
                    "refusing switch to a stale target"
                );
                return Err(PricingError::InvalidSelection(format!(
                    "tariff {} is no longer the selected switch target",
                    target.id
                )));
            }
            slot.take_for(target.id);
        }

        let request = SwitchRequest::new(target.id);
        match self.api.switch_tariff(&request).await {
            Ok(result) => Ok(Submission::Completed(SwitchOutcome::Switched(result))),
            Err(error) => match resolve_switch_failure(&error, target) {
                SwitchResolution::PurchaseFlow { tariff_id, period_days } => {
                    Ok(Submission::Completed(SwitchOutcome::PurchaseFlow { tariff_id, period_days }))
                }
                SwitchResolution::Failed { .. }
                    if error.service_failure().is_some_and(ServiceFailure::requests_purchase_flow) =>
                {
                    warn!(
                        tariff_id = %target.id,
                        "expired subscription cannot fall back to a tariff without periods"
                    );
                    Err(PricingError::InvalidTariff(format!(
                        "tariff {} has no period to purchase",
                        target.id
                    )))
                }
                SwitchResolution::Failed { .. } => Err(error),
            },
        }
    }

    /// Submits a priced purchase.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, quote), fields(tariff_id = %quote.tariff_id, period_days = quote.period_days))]
    pub async fn purchase(&self, quote: &PurchaseQuote) -> Result<Submission<MutationResult>> {
        let Some(_ticket) = self.acquire(SubmissionKind::Purchase) else {
            return Ok(Submission::Ignored);
        };
        let request = PurchaseRequest::from_quote(quote);
        self.api.purchase(&request).await.map(Submission::Completed)
    }

    /// Submits a traffic top-up.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, package), fields(gb = package.gb))]
    pub async fn purchase_traffic(
        &self,
        package: &TrafficPackage,
    ) -> Result<Submission<MutationResult>> {
        let Some(_ticket) = self.acquire(SubmissionKind::Traffic) else {
            return Ok(Submission::Ignored);
        };
        let request = TrafficPurchaseRequest::new(package);
        self.api.purchase_traffic(&request).await.map(Submission::Completed)
    }

    /// Submits a device add-on.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, cost), fields(devices = cost.devices_to_add))]
    pub async fn add_devices(&self, cost: &DeviceAddonCost) -> Result<Submission<MutationResult>> {
        let Some(_ticket) = self.acquire(SubmissionKind::Devices) else {
            return Ok(Submission::Ignored);
        };
        let request = DeviceAddRequest::new(cost);
        self.api.add_devices(&request).await.map(Submission::Completed)
    }

    /// Submits a device reduction.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, reduction), fields(target = reduction.target()))]
    pub async fn reduce_devices(
        &self,
        reduction: &DeviceReduction,
    ) -> Result<Submission<MutationResult>> {
        let Some(_ticket) = self.acquire(SubmissionKind::Devices) else {
            return Ok(Submission::Ignored);
        };
        let request = DeviceReduceRequest::new(reduction);
        self.api.reduce_devices(&request).await.map(Submission::Completed)
    }

    /// Submits a server edit. An edit without changes is not sent.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, session))]
    pub async fn update_servers(
        &self,
        session: &ServerEditSession,
    ) -> Result<Submission<MutationResult>> {
        if session.diff().is_empty() {
            return Ok(Submission::Completed(MutationResult {
                success: true,
                ..MutationResult::default()
            }));
        }
        let Some(_ticket) = self.acquire(SubmissionKind::Servers) else {
            return Ok(Submission::Ignored);
        };
        let request = ServerUpdateRequest::new(session);
        self.api.update_servers(&request).await.map(Submission::Completed)
    }

    fn acquire(&self, kind: SubmissionKind) -> Option<SubmissionTicket<'_>> {
        let ticket = self.guard.try_acquire(kind);
        if ticket.is_none() {
            warn!(?kind, "ignoring duplicate submission while one is in flight");
        }
        ticket
    }
}
