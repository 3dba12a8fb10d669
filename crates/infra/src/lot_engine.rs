//! Stock & lot engine: sell-out detection and lot resets.
//!
//! Every purchase or sale mutation is followed by [`LotEngine::on_mutation`]
//! for the affected type. The check is recomputed from the watermark each
//! time, so calling it again with no new records is a no-op.

use chrono::{DateTime, Utc};

use poultrybook_core::{Clock, LotArchiveId, PoultryType, UserId};
use poultrybook_inventory::{CloseReason, LotArchive, LotTally, ResetWatermarks, current_lot_filter};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

use crate::error::EngineResult;
use crate::notify::{Notification, Notifier};
use crate::store::RecordStore;

/// Outcome of a lot check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotEvaluation {
    /// Stock is left (or nothing was bought yet).
    Open { remaining: i64 },
    /// The lot sold out and a new one starts at `reset_at`.
    Closed {
        /// `None` when the lot moved no money.
        archive: Option<LotArchive>,
        reset_at: DateTime<Utc>,
    },
}

impl LotEvaluation {
    pub fn is_closed(&self) -> bool {
        matches!(self, LotEvaluation::Closed { .. })
    }
}

pub struct LotEngine<'a> {
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
    notifier: &'a dyn Notifier,
}

impl<'a> LotEngine<'a> {
    pub fn new(store: &'a dyn RecordStore, clock: &'a dyn Clock, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            clock,
            notifier,
        }
    }

    /// Tally of the open lot of `poultry_type`.
    pub async fn current_tally(&self, user: UserId, poultry_type: &PoultryType) -> EngineResult<LotTally> {
        let resets = self.store.resets().list(user).await?;
        let (purchases, sales) = self.current_lot(user, poultry_type, &resets).await?;
        Ok(LotTally::of(poultry_type, &purchases, &sales)?)
    }

    async fn current_lot(
        &self,
        user: UserId,
        poultry_type: &PoultryType,
        resets: &ResetWatermarks,
    ) -> EngineResult<(Vec<Purchase>, Vec<Sale>)> {
        let purchases: Vec<Purchase> = self
            .store
            .purchases()
            .list(user)
            .await?
            .into_iter()
            .filter(|p| &p.poultry_type == poultry_type)
            .collect();
        let sales: Vec<Sale> = self
            .store
            .sales()
            .list(user)
            .await?
            .into_iter()
            .filter(|s| &s.poultry_type == poultry_type)
            .collect();
        Ok((current_lot_filter(&purchases, resets), current_lot_filter(&sales, resets)))
    }

    /// Close the lot of `poultry_type` if it has sold out.
    pub async fn on_mutation(&self, user: UserId, poultry_type: &PoultryType) -> EngineResult<LotEvaluation> {
        let tally = self.current_tally(user, poultry_type).await?;
        if !tally.is_sold_out() {
            return Ok(LotEvaluation::Open {
                remaining: tally.remaining_pieces(),
            });
        }

        let now = self.clock.now();
        let archive = if tally.has_value() {
            let row = LotArchive::close(LotArchiveId::new(), poultry_type.clone(), &tally, CloseReason::SoldOut, now);
            Some(self.store.archives().append(user, row).await?)
        } else {
            None
        };
        self.store.resets().upsert(user, poultry_type.clone(), now).await?;

        tracing::info!(
            poultry_type = %poultry_type,
            total_purchase = %tally.total_purchase,
            total_sale = %tally.total_sale,
            archived = archive.is_some(),
            "lot sold out, closed"
        );
        self.notifier.notify(Notification::info(format!(
            "{poultry_type} sold out: lot closed and a new lot started"
        )));

        Ok(LotEvaluation::Closed {
            archive,
            reset_at: now,
        })
    }

    /// Force-close the open lot, writing off whatever stock is left.
    ///
    /// A lot with no rows at all only moves the watermark.
    pub async fn reset_lot(&self, user: UserId, poultry_type: &PoultryType) -> EngineResult<Option<LotArchive>> {
        let tally = self.current_tally(user, poultry_type).await?;
        let now = self.clock.now();

        let archive = if tally.is_empty() {
            None
        } else {
            let row = LotArchive::close(LotArchiveId::new(), poultry_type.clone(), &tally, CloseReason::Manual, now);
            Some(self.store.archives().append(user, row).await?)
        };
        self.store.resets().upsert(user, poultry_type.clone(), now).await?;

        tracing::info!(
            poultry_type = %poultry_type,
            written_off = tally.remaining_pieces(),
            "lot reset"
        );
        Ok(archive)
    }
}
