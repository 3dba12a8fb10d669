//! Integration tests for the full bookkeeping pipeline.
//!
//! Tests: Bookkeeper → RecordStore → LotEngine / CashLedgerSync → Dashboard
//!
//! Verifies:
//! - Sell-out closes the lot exactly once and archives its profit
//! - Manual reset writes off leftover stock
//! - Cash entries stay linked one-to-one with their records
//! - Cash counts reconcile the ledger to the counted notes
//! - Identity, validation and store failures stop the action

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use poultrybook_accounting::{
        CashEntryDraft, CashEntryKind, CashLog, Denominations, DueDraft, DueUpdate, ExpenseDraft,
        SourceRef,
    };
    use poultrybook_core::{ManualClock, PoultryType, PriceBasis, UserId};
    use poultrybook_inventory::{CloseReason, ResetWatermarks};
    use poultrybook_purchasing::{Purchase, PurchaseDraft};
    use poultrybook_sales::{Sale, SaleDraft};

    use crate::bookkeeper::Bookkeeper;
    use crate::config::BookkeepingConfig;
    use crate::error::EngineError;
    use crate::loader::DashboardView;
    use crate::lot_engine::{LotEngine, LotEvaluation};
    use crate::notify::{NotificationLevel, RecordingNotifier};
    use crate::session::Session;
    use crate::store::{
        ArchiveLog, CashLogTable, InMemoryRecordStore, RecordStore, RecordTable, ResetTable,
        StoreError, StoreResult,
    };

    struct Harness<S> {
        books: Bookkeeper<S>,
        clock: Arc<ManualClock>,
        notifier: Arc<RecordingNotifier>,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn harness_with<S: RecordStore>(store: S, session: Session) -> Harness<S> {
        poultrybook_observability::init();
        let clock = Arc::new(ManualClock::at(start()));
        let notifier = Arc::new(RecordingNotifier::new());
        let books = Bookkeeper::new(
            store,
            session,
            &BookkeepingConfig::default(),
            clock.clone(),
            notifier.clone(),
        )
        .unwrap();
        Harness {
            books,
            clock,
            notifier,
        }
    }

    fn harness() -> Harness<InMemoryRecordStore> {
        harness_with(InMemoryRecordStore::new(), Session::signed_in(UserId::new()))
    }

    fn ty(label: &str) -> PoultryType {
        PoultryType::new(label).unwrap()
    }

    fn purchase(label: &str, pieces: u32, rate: Decimal, is_credit: bool) -> PurchaseDraft {
        PurchaseDraft {
            poultry_type: ty(label),
            pieces,
            kg: Decimal::ZERO,
            rate,
            basis: PriceBasis::PerPiece,
            date: day(),
            is_credit,
        }
    }

    fn sale(label: &str, pieces: u32, rate: Decimal, mortality: u32) -> SaleDraft {
        SaleDraft {
            poultry_type: ty(label),
            pieces,
            kg: Decimal::ZERO,
            rate,
            basis: PriceBasis::PerPiece,
            mortality,
            date: day(),
            is_cash: true,
        }
    }

    fn linked_to(logs: &[CashLog], source: SourceRef) -> Vec<&CashLog> {
        logs.iter().filter(|l| l.source == Some(source)).collect()
    }

    impl<S: RecordStore> Harness<S> {
        fn tick(&self) -> DateTime<Utc> {
            self.clock.advance(Duration::minutes(1))
        }

        async fn add_purchase(&self, draft: PurchaseDraft) -> Purchase {
            self.tick();
            self.books.add_purchase(draft).await.unwrap()
        }

        async fn add_sale(&self, draft: SaleDraft) -> Sale {
            self.tick();
            self.books.add_sale(draft).await.unwrap()
        }

        async fn resets(&self) -> ResetWatermarks {
            self.books.dashboard().await.unwrap().resets
        }
    }

    #[tokio::test]
    async fn sell_out_closes_lot_and_archives_profit() {
        let h = harness();
        h.add_purchase(purchase("Broiler", 100, dec!(100), false)).await;
        let sold = h.add_sale(sale("Broiler", 100, dec!(150), 0)).await;

        let dash = h.books.dashboard().await.unwrap();
        assert_eq!(dash.stock.get(&ty("Broiler")).pieces, 0);
        assert_eq!(dash.lot_history.len(), 1);

        let archive = &dash.lot_history[0];
        assert_eq!(archive.poultry_type(), &ty("Broiler"));
        assert_eq!(archive.total_purchase(), dec!(10000));
        assert_eq!(archive.total_sale(), dec!(15000));
        assert_eq!(archive.profit(), dec!(5000));
        assert_eq!(archive.reason(), CloseReason::SoldOut);
        assert_eq!(archive.pieces_at_reset(), None);

        assert_eq!(dash.resets.get(&ty("Broiler")), sold.created_at);
        assert!(
            h.notifier
                .all()
                .iter()
                .any(|n| n.level == NotificationLevel::Info && n.message.contains("Broiler sold out"))
        );
    }

    #[tokio::test]
    async fn repeated_check_does_not_archive_twice() {
        let h = harness();
        h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        h.add_sale(sale("Broiler", 10, dec!(120), 0)).await;

        let user = h.books.session().require_user().unwrap();
        let engine = LotEngine::new(h.books.store(), h.clock.as_ref(), h.notifier.as_ref());
        h.tick();
        let again = engine.on_mutation(user, &ty("Broiler")).await.unwrap();
        assert_eq!(again, LotEvaluation::Open { remaining: 0 });
        assert_eq!(h.books.lot_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_sale_keeps_lot_open() {
        let h = harness();
        h.add_purchase(purchase("Sonali", 40, dec!(200), false)).await;
        h.add_sale(sale("Sonali", 25, dec!(260), 5)).await;

        let dash = h.books.dashboard().await.unwrap();
        let level = dash.stock.get(&ty("Sonali"));
        assert_eq!(level.pieces, 10);
        assert_eq!(level.dead, 5);
        assert!(dash.lot_history.is_empty());
        assert!(dash.resets.get(&ty("Sonali")).is_none());
    }

    #[tokio::test]
    async fn mortality_can_close_a_lot_at_a_loss() {
        let h = harness();
        h.add_purchase(purchase("Deshi", 5, dec!(300), false)).await;
        h.add_sale(sale("Deshi", 0, dec!(0), 5)).await;

        let history = h.books.lot_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].profit(), dec!(-1500));
        // A mortality-only row moves no cash.
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-1500));
    }

    #[tokio::test]
    async fn zero_value_sell_out_resets_without_archive() {
        let h = harness();
        h.add_purchase(purchase("Duck", 3, dec!(0), false)).await;
        let sold = h.add_sale(sale("Duck", 3, dec!(0), 0)).await;

        assert!(h.books.lot_history().await.unwrap().is_empty());
        assert_eq!(h.resets().await.get(&ty("Duck")), sold.created_at);
    }

    #[tokio::test]
    async fn manual_reset_writes_off_leftover_stock() {
        let h = harness();
        h.add_purchase(purchase("Layer", 50, dec!(100), false)).await;
        h.add_sale(sale("Layer", 20, dec!(150), 0)).await;
        let reset_at = h.tick();

        let archive = h.books.reset_lot(&ty("Layer")).await.unwrap().unwrap();
        assert_eq!(archive.total_purchase(), dec!(5000));
        assert_eq!(archive.total_sale(), dec!(3000));
        assert_eq!(archive.profit(), dec!(-2000));
        assert_eq!(archive.pieces_at_reset(), Some(30));
        assert_eq!(archive.reason(), CloseReason::Manual);

        let dash = h.books.dashboard().await.unwrap();
        assert_eq!(dash.resets.get(&ty("Layer")), Some(reset_at));
        assert_eq!(dash.stock.get(&ty("Layer")).pieces, 0);
        // History stays available.
        assert_eq!(dash.purchases.len(), 1);
        assert!(dash.current_purchases.is_empty());
    }

    #[tokio::test]
    async fn records_after_reset_start_the_new_lot() {
        let h = harness();
        h.add_purchase(purchase("Layer", 50, dec!(100), false)).await;
        h.tick();
        h.books.reset_lot(&ty("Layer")).await.unwrap();
        h.add_purchase(purchase("Layer", 20, dec!(110), false)).await;

        let dash = h.books.dashboard().await.unwrap();
        assert_eq!(dash.current_purchases.len(), 1);
        assert_eq!(dash.stock.get(&ty("Layer")).pieces, 20);
    }

    #[tokio::test]
    async fn reset_of_untouched_type_only_moves_watermark() {
        let h = harness();
        let at = h.tick();
        assert_eq!(h.books.reset_lot(&ty("Duck")).await.unwrap(), None);
        assert_eq!(h.resets().await.get(&ty("Duck")), Some(at));
    }

    #[tokio::test]
    async fn reset_of_unknown_type_is_rejected() {
        let h = harness();
        h.tick();
        let err = h.books.reset_lot(&ty("Turkey")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(msg) if msg.contains("Turkey")));
        assert!(h.resets().await.is_empty());
        assert_eq!(
            h.notifier.all().last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[tokio::test]
    async fn changing_sale_type_re_evaluates_both_types() {
        let h = harness();
        h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        let wrong = h.add_sale(sale("Duck", 10, dec!(150), 0)).await;
        assert!(h.books.lot_history().await.unwrap().is_empty());

        h.tick();
        h.books
            .update_sale(wrong.id, sale("Broiler", 10, dec!(150), 0))
            .await
            .unwrap();

        let history = h.books.lot_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].poultry_type(), &ty("Broiler"));
        assert!(h.resets().await.get(&ty("Duck")).is_none());
    }

    #[tokio::test]
    async fn sale_link_round_trip() {
        let h = harness();
        let s = h.add_sale(sale("Broiler", 10, dec!(150), 0)).await;
        let source = SourceRef::sale(s.id);

        let logs = h.books.cash_logs().await.unwrap();
        let linked = linked_to(&logs, source);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].kind, CashEntryKind::Add);
        assert_eq!(linked[0].amount, dec!(1500));

        h.books
            .update_sale(s.id, sale("Broiler", 12, dec!(150), 0))
            .await
            .unwrap();
        let logs = h.books.cash_logs().await.unwrap();
        let linked = linked_to(&logs, source);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].amount, dec!(1800));

        h.books.delete_sale(s.id).await.unwrap();
        let logs = h.books.cash_logs().await.unwrap();
        assert!(linked_to(&logs, source).is_empty());
        assert!(h.books.sale(s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_purchase_link_is_recreated_on_update() {
        let h = harness();
        let user = h.books.session().require_user().unwrap();
        let p = h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        let source = SourceRef::purchase(p.id);
        let log_id = linked_to(&h.books.cash_logs().await.unwrap(), source)[0].id;
        h.books.store().cash_logs().delete(user, log_id).await.unwrap();
        h.notifier.drain();

        h.books
            .update_purchase(p.id, purchase("Broiler", 12, dec!(100), false))
            .await
            .unwrap();

        let logs = h.books.cash_logs().await.unwrap();
        let linked = linked_to(&logs, source);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].kind, CashEntryKind::Withdraw);
        assert_eq!(linked[0].amount, dec!(1200));
        assert!(h.notifier.all().iter().all(|n| n.level != NotificationLevel::Error));
    }

    #[tokio::test]
    async fn missing_links_do_not_block_deletes() {
        let h = harness();
        let user = h.books.session().require_user().unwrap();
        let p = h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        let s = h.add_sale(sale("Broiler", 4, dec!(150), 0)).await;
        for log in h.books.cash_logs().await.unwrap() {
            h.books.store().cash_logs().delete(user, log.id).await.unwrap();
        }
        h.notifier.drain();

        h.books.delete_sale(s.id).await.unwrap();
        h.books.delete_purchase(p.id).await.unwrap();

        assert!(h.books.sale(s.id).await.unwrap().is_none());
        assert!(h.books.purchase(p.id).await.unwrap().is_none());
        assert!(h.books.cash_logs().await.unwrap().is_empty());
        let notes = h.notifier.all();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.level == NotificationLevel::Success));
    }

    #[tokio::test]
    async fn purchase_link_follows_credit_flag() {
        let h = harness();
        let p = h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        let source = SourceRef::purchase(p.id);
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-1000));

        h.books
            .update_purchase(p.id, purchase("Broiler", 10, dec!(100), true))
            .await
            .unwrap();
        assert!(linked_to(&h.books.cash_logs().await.unwrap(), source).is_empty());
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(0));

        h.books
            .update_purchase(p.id, purchase("Broiler", 10, dec!(90), false))
            .await
            .unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-900));

        h.books.delete_purchase(p.id).await.unwrap();
        assert!(h.books.cash_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn credit_purchase_moves_no_cash() {
        let h = harness();
        let p = h.add_purchase(purchase("Layer", 30, dec!(100), true)).await;
        assert!(h.books.cash_logs().await.unwrap().is_empty());
        h.books.delete_purchase(p.id).await.unwrap();
        assert!(h.books.purchases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expense_link_tracks_edits() {
        let h = harness();
        let draft = ExpenseDraft {
            category: "Transport".into(),
            amount: dec!(400),
            note: None,
            date: day(),
        };
        let e = h.books.add_expense(draft.clone()).await.unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-400));

        h.books
            .update_expense(e.id, ExpenseDraft { amount: dec!(650), ..draft })
            .await
            .unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-650));
        assert_eq!(h.books.expense(e.id).await.unwrap().map(|e| e.amount), Some(dec!(650)));
        assert_eq!(h.books.cash_logs().await.unwrap().len(), 1);

        h.books.delete_expense(e.id).await.unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(0));
    }

    #[tokio::test]
    async fn due_lifecycle_keeps_paid_within_amount() {
        let h = harness();
        let due = h
            .books
            .add_due(DueDraft {
                customer_name: "Karim".into(),
                mobile: None,
                address: None,
                amount: dec!(1000),
                date: day(),
            })
            .await
            .unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-1000));

        let due = h.books.receive_due_payment(due.id, dec!(300)).await.unwrap();
        assert_eq!(due.paid, dec!(300));
        assert_eq!(h.books.due(due.id).await.unwrap(), Some(due.clone()));
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-700));

        let err = h.books.receive_due_payment(due.id, dec!(800)).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(h.books.cash_logs().await.unwrap().len(), 2);

        let err = h
            .books
            .update_due(due.id, DueUpdate { amount: Some(dec!(200)), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        h.books
            .update_due(due.id, DueUpdate { amount: Some(dec!(800)), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(h.books.outstanding_dues().await.unwrap(), dec!(500));
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-500));

        h.books.delete_due(due.id).await.unwrap();
        // The collected payment stays in the cash box.
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(300));
        assert!(h.books.dues().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cash_count_surplus_is_booked() {
        let h = harness();
        h.books
            .add_cash_entry(CashEntryDraft::new(CashEntryKind::Opening, dec!(12000), day(), "Opening balance"))
            .await
            .unwrap();

        let counted = Denominations::from_counts([(1000, 12), (500, 1)]);
        let (count, log) = h.books.record_cash_count(counted, day()).await.unwrap();
        assert_eq!(count.system_balance, dec!(12000));
        assert_eq!(count.gap, dec!(500));
        assert_eq!(log.kind, CashEntryKind::Add);
        assert_eq!(log.amount, dec!(500));
        assert!(log.note.contains("surplus"));
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(12500));

        // Re-saving excludes the entry's own earlier adjustment.
        let (count, revised) = h
            .books
            .edit_cash_count(log.id, Denominations::from_counts([(1000, 11), (500, 1)]), day())
            .await
            .unwrap();
        assert_eq!(count.system_balance, dec!(12000));
        assert_eq!(revised.id, log.id);
        assert_eq!(revised.kind, CashEntryKind::Withdraw);
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(11500));

        let sheet = h.books.cash_count_sheet(log.id).await.unwrap();
        assert_eq!(sheet.len(), 10);
        assert_eq!(sheet[0], (1000, 11));
        assert_eq!(sheet[1], (500, 1));
        assert!(sheet[2..].iter().all(|(_, n)| *n == 0));
        assert_eq!(h.books.cash_count_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_or_unknown_counts_are_rejected() {
        let h = harness();
        let err = h.books.record_cash_count(Denominations::new(), day()).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = h
            .books
            .record_cash_count(Denominations::from_counts([(3, 1)]), day())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(h.books.cash_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn linked_entries_cannot_be_edited_by_hand() {
        let h = harness();
        h.add_sale(sale("Broiler", 1, dec!(150), 0)).await;
        let log = h.books.cash_logs().await.unwrap().remove(0);

        let err = h.books.delete_cash_entry(log.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(msg) if msg.contains("sale")));

        let err = h
            .books
            .add_cash_entry(CashEntryDraft::new(CashEntryKind::Add, dec!(0), day(), "nothing"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_entries_can_be_edited_and_removed() {
        let h = harness();
        let log = h
            .books
            .add_cash_entry(CashEntryDraft::new(CashEntryKind::Add, dec!(2000), day(), "Owner top-up"))
            .await
            .unwrap();
        h.books
            .update_cash_entry(log.id, CashEntryDraft::new(CashEntryKind::Withdraw, dec!(500), day(), "Owner draw"))
            .await
            .unwrap();
        assert_eq!(h.books.cash_balance().await.unwrap(), dec!(-500));

        h.books.delete_cash_entry(log.id).await.unwrap();
        assert!(h.books.cash_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_session_is_rejected_before_store() {
        let h = harness_with(InMemoryRecordStore::new(), Session::anonymous());
        let err = h
            .books
            .add_purchase(purchase("Broiler", 10, dec!(100), false))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AuthRequired));
        assert!(matches!(h.books.dashboard().await, Err(EngineError::AuthRequired)));

        let notes = h.notifier.all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let h = harness();
        let err = h
            .books
            .add_purchase(purchase("Turkey", 10, dec!(100), false))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(msg) if msg.contains("Turkey")));
        assert!(h.books.purchases().await.unwrap().is_empty());
        assert!(h.books.cash_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_purchase_is_rejected_before_any_write() {
        let h = harness();
        let mut draft = purchase("Broiler", 10, Decimal::MAX, false);
        draft.basis = PriceBasis::PerKg;
        draft.kg = dec!(1000000);

        let err = h.books.add_purchase(draft).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(h.books.purchases().await.unwrap().is_empty());
        assert!(h.books.cash_logs().await.unwrap().is_empty());

        h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;
        assert_eq!(h.books.dashboard().await.unwrap().stock.get(&ty("Broiler")).pieces, 10);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let h = harness();
        let err = h
            .books
            .delete_sale(poultrybook_core::SaleId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    /// Store whose reset table is down.
    struct BrokenResets {
        inner: InMemoryRecordStore,
        resets: FailingResets,
    }

    struct FailingResets;

    #[async_trait::async_trait]
    impl ResetTable for FailingResets {
        async fn list(&self, _user: UserId) -> StoreResult<ResetWatermarks> {
            Ok(ResetWatermarks::new())
        }

        async fn upsert(&self, _user: UserId, _ty: PoultryType, _at: DateTime<Utc>) -> StoreResult<()> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    impl RecordStore for BrokenResets {
        fn purchases(&self) -> &dyn RecordTable<Purchase> {
            self.inner.purchases()
        }

        fn sales(&self) -> &dyn RecordTable<Sale> {
            self.inner.sales()
        }

        fn expenses(&self) -> &dyn RecordTable<poultrybook_accounting::Expense> {
            self.inner.expenses()
        }

        fn dues(&self) -> &dyn RecordTable<poultrybook_accounting::DueRecord> {
            self.inner.dues()
        }

        fn cash_logs(&self) -> &dyn CashLogTable {
            self.inner.cash_logs()
        }

        fn archives(&self) -> &dyn ArchiveLog {
            self.inner.archives()
        }

        fn resets(&self) -> &dyn ResetTable {
            &self.resets
        }
    }

    #[tokio::test]
    async fn store_failure_propagates_unchanged() {
        let store = BrokenResets {
            inner: InMemoryRecordStore::new(),
            resets: FailingResets,
        };
        let h = harness_with(store, Session::signed_in(UserId::new()));
        h.add_purchase(purchase("Broiler", 10, dec!(100), false)).await;

        h.tick();
        let err = h
            .books
            .add_sale(sale("Broiler", 10, dec!(150), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::Backend(msg)) if msg == "connection reset"));
        assert_eq!(
            h.notifier.all().last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[tokio::test]
    async fn stale_dashboard_load_is_dropped() {
        let h = harness();
        let view = DashboardView::new();

        let older = view.begin();
        let newer = view.begin();
        h.add_purchase(purchase("Broiler", 5, dec!(100), false)).await;
        let fresh = h.books.dashboard().await.unwrap();

        assert!(view.apply(newer, fresh.clone()));
        assert!(!view.apply(older, h.books.dashboard().await.unwrap()));
        assert_eq!(view.current(), Some(fresh));

        assert!(h.books.refresh(&view).await.unwrap());
    }

    #[tokio::test]
    async fn dashboard_defaults_every_catalog_type() {
        let h = harness();
        let dash = h.books.dashboard().await.unwrap();
        assert_eq!(dash.stock.len(), 5);
        assert!(dash.stock.iter().all(|(_, level)| level.pieces == 0));
        assert_eq!(dash.cash_balance, dec!(0));
    }

    mod cash_link_properties {
        use super::*;
        use poultrybook_core::SaleId;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Add(u32),
            Update(usize, u32),
            Delete(usize),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (1u32..50).prop_map(Step::Add),
                (0usize..8, 1u32..50).prop_map(|(i, n)| Step::Update(i, n)),
                (0usize..8).prop_map(Step::Delete),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// Property: after any add/update/delete sequence every live sale
            /// has exactly one cash entry carrying its current total.
            #[test]
            fn live_sales_keep_one_matching_cash_entry(steps in prop::collection::vec(step(), 1..20)) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let (sales, logs) = rt.block_on(async {
                    let h = harness();
                    let mut live: Vec<SaleId> = Vec::new();
                    for step in steps {
                        match step {
                            Step::Add(n) => live.push(h.add_sale(sale("Layer", n, dec!(10), 0)).await.id),
                            Step::Update(i, n) if !live.is_empty() => {
                                let id = live[i % live.len()];
                                h.tick();
                                h.books.update_sale(id, sale("Layer", n, dec!(10), 0)).await.unwrap();
                            }
                            Step::Delete(i) if !live.is_empty() => {
                                let id = live.remove(i % live.len());
                                h.books.delete_sale(id).await.unwrap();
                            }
                            _ => {}
                        }
                    }
                    (h.books.sales().await.unwrap(), h.books.cash_logs().await.unwrap())
                });

                prop_assert_eq!(logs.len(), sales.len());
                for s in &sales {
                    let linked = linked_to(&logs, SourceRef::sale(s.id));
                    prop_assert_eq!(linked.len(), 1);
                    prop_assert_eq!(linked[0].amount, s.total());
                }
            }
        }
    }
}
