use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use poultrybook_core::{PoultryCatalog, PoultryType, PriceBasis, PurchaseId, SaleId};
use poultrybook_inventory::{compute_stock, current_lot_filter, LotTally, ResetWatermarks};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

const TYPES: [&str; 5] = ["Broiler", "Layer", "Sonali", "Duck", "Deshi"];

/// Synthetic history: one purchase and three sales per round, spread over types.
fn history(rounds: usize) -> (Vec<Purchase>, Vec<Sale>) {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 6, 0, 0).unwrap();
    let mut purchases = Vec::with_capacity(rounds);
    let mut sales = Vec::with_capacity(rounds * 3);

    for i in 0..rounds {
        let ty = PoultryType::new(TYPES[i % TYPES.len()]).unwrap();
        let at = start + Duration::minutes(i as i64 * 10);
        purchases.push(Purchase {
            id: PurchaseId::new(),
            poultry_type: ty.clone(),
            pieces: 300,
            kg: Decimal::new(4500, 1),
            rate: Decimal::new(160, 0),
            basis: PriceBasis::PerKg,
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            created_at: Some(at),
            is_credit: i % 4 == 0,
        });
        for j in 0..3 {
            sales.push(Sale {
                id: SaleId::new(),
                poultry_type: ty.clone(),
                pieces: 95,
                kg: Decimal::new(1420, 1),
                rate: Decimal::new(185, 0),
                basis: PriceBasis::PerKg,
                mortality: 2,
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                created_at: Some(at + Duration::minutes(j + 1)),
                is_cash: true,
            });
        }
    }

    (purchases, sales)
}

fn bench_compute_stock(c: &mut Criterion) {
    let catalog = PoultryCatalog::new(TYPES).unwrap();
    let mut group = c.benchmark_group("compute_stock");

    for rounds in [100usize, 1_000, 10_000] {
        let (purchases, sales) = history(rounds);
        group.throughput(Throughput::Elements((purchases.len() + sales.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, _| {
            b.iter(|| compute_stock(black_box(&catalog), black_box(&purchases), black_box(&sales)));
        });
    }

    group.finish();
}

fn bench_current_lot(c: &mut Criterion) {
    let (purchases, sales) = history(10_000);
    let midpoint = purchases[purchases.len() / 2].created_at.unwrap();
    let resets: ResetWatermarks = TYPES
        .iter()
        .map(|t| (PoultryType::new(*t).unwrap(), midpoint))
        .collect();
    let broiler = PoultryType::new("Broiler").unwrap();

    c.bench_function("current_lot_filter_and_tally", |b| {
        b.iter(|| {
            let p = current_lot_filter(black_box(&purchases), &resets);
            let s = current_lot_filter(black_box(&sales), &resets);
            LotTally::of(&broiler, &p, &s).unwrap()
        });
    });
}

criterion_group!(benches, bench_compute_stock, bench_current_lot);
criterion_main!(benches);
