use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cartledger_core::{Money, OfferId, OrderId};
use cartledger_offers::{AdjustmentLedger, InMemoryOfferResolver, OfferTraits};

fn filled_ledger(size: usize) -> AdjustmentLedger {
    let resolver = Arc::new(InMemoryOfferResolver::new());
    let mut ledger = AdjustmentLedger::new(OrderId::new(), resolver.clone());
    let offers: Vec<OfferId> = (0..8).map(|_| OfferId::new()).collect();
    for id in &offers {
        resolver.register(*id, OfferTraits::stackable()).unwrap();
    }
    for i in 0..size {
        let offer = offers[i % offers.len()];
        ledger
            .apply(offer, "bench", Money::from_minor((i as i64 % 500) + 1, 2))
            .unwrap();
    }
    ledger
}

fn bench_total_discount(c: &mut Criterion) {
    let mut group = c.benchmark_group("total_discount");
    for size in [10usize, 100, 1_000] {
        let ledger = filled_ledger(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.total_discount()))
        });
    }
    group.finish();
}

fn bench_reasons_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("reasons_summary");
    for size in [10usize, 100, 1_000] {
        let ledger = filled_ledger(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.reasons_summary()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_total_discount, bench_reasons_summary);
criterion_main!(benches);
