//! # Chain Generation Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Cursor | Range enumeration and flat index conversion |
//! | Schedule | Follow-the-satoshi over growing stake sets |
//! | Driver | End-to-end generation with empty and transfer payloads |

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use qc_17_block_generation::adapters::{
    EmptyPayloadProvider, FixedScheduleProvider, InMemoryChainStore, TransferPayloadGenerator,
};
use qc_17_block_generation::domain::follow_the_satoshi;
use qc_17_block_generation::{ChainGenerationApi, Count};
use qc_tests::fixtures::{config, generator, genesis, id, params, secrets, store};
use shared_types::{EpochOrSlot, SlotId, StakeholderId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const EPOCH_LENGTH: u32 = 10;

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");

    let start = EpochOrSlot::Slot(SlotId::new(0, 0));
    let end = start.advance(9_999, EPOCH_LENGTH);
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("range_10k", |b| {
        b.iter(|| EpochOrSlot::range(EPOCH_LENGTH, black_box(start), black_box(end)).count())
    });

    group.bench_function("flat_index_round_trip", |b| {
        b.iter(|| {
            let index = black_box(end).to_flat_index(EPOCH_LENGTH);
            EpochOrSlot::from_flat_index(index, EPOCH_LENGTH)
        })
    });

    group.finish();
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("follow-the-satoshi");

    for holders in [10u64, 100, 1_000] {
        let stakes: BTreeMap<StakeholderId, u64> =
            (0..holders).map(|i| (id(i), 1_000 + i * 7)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(holders), &stakes, |b, stakes| {
            b.iter(|| follow_the_satoshi(&[7u8; 32], black_box(3), stakes, EPOCH_LENGTH))
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("generate-chain");
    group.measurement_time(Duration::from_secs(10));

    for count in [11u64, 110] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("empty", count), &count, |b, &count| {
            b.to_async(&rt).iter_batched(
                || {
                    let store = store(genesis(0, 4, 1_000));
                    generator(
                        &store,
                        Arc::new(FixedScheduleProvider::round_robin((0..4).map(id).collect())),
                        Arc::new(EmptyPayloadProvider),
                        config(EPOCH_LENGTH),
                    )
                },
                |generator| async move {
                    generator
                        .generate_chain(&params(count, secrets(0..4), false), Count::of)
                        .await
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("transfers", count), &count, |b, &count| {
            b.to_async(&rt).iter_batched(
                || {
                    let store: Arc<InMemoryChainStore> = store(genesis(0, 4, 1_000));
                    let payload = TransferPayloadGenerator::new(store.clone(), secrets(0..4), 8, 1);
                    generator(
                        &store,
                        Arc::new(FixedScheduleProvider::round_robin((0..4).map(id).collect())),
                        Arc::new(payload),
                        config(EPOCH_LENGTH),
                    )
                },
                |generator| async move {
                    generator
                        .generate_chain(&params(count, secrets(0..4), false), Count::of)
                        .await
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cursor, bench_schedule, bench_generation);
criterion_main!(benches);
