//! Performance benchmarks for UID normalization.
//!
//! Normalization runs inside the poll loop for every card read, so it has to
//! stay allocation-free and well below the poll interval.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench uid_bench
//! ```

use cardpoll_core::constants::UID_TEXT_CAPACITY;
use cardpoll_core::{CardUid, ReaderId, RfidEvent, UidText};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Benchmark hex encoding into the fixed event buffer.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("uid_encode");
    group.throughput(Throughput::Elements(1));

    let test_cases = vec![
        ("single", vec![0xAB]),
        ("mifare_classic", vec![0xDE, 0xAD, 0xBE, 0xEF]),
        ("double_size", vec![0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
        ("triple_size", vec![0x88; 10]),
        ("oversized", vec![0x5A; 16]), // truncated to the buffer
    ];

    for (name, uid) in test_cases {
        group.bench_with_input(BenchmarkId::new("fixed", name), &uid, |b, uid| {
            b.iter(|| black_box(UidText::<UID_TEXT_CAPACITY>::encode(black_box(uid))));
        });
    }

    group.finish();
}

/// Benchmark building a full event from a read UID.
fn bench_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_new");
    group.throughput(Throughput::Elements(1));

    let uid = CardUid::new(vec![0x04, 0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6]).unwrap();

    group.bench_function("seven_byte_uid", |b| {
        b.iter(|| black_box(RfidEvent::new(ReaderId::SECOND, black_box(&uid))));
    });

    group.finish();
}

/// Benchmark parsing console-style hex input.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("uid_parse");
    group.throughput(Throughput::Elements(1));

    for (name, text) in [("plain", "DEADBEEF"), ("separated", "de:ad:be:ef")] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(black_box(text).parse::<CardUid>()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_event, bench_parse);

criterion_main!(benches);
