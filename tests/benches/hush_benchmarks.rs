//! # Hush Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | hs-01 Envelope | seal, proof-of-work, encode/decode |
//! | hs-02 Message Pool | insert under flooding |
//! | hs-05 Transaction | decode with eager sender recovery |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hs_01_envelope::{build_topic, Envelope, OutgoingMessage};
use hs_02_message_pool::{MessagePool, PoolConfig};
use hs_05_transaction::{CheckTransaction, IncludeSignature, Transaction};
use k256::ecdsa::SigningKey;
use primitive_types::U256;
use rand::rngs::OsRng;
use shared_types::{ManualTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;

const NOW: u64 = 1_700_000_000;

fn sealed(payload: Vec<u8>) -> Envelope {
    let (_, full) = build_topic(&["bench"]).expect("one topic");
    OutgoingMessage::new(payload)
        .seal(&full, 50, NOW)
        .expect("seal")
}

// ============================================================================
// hs-01: Envelope
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("hs-01-envelope");
    let (_, full) = build_topic(&["bench"]).expect("one topic");

    for size in [32usize, 256, 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("seal", size), &size, |b, &size| {
            b.iter(|| {
                OutgoingMessage::new(vec![7u8; size])
                    .seal(black_box(&full), 50, NOW)
                    .expect("seal")
            })
        });
    }

    let envelope = sealed(vec![1u8; 256]);
    let bytes = envelope.encode();
    group.bench_function("encode", |b| b.iter(|| black_box(&envelope).encode()));
    group.bench_function("decode", |b| {
        b.iter(|| Envelope::decode(black_box(&bytes)).expect("decode"))
    });
    group.bench_function("open", |b| {
        b.iter(|| envelope.open(black_box(&full), None).expect("open"))
    });

    for bits in [4u32, 8, 12] {
        group.bench_with_input(BenchmarkId::new("prove_work_bits", bits), &bits, |b, &bits| {
            b.iter_batched(
                || sealed(vec![3u8; 64]),
                |mut envelope| envelope.prove_work_bits(bits),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// ============================================================================
// hs-02: Message Pool
// ============================================================================

fn bench_pool_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("hs-02-message-pool");
    group.measurement_time(Duration::from_secs(5));

    let envelopes: Vec<Envelope> = (0..1_000u32)
        .map(|i| sealed(i.to_be_bytes().to_vec()))
        .collect();

    group.throughput(Throughput::Elements(envelopes.len() as u64));
    group.bench_function("insert_1000", |b| {
        b.iter_batched(
            || {
                let time: Arc<dyn TimeSource> = Arc::new(ManualTimeSource::new(NOW));
                (MessagePool::new(PoolConfig::for_testing(), time), envelopes.clone())
            },
            |(pool, envelopes)| {
                for envelope in envelopes {
                    black_box(pool.insert(envelope));
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

// ============================================================================
// hs-05: Transaction
// ============================================================================

fn bench_sender_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("hs-05-transaction");

    let key = SigningKey::random(&mut OsRng);
    let mut tx = Transaction::message_call(
        U256::zero(),
        U256::one(),
        U256::from(30_000u32),
        [0x11; 20],
        U256::from(1u8),
        vec![0xab; 64],
    );
    tx.sign(&key).expect("sign");
    let raw = tx.rlp_bytes(IncludeSignature::WithSignature);

    group.bench_function("decode_cheap", |b| {
        b.iter(|| Transaction::from_rlp(black_box(&raw), CheckTransaction::Cheap).expect("decode"))
    });
    group.bench_function("decode_everything", |b| {
        b.iter(|| {
            Transaction::from_rlp(black_box(&raw), CheckTransaction::Everything).expect("decode")
        })
    });
    group.finish();
}

criterion_group!(benches, bench_envelope, bench_pool_insert, bench_sender_recovery);
criterion_main!(benches);
