//! # Hosting Commitment Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | hc-01 Codec | decode one token |
//! | hc-01 Validator | full check chain including ECDSA verify |
//! | hc-01 Admission | parallel scan of a transaction's outputs |
//! | hc-02 Index | insert, lookup by locator |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hc_01_commitment_admission::test_utils::{RecordingSink, TokenFixture, NOW};
use hc_01_commitment_admission::{decode, AdmissionConfig, AdmissionService, CommitmentValidator, KeyPolicy};
use hc_02_commitment_index::test_utils::make_record;
use hc_02_commitment_index::{CommitmentIndex, CommitmentIndexApi, InMemoryCommitmentStore};
use shared_types::FixedTimeSource;

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-01-codec");
    let fixture = TokenFixture::new(NOW);

    group.throughput(Throughput::Bytes(fixture.script.len() as u64));
    group.bench_function("decode_token", |b| {
        b.iter(|| black_box(decode(black_box(&fixture.script)).is_ok()))
    });
    group.finish();
}

fn bench_validator(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-01-validator");
    group.measurement_time(Duration::from_secs(10));

    let fixture = TokenFixture::new(NOW);
    let validator = CommitmentValidator::new(KeyPolicy::IdentityField);
    group.bench_function("validate_admit", |b| {
        b.iter(|| black_box(validator.validate(fixture.fields.as_slice(), NOW).is_admit()))
    });

    // Fails at the first check; no signature work.
    let short = &fixture.fields[..4];
    group.bench_function("validate_reject_structure", |b| {
        b.iter(|| black_box(validator.validate(short, NOW).is_admit()))
    });
    group.finish();
}

fn bench_identify_outputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-01-admission");
    let service = AdmissionService::with_time_source(
        AdmissionConfig::default(),
        RecordingSink::new(),
        FixedTimeSource::new(NOW),
    );

    for size in [1usize, 10, 100] {
        let outputs: Vec<Vec<u8>> = (0..size).map(|_| TokenFixture::new(NOW).script).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("identify_admissible_outputs", size),
            &outputs,
            |b, outputs| b.iter(|| black_box(service.identify_admissible_outputs(outputs.as_slice()))),
        );
    }
    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-02-index");

    group.bench_function("insert_fresh_index_100", |b| {
        b.iter(|| {
            let index = CommitmentIndex::new(InMemoryCommitmentStore::new());
            for n in 0..100u32 {
                let _ = index.insert(make_record((n % 251) as u8, n, "https://example.com/f"));
            }
            black_box(index)
        })
    });

    for size in [100u32, 1_000, 10_000] {
        let index = CommitmentIndex::new(InMemoryCommitmentStore::new());
        for n in 0..size {
            let locator = format!("https://example.com/{}", n % 10);
            let _ = index.insert(make_record((n % 251) as u8, n, &locator));
        }
        group.bench_with_input(BenchmarkId::new("find_by_locator", size), &index, |b, index| {
            b.iter(|| black_box(index.find_by_locator("https://example.com/3").map(|r| r.len())))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_validator,
    bench_identify_outputs,
    bench_index
);
criterion_main!(benches);
