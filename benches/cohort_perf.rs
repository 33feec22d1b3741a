mod fixtures;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use vaxsim::patient::Patient;
use vaxsim::types::{CohortId, Horizon, PatientId};
use vaxsim::{HealthState, Therapy};

use fixtures::{LARGE, MEDIUM, SMALL, build_cohort, canonical_params};

// ── Group 1: gillespie_step: single transition draws ───────────────────────

fn bench_gillespie_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("gillespie_step");
    let params = canonical_params(Therapy::Without);
    for state in [HealthState::Well, HealthState::Disease, HealthState::PostDisease] {
        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::from_parameter(format!("{state:?}")), |b| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            b.iter(|| params.sampler().next(state, &mut rng))
        });
    }
    group.finish();
}

// ── Group 2: patient_path: one trajectory to death or horizon ──────────────

fn bench_patient_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("patient_path");
    for therapy in [Therapy::Without, Therapy::With] {
        let params = canonical_params(therapy);
        let horizon = Horizon::new(100.0).expect("positive horizon");
        group.bench_function(BenchmarkId::from_parameter(therapy.label()), |b| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                let id = PatientId::in_cohort(CohortId(1), i).expect("index within the id block");
                let mut patient = Patient::new(id, &params);
                patient.simulate(horizon);
                patient.outcome()
            })
        });
    }
    group.finish();
}

// ── Group 3: cohort: population size scaling ───────────────────────────────

fn bench_cohort(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohort");
    for (name, scenario) in [("small", &SMALL), ("medium", &MEDIUM), ("large", &LARGE)] {
        if name == "large" {
            group.sample_size(10);
        }
        group.throughput(Throughput::Elements(scenario.pop_size as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter_batched(
                || build_cohort(scenario, 1, Therapy::With),
                |(mut cohort, horizon)| {
                    cohort.simulate(horizon);
                    cohort
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gillespie_step, bench_patient_path, bench_cohort);
criterion_main!(benches);
