use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quincena_core::{
    calendar::PeriodMarker,
    plan::{Debt, FinancialConfiguration, PaydownRule},
    reporting::{export, summarize},
    simulation::simulate,
    storage::{load_profile_from_path, save_profile_to_path, Profile},
};
use tempfile::tempdir;

fn build_large_configuration(debts: usize) -> FinancialConfiguration {
    (0..debts).fold(
        FinancialConfiguration::with_income(20_000_000),
        |config, idx| {
            let id = format!("debt-{idx}");
            config
                .debt(Debt::new(id.clone(), format!("Deuda {idx}"), 250_000 + idx as i64 * 1_000))
                .paydown(PaydownRule::always(id))
        },
    )
}

fn bench_projection(c: &mut Criterion) {
    let start = PeriodMarker::first_of(0, 2026).expect("start marker");
    let config = FinancialConfiguration::default();

    c.bench_function("project_default_10_years", |b| {
        b.iter(|| {
            let periods = simulate(black_box(&config), start, 240).expect("simulate");
            black_box(summarize(&config, &periods));
        })
    });

    let large = build_large_configuration(200);
    c.bench_function("project_200_debts_2_years", |b| {
        b.iter(|| black_box(simulate(black_box(&large), start, 48).expect("simulate")))
    });

    let periods = simulate(&config, start, 240).expect("simulate");
    c.bench_function("export_csv_10_years", |b| {
        b.iter(|| black_box(export::to_csv_string(&periods).expect("export")))
    });
}

fn bench_profile_io(c: &mut Criterion) {
    let profile = Profile::default();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("profile.json");

    c.bench_function("profile_save", |b| {
        b.iter(|| save_profile_to_path(&profile, &path).expect("save profile"))
    });

    save_profile_to_path(&profile, &path).expect("seed");
    c.bench_function("profile_load", |b| {
        b.iter(|| black_box(load_profile_from_path(&path).expect("load profile")))
    });
}

criterion_group!(benches, bench_projection, bench_profile_io);
criterion_main!(benches);
