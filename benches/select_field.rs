use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use obsplan::field::{CompletedFields, Field, TargetCatalog};
use obsplan::scheduler::params::SchedulerParams;
use obsplan::selection::constraints::ConstraintFilter;
use obsplan::selection::geometry::SkySnapshot;
use obsplan::selection::scoring::ScoringMode;
use obsplan::selection::select_field;
use obsplan::time::parse_date;

/// Southern-sky catalog of `n_hexes` pointings, two bands and four tilings each.
fn synthetic_catalog(rng: &mut StdRng, n_hexes: u32) -> TargetCatalog {
    let mut fields = Vec::with_capacity(n_hexes as usize * 8);
    for tiling in 1..=4 {
        for hex in 1..=n_hexes {
            let ra = rng.random_range(0.0..360.0);
            let dec = rng.random_range(-88.0..-20.0);
            for band in ["g", "r"] {
                fields.push(Field::new(hex, tiling, band, ra, dec));
            }
        }
    }
    TargetCatalog::new(fields)
}

fn bench_select_field(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let constraints = ConstraintFilter::blanco().unwrap();
    let completed = CompletedFields::new();
    let date = parse_date("2016/02/11 03:00:00").unwrap();
    let sky = SkySnapshot {
        zenith_ra: 100.0,
        zenith_dec: -30.2,
        moon_ra: 150.0,
        moon_dec: 10.0,
        moon_phase: 0.3,
    };

    let mut group = c.benchmark_group("select_field");
    for n_hexes in [500u32, 5_000] {
        let catalog = synthetic_catalog(&mut rng, n_hexes);
        for mode in [ScoringMode::Balance, ScoringMode::Balance3, ScoringMode::Airmass2] {
            let params = SchedulerParams::builder().mode(mode).build().unwrap();
            group.bench_with_input(
                BenchmarkId::new(mode.name(), catalog.len()),
                &catalog,
                |b, catalog| {
                    b.iter(|| {
                        let selected = select_field(
                            black_box(catalog),
                            &completed,
                            &constraints,
                            &params,
                            &sky,
                            date,
                            Some((95.0, -45.0)),
                        );
                        black_box(selected)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_select_field);
criterion_main!(benches);
