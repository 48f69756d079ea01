//! # Component Runtime Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Resolution | Cold dependency ordering of the arena graph |
//! | Construction | Container build on a warm resolution cache |
//! | Lifecycle | Full initialize + destroy |
//! | Toggling | Ref-counted enable/disable round trip |

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use component_runtime::{Component, ComponentExt, ComponentState, Container};
use runtime_tests::fixtures::{arena_catalog, take_journal, Arena, Ticking};

/// Hook-free component, so only the counter is measured.
#[derive(Default)]
struct Silent {
    state: ComponentState,
}

impl Component for Silent {
    fn state(&self) -> &ComponentState {
        &self.state
    }
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    group.bench_function("arena_cold", |b| {
        b.iter_batched(
            arena_catalog,
            |catalog| black_box(catalog.resolve::<Arena>().map(|r| r.len())),
            criterion::BatchSize::SmallInput,
        )
    });

    let warm = arena_catalog();
    let _ = warm.resolve::<Arena>();
    group.bench_function("arena_cached", |b| {
        b.iter(|| black_box(warm.resolve::<Arena>().map(|r| r.len())))
    });

    group.finish();
}

fn bench_container(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    let catalog = arena_catalog();

    group.bench_function("build", |b| {
        b.iter(|| {
            let arena = Container::builder::<Arena>()
                .catalog(catalog.clone())
                .build();
            black_box(arena.map(|a| a.len()))
        })
    });

    group.bench_function("initialize_and_destroy", |b| {
        b.iter_batched(
            || {
                Container::builder::<Arena>()
                    .catalog(catalog.clone())
                    .build()
            },
            |arena| {
                if let Ok(arena) = arena {
                    arena.initialize_all();
                    arena.destroy();
                }
                take_journal();
            },
            criterion::BatchSize::SmallInput,
        )
    });

    if let Ok(arena) = Container::builder::<Arena>().catalog(catalog.clone()).build() {
        group.bench_function("get_all_by_capability", |b| {
            b.iter(|| black_box(arena.get_all::<dyn Ticking>().len()))
        });
    }

    group.finish();
}

fn bench_toggling(c: &mut Criterion) {
    let silent = Silent::default();
    silent.enable();

    c.bench_function("toggle_round_trip", |b| {
        b.iter(|| {
            black_box(silent.disable());
            black_box(silent.enable());
        })
    });
}

criterion_group!(benches, bench_resolution, bench_container, bench_toggling);
criterion_main!(benches);
