use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

use pagesim::common::config::MemoryConfig;
use pagesim::memory::MemoryManager;

const PAGE_SIZE: u32 = 1024;
const PAGES: u32 = 32;

// Memory manager with `processes` admitted slots
fn create_manager(frames: u32, processes: u32) -> MemoryManager {
    let config = MemoryConfig {
        page_size: PAGE_SIZE,
        pages_per_process: PAGES,
        frame_count: frames,
        max_processes: processes,
        ..Default::default()
    };
    let mut manager = MemoryManager::new(config).unwrap();
    for _ in 0..processes {
        manager.admit_process().unwrap();
    }
    manager
}

fn memory_manager_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MemoryManager");

    for frames in [16u32, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::new("sequential_access", frames), frames, |b, &frames| {
            let mut manager = create_manager(frames, 4);

            b.iter(|| {
                for pid in 0..4 {
                    for page in 0..PAGES {
                        manager.handle_access(pid, page * PAGE_SIZE, false).unwrap();
                    }
                }
                manager.drain_events();
            });
        });

        group.bench_with_input(BenchmarkId::new("random_access", frames), frames, |b, &frames| {
            let mut manager = create_manager(frames, 18);
            let mut rng = StdRng::seed_from_u64(42);

            b.iter(|| {
                for _ in 0..1000 {
                    let pid = rng.gen_range(0..18);
                    let address = rng.gen_range(0..PAGES * PAGE_SIZE);
                    manager.handle_access(pid, address, rng.gen_bool(0.3)).unwrap();
                }
                manager.drain_events();
            });
        });
    }

    group.bench_function("check_invariants", |b| {
        let mut manager = create_manager(256, 18);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let pid = rng.gen_range(0..18);
            let address = rng.gen_range(0..PAGES * PAGE_SIZE);
            manager.handle_access(pid, address, rng.gen_bool(0.3)).unwrap();
        }

        b.iter(|| manager.check_invariants().unwrap());
    });

    group.finish();
}

criterion_group!(benches, memory_manager_benchmark);
criterion_main!(benches);
