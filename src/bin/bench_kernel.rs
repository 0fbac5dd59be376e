//! A small demonstration binary exercising the kernel against a synthetic
//! parent/children fixture, reporting per-call latency. Not a substitute for
//! the Criterion benchmark in `benches/` — this is a throwaway smoke run,
//! useful for a quick sanity check without pulling in Criterion's harness.

use std::time::Instant;

use puct_kernel::config::KernelSettings;
use puct_kernel::kernel::{compute_top_child_scores, SelectionParams};
use puct_kernel::logging::init_logging;
use puct_kernel::parent::{ChildRecord, VecParent};

fn synthetic_parent(num_children: usize) -> VecParent {
    let children = (0..num_children)
        .map(|i| ChildRecord {
            n: if i < num_children / 2 { 40 } else { 0 },
            p: 1.0 / num_children as f32,
            w: -5.0,
            ..Default::default()
        })
        .collect();

    VecParent {
        n: 4000,
        num_children_expanded: num_children / 2,
        is_root: true,
        children,
        ..Default::default()
    }
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    init_logging(log::LevelFilter::Info).expect("logger installs exactly once");

    let num_children = 40;
    let parent = synthetic_parent(num_children);
    let settings = KernelSettings::default();
    let params = SelectionParams::new(num_children - 1, 800);

    let mut scores = vec![0.0f32; num_children];
    let mut counts = vec![0i16; num_children];

    let iterations = 100_000;
    let start = Instant::now();
    for _ in 0..iterations {
        compute_top_child_scores(&parent, &parent, &settings, &params, &mut scores, &mut counts);
    }
    let elapsed = start.elapsed();

    log::info!(
        "{} calls in {:?} ({:.1} ns/call), {} children, budget {}",
        iterations,
        elapsed,
        elapsed.as_nanos() as f64 / iterations as f64,
        num_children,
        params.num_visits_to_compute,
    );
    log::info!("final visit counts: {:?}", counts);
}
