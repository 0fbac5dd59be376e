//! Cross-cutting invariants that hold across arbitrary inputs, rather than
//! one worked scenario.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::KernelSettings;
use crate::kernel::{compute_top_child_scores, SelectionParams};
use crate::tests::support::random_parent;

#[test]
fn allocated_visits_conserve_the_requested_budget() {
    let mut rng = SmallRng::seed_from_u64(1);
    let settings = KernelSettings::default();

    for _ in 0..200 {
        let num_children = rng.gen_range(2..20);
        let parent = random_parent(&mut rng, num_children);
        let budget = rng.gen_range(0..40);

        let params = SelectionParams::new(num_children - 1, budget);
        let mut scores = vec![0.0f32; num_children];
        let mut counts = vec![0i16; num_children];

        compute_top_child_scores(&parent, &parent, &settings, &params, &mut scores, &mut counts);

        assert_eq!(counts.iter().map(|&c| c as i64).sum::<i64>(), budget as i64);
        assert!(counts.iter().all(|&c| c >= 0));
    }
}

#[test]
fn pure_score_mode_never_touches_the_visit_count_buffer() {
    let mut rng = SmallRng::seed_from_u64(2);
    let settings = KernelSettings::default();
    let num_children = 6;
    let parent = random_parent(&mut rng, num_children);

    let mut scores = vec![0.0f32; num_children];
    let mut counts = vec![-7i16; num_children]; // sentinel, should survive untouched
    let params = SelectionParams::new(num_children - 1, 0);

    compute_top_child_scores(&parent, &parent, &settings, &params, &mut scores, &mut counts);

    assert!(counts.iter().all(|&c| c == -7));
}

#[test]
fn pure_score_mode_is_idempotent() {
    let mut rng = SmallRng::seed_from_u64(3);
    let settings = KernelSettings::default();
    let num_children = 5;
    let parent = random_parent(&mut rng, num_children);
    let params = SelectionParams::new(num_children - 1, 0);

    let mut first = vec![0.0f32; num_children];
    let mut unused = vec![0i16; num_children];
    compute_top_child_scores(&parent, &parent, &settings, &params, &mut first, &mut unused);

    let mut second = vec![0.0f32; num_children];
    compute_top_child_scores(&parent, &parent, &settings, &params, &mut second, &mut unused);

    assert_eq!(first, second);
}

#[test]
fn exact_equivalence_to_sequential_single_visit_selection() {
    // Hole filling is a distinct concern from the allocator itself; fully
    // expand every child here so it never fires and would otherwise
    // relocate a visit after the fact.
    let mut rng = SmallRng::seed_from_u64(4);
    let settings = KernelSettings::default();

    // spec.md §8: "for V <= 64 the batched allocation equals the sequential
    // reference for 10 000 random inputs."
    for _ in 0..10_000 {
        let num_children = rng.gen_range(2..16);
        let mut parent = random_parent(&mut rng, num_children);
        parent.num_children_expanded = num_children;
        parent.checkmate_known_among_children = false;
        let budget = rng.gen_range(1..=64);

        let batched_params = SelectionParams::new(num_children - 1, budget);
        let mut batched_scores = vec![0.0f32; num_children];
        let mut batched_counts = vec![0i16; num_children];
        compute_top_child_scores(
            &parent,
            &parent,
            &settings,
            &batched_params,
            &mut batched_scores,
            &mut batched_counts,
        );

        let mut sequential_counts = vec![0i16; num_children];
        for _ in 0..budget {
            let single_params = SelectionParams::new(num_children - 1, 1);
            let mut single_scores = vec![0.0f32; num_children];
            let mut single_counts = vec![0i16; num_children];
            compute_top_child_scores(
                &parent,
                &parent,
                &settings,
                &single_params,
                &mut single_scores,
                &mut single_counts,
            );
            let picked = single_counts.iter().position(|&c| c == 1).unwrap();
            sequential_counts[picked] += 1;
            parent.children[picked].n_in_flight += 1;
        }

        assert_eq!(batched_counts, sequential_counts);
    }
}

#[test]
fn uncertainty_boost_applies_a_multiplier_whose_n_weighted_mean_is_one() {
    use crate::adjust::{default_exploration_multiplier, uncertainty_boost};
    use crate::scratch::ChildScratch;

    let mut scratch = ChildScratch::default();
    scratch.p = [0.0; crate::config::MAX_CHILDREN];
    scratch.p[0] = 0.5;
    scratch.p[1] = 0.3;
    scratch.p[2] = 0.2;
    scratch.n[0] = 120;
    scratch.n[1] = 40;
    scratch.n[2] = 9;
    scratch.u[0] = 0.3;
    scratch.u[1] = 0.05;
    scratch.u[2] = 0.6;

    let original_p = [scratch.p[0], scratch.p[1], scratch.p[2]];

    let report = uncertainty_boost(&mut scratch, 3, 0.15, 8, default_exploration_multiplier);
    assert_eq!(report.children_adjusted, 3);

    let weighted: f64 = (0..3)
        .map(|i| {
            let effective_multiplier = scratch.p[i] as f64 / original_p[i] as f64;
            scratch.n[i] as f64 * effective_multiplier
        })
        .sum();
    let total_n: f64 = (0..3).map(|i| scratch.n[i] as f64).sum();

    assert!((weighted / total_n - 1.0).abs() < 1e-6);
}
