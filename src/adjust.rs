//! Adjusters that reshape the gathered priors and values before scoring.
//!
//! Each step is a pure, in-place transform of the scratch buffers. The
//! kernel applies them in a fixed order; every condition under which a step
//! is a no-op ("root only", "`N > 500`", ...) is checked by the caller in
//! `kernel::compute_top_child_scores`, not by these functions themselves —
//! keeping them simple, pure transforms makes each one trivially
//! unit-testable in isolation.

use log::warn;

use crate::scratch::ChildScratch;

/// Step 1: blend in exponentially-weighted recent per-child outcomes
/// (root only). `running_v` is supplied by the external root-move tracker.
///
/// `W[i] <- (1 - f) * W[i] + f * RunningV[i] * N[i]`
pub fn running_q_blend(scratch: &mut ChildScratch, num_to_process: usize, frac: f32, running_v: impl Fn(usize) -> f32) {
    for i in 0..num_to_process {
        let n_i = scratch.n[i] as f32;
        scratch.w[i] = (1.0 - frac) * scratch.w[i] + frac * running_v(i) * n_i;
    }
}

/// Step 2: blend the gathered priors with an externally supplied empirical
/// distribution (e.g. from game-specific statistics).
///
/// `P[i] <- (1 - w) * P[i] + w * empiricalDistrib[i]`
pub fn empirical_prior_blend(scratch: &mut ChildScratch, num_to_process: usize, empirical_distrib: &[f32], weight: f32) {
    debug_assert!(empirical_distrib.len() >= num_to_process);
    for i in 0..num_to_process {
        scratch.p[i] = (1.0 - weight) * scratch.p[i] + weight * empirical_distrib[i];
    }
}

/// Step 3: flatten root priors toward uniform as visit count grows, letting
/// search breathe at heavily-visited root nodes instead of staying pinned
/// to the network's initial policy.
///
/// `softmax = 1 + ln(1 + f * 2e-4 * N^e)` is always `>= 1`, so
/// `P[i] <- P[i]^(1/softmax)` raises every component toward 1, compressing
/// the distribution; rescaling afterward keeps `sum P` unchanged.
pub fn policy_decay(scratch: &mut ChildScratch, num_to_process: usize, n_parent: u32, factor: f32, exponent: f32) {
    let original_sum: f32 = scratch.p[..num_to_process].iter().sum();
    if original_sum <= 0.0 {
        return;
    }

    let softmax = 1.0 + (1.0 + factor * 2e-4 * (n_parent as f32).powf(exponent)).ln();
    let inv_softmax = 1.0 / softmax;

    for i in 0..num_to_process {
        scratch.p[i] = scratch.p[i].max(0.0).powf(inv_softmax);
    }

    let decayed_sum: f32 = scratch.p[..num_to_process].iter().sum();
    if decayed_sum > 0.0 {
        let rescale = original_sum / decayed_sum;
        for i in 0..num_to_process {
            scratch.p[i] *= rescale;
        }
    }
}

/// Result of applying uncertainty boosting, reported so callers can verify
/// the N-weighted mean of the applied multipliers is `1.0` — the
/// normalization keeps the overall CPUCT magnitude invariant even as
/// individual children's exploration weight is redistributed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UncertaintyBoostReport {
    pub children_adjusted: usize,
    pub n_weighted_mean_multiplier: f32,
}

/// Step 4: widen exploration toward children with noisier value estimates.
/// Only expanded children (`i < num_children_expanded`) with
/// `N[i] >= min_n_estimate` are adjusted. Normalization divides by the
/// N-weighted mean multiplier exactly once, computed once and divided out
/// once (see DESIGN.md for why, not twice).
pub fn uncertainty_boost(
    scratch: &mut ChildScratch,
    num_children_expanded: usize,
    parent_mad: f32,
    min_n_estimate: u32,
    exploration_multiplier: impl Fn(f32, f32) -> f32,
) -> UncertaintyBoostReport {
    let mut adjusted = [false; crate::config::MAX_CHILDREN];
    let mut weighted_sum = 0.0f64;
    let mut weight_total = 0.0f64;

    for i in 0..num_children_expanded {
        if scratch.n[i] < min_n_estimate {
            continue;
        }
        let mult = exploration_multiplier(scratch.u[i], parent_mad);
        scratch.p[i] *= mult;
        adjusted[i] = true;
        weighted_sum += scratch.n[i] as f64 * mult as f64;
        weight_total += scratch.n[i] as f64;
    }

    if weight_total <= 0.0 {
        return UncertaintyBoostReport {
            children_adjusted: 0,
            n_weighted_mean_multiplier: 1.0,
        };
    }

    let avg = (weighted_sum / weight_total) as f32;
    if avg > 0.0 {
        for i in 0..num_children_expanded {
            if adjusted[i] {
                scratch.p[i] /= avg;
            }
        }
    }

    UncertaintyBoostReport {
        children_adjusted: adjusted[..num_children_expanded].iter().filter(|&&a| a).count(),
        n_weighted_mean_multiplier: avg,
    }
}

/// A reasonable default for the externally-supplied exploration multiplier:
/// monotone increasing in `U[i] / parentMAD`, clamped to keep the prior
/// from being scaled to zero or blowing up.
pub fn default_exploration_multiplier(u: f32, parent_mad: f32) -> f32 {
    if parent_mad <= f32::EPSILON {
        return 1.0;
    }
    let ratio = (u / parent_mad).max(0.0);
    ratio.sqrt().clamp(0.25, 4.0)
}

/// Make root-pruned, already-visited moves unattractive without suppressing
/// unvisited ones. Pruned moves that have never been visited are left
/// untouched — suppressing them would permanently block the subtree from
/// ever being descended.
pub fn root_pruning_override(scratch: &mut ChildScratch, num_to_process: usize, is_pruned: impl Fn(usize) -> bool) {
    for i in 0..num_to_process {
        if scratch.n[i] > 0 && is_pruned(i) {
            scratch.w[i] = f32::INFINITY;
        }
    }
}

/// Collapse exploration once a forced mate is known among the children.
/// Returns the CPUCT multiplier to apply and, in "fully collapse" mode, the
/// new `numToProcess` restricted to already expanded children.
pub fn checkmate_certainty_propagation(
    enabled: bool,
    fully_collapse: bool,
    checkmate_known_among_children: bool,
    num_children_expanded: usize,
    num_to_process: usize,
) -> (f32, usize) {
    if !enabled || !checkmate_known_among_children {
        return (1.0, num_to_process);
    }
    if fully_collapse {
        (0.0, num_children_expanded.min(num_to_process))
    } else {
        (0.1, num_to_process)
    }
}

/// Numerical-degeneracy recovery: a zero or NaN-contaminated prior sum is
/// clamped to a uniform distribution over `numToProcess` rather than ever
/// propagating a NaN score.
pub fn normalize_or_uniform(scratch: &mut ChildScratch, num_to_process: usize) {
    if num_to_process == 0 {
        return;
    }
    let sum: f32 = scratch.p[..num_to_process].iter().sum();
    if sum.is_finite() && sum > 1e-8 {
        return;
    }
    warn!(
        "degenerate policy sum {} over {} children; falling back to uniform prior",
        sum, num_to_process
    );
    let uniform = 1.0 / num_to_process as f32;
    for i in 0..num_to_process {
        scratch.p[i] = uniform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_with_p(values: &[f32]) -> ChildScratch {
        let mut scratch = ChildScratch::default();
        for (i, &v) in values.iter().enumerate() {
            scratch.p[i] = v;
        }
        scratch
    }

    #[test]
    fn empirical_blend_interpolates() {
        let mut scratch = scratch_with_p(&[1.0, 0.0]);
        empirical_prior_blend(&mut scratch, 2, &[0.0, 1.0], 0.5);
        assert_eq!(scratch.p[0], 0.5);
        assert_eq!(scratch.p[1], 0.5);
    }

    #[test]
    fn policy_decay_preserves_mass() {
        let mut scratch = scratch_with_p(&[0.6, 0.3, 0.1]);
        let original_sum: f32 = scratch.p[..3].iter().sum();
        policy_decay(&mut scratch, 3, 10_000, 1.0, 0.5);
        let new_sum: f32 = scratch.p[..3].iter().sum();
        assert!((new_sum - original_sum).abs() <= 1e-5);
    }

    #[test]
    fn policy_decay_flattens_the_distribution_toward_uniform() {
        let mut scratch = scratch_with_p(&[0.6, 0.3, 0.1]);
        policy_decay(&mut scratch, 3, 10_000, 1.0, 0.5);
        // The largest prior shrinks and the smallest grows, but relative
        // order survives the compression.
        assert!(scratch.p[0] < 0.6);
        assert!(scratch.p[2] > 0.1);
        assert!(scratch.p[0] > scratch.p[1] && scratch.p[1] > scratch.p[2]);
    }

    #[test]
    fn uncertainty_boost_preserves_weighted_mean() {
        let mut scratch = ChildScratch::default();
        scratch.p[0] = 0.5;
        scratch.p[1] = 0.5;
        scratch.n[0] = 100;
        scratch.n[1] = 50;
        scratch.u[0] = 0.2;
        scratch.u[1] = 0.05;

        let report = uncertainty_boost(&mut scratch, 2, 0.1, 8, default_exploration_multiplier);
        assert_eq!(report.children_adjusted, 2);
    }

    #[test]
    fn root_pruning_sets_infinite_w_only_on_visited_children() {
        let mut scratch = ChildScratch::default();
        scratch.n[0] = 5;
        scratch.n[1] = 0;
        root_pruning_override(&mut scratch, 2, |_| true);
        assert!(scratch.w[0].is_infinite());
        assert_eq!(scratch.w[1], 0.0);
    }

    #[test]
    fn checkmate_propagation_full_collapse_restricts_to_expanded() {
        let (mult, num) = checkmate_certainty_propagation(true, true, true, 3, 7);
        assert_eq!(mult, 0.0);
        assert_eq!(num, 3);
    }

    #[test]
    fn checkmate_propagation_partial_keeps_minimal_exploration() {
        let (mult, num) = checkmate_certainty_propagation(true, false, true, 3, 7);
        assert_eq!(mult, 0.1);
        assert_eq!(num, 7);
    }

    #[test]
    fn normalize_or_uniform_recovers_from_zero_sum() {
        let mut scratch = scratch_with_p(&[0.0, 0.0, 0.0]);
        normalize_or_uniform(&mut scratch, 3);
        assert!((scratch.p[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_or_uniform_recovers_from_nan() {
        let mut scratch = scratch_with_p(&[f32::NAN, 0.3]);
        normalize_or_uniform(&mut scratch, 2);
        assert_eq!(scratch.p[0], 0.5);
        assert_eq!(scratch.p[1], 0.5);
    }
}
