//! `compute_top_child_scores`, the PUCT score and multi-visit allocator.
//!
//! This is the kernel's single entry point. It gathers a snapshot of the
//! parent's children into thread-local scratch, applies the prior adjusters
//! in their fixed order, computes a PUCT score per child, and — when a visit
//! budget is given — distributes it across children so that the result is
//! *exactly* what re-selecting sequentially, one visit at a time, would have
//! produced.

use crate::adjust;
use crate::config::{KernelSettings, MAX_CHILDREN};
use crate::error::KernelFault;
use crate::hole_fill;
use crate::parent::{GatherChildren, ParentView, SelectorId};
use crate::scratch::{self, ChildScratch};

/// Per-call arguments of `compute_top_child_scores`, everything that isn't
/// already part of `KernelSettings` or the parent/scratch state.
pub struct SelectionParams<'a> {
    pub selector_id: SelectorId,
    pub depth: u32,
    pub dynamic_vloss_boost: f32,
    pub min_child_index: usize,
    pub max_child_index: usize,
    /// `0` selects pure-score mode: scores are computed but no visits are
    /// allocated.
    pub num_visits_to_compute: i32,
    pub cpuct_multiplier: f32,
    pub empirical_distrib: Option<&'a [f32]>,
    pub empirical_weight: f32,
}

impl<'a> SelectionParams<'a> {
    pub fn new(max_child_index: usize, num_visits_to_compute: i32) -> Self {
        SelectionParams {
            selector_id: SelectorId::Primary,
            depth: 0,
            dynamic_vloss_boost: 0.0,
            min_child_index: 0,
            max_child_index,
            num_visits_to_compute,
            cpuct_multiplier: 1.0,
            empirical_distrib: None,
            empirical_weight: 0.0,
        }
    }

    pub fn with_selector(mut self, selector_id: SelectorId) -> Self {
        self.selector_id = selector_id;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_dynamic_vloss_boost(mut self, boost: f32) -> Self {
        self.dynamic_vloss_boost = boost;
        self
    }

    pub fn with_cpuct_multiplier(mut self, cpuct_multiplier: f32) -> Self {
        self.cpuct_multiplier = cpuct_multiplier;
        self
    }

    pub fn with_empirical_distribution(mut self, distrib: &'a [f32], weight: f32) -> Self {
        self.empirical_distrib = Some(distrib);
        self.empirical_weight = weight;
        self
    }
}

/// The PUCT score of a single child, given the already-negated (parent's
/// perspective) mean value substitution for unvisited children (`fpu`), the
/// cumulative exploration constant `c`, virtual-loss magnitude `vloss`, and
/// `extra_in_flight` — the number of *tentative* visits this call has
/// already allocated to the child, layered on top of the gathered
/// `n_in_flight`.
///
/// `extra_in_flight` is what lets the multi-visit allocator re-derive a
/// child's score after assigning it some of the budget, without mutating
/// the gathered scratch values themselves.
#[allow(clippy::too_many_arguments)]
fn score_for(
    n: u32,
    n_in_flight: u32,
    p: f32,
    w: f32,
    extra_in_flight: u32,
    fpu: f32,
    c: f32,
    vloss: f32,
    sqrt_n_parent_effective: f32,
) -> f32 {
    let in_flight = n_in_flight + extra_in_flight;

    // Q̄[i] is replaced by the FPU value only for never-visited children; a
    // child with in-flight-but-not-yet-completed visits still uses its
    // (zero) W via the ordinary branch.
    let q_bar = if n == 0 {
        fpu
    } else {
        let denom = (n + in_flight).max(1) as f32;
        // W is gathered from the child's own perspective; negate once here
        // to get the parent's perspective. A pruned child's W of +∞ becomes
        // -∞ here, making it maximally unattractive.
        -((w - vloss * in_flight as f32) / denom)
    };

    q_bar + c * p * sqrt_n_parent_effective / (1 + n + in_flight) as f32
}

/// First-play urgency value substituted for `Q̄[i]` when `N[i] == 0`: parent
/// Q reduced by `FPUReduction * sqrt(SumPVisited)`, clamped to `[-1, 1]`.
fn fpu_value(parent_q: f32, sum_p_visited: f32, fpu_reduction: f32) -> f32 {
    (parent_q - fpu_reduction * sum_p_visited.max(0.0).sqrt()).clamp(-1.0, 1.0)
}

/// Writes `scores[0..numToProcess]` unconditionally; additionally writes
/// `childVisitCounts[0..numToProcess]` when `params.num_visits_to_compute >
/// 0`. Never reads or writes beyond `numToProcess`, and never touches either
/// buffer when `numToProcess == 0`.
///
/// # Panics
///
/// On any contract violation: `min_child_index != 0`, `max_child_index >=
/// MAX_CHILDREN`, a negative visit budget, `NumChildrenExpanded >
/// NumPolicyMoves`, or `selectorId == 1` while `FlowDualSelectors` is
/// disabled. These are programmer errors in the surrounding tree driver, not
/// data the kernel can recover from.
pub fn compute_top_child_scores<P, G>(
    gatherer: &G,
    parent: &P,
    settings: &KernelSettings,
    params: &SelectionParams,
    scores_out: &mut [f32],
    child_visit_counts_out: &mut [i16],
) where
    P: ParentView,
    G: GatherChildren<P>,
{
    if params.min_child_index != 0 {
        panic!("{}", KernelFault::NonZeroMinChildIndex);
    }
    if params.max_child_index >= MAX_CHILDREN {
        panic!(
            "{}",
            KernelFault::MaxChildIndexOutOfRange {
                max_child_index: params.max_child_index,
                max_children: MAX_CHILDREN,
            }
        );
    }
    if params.num_visits_to_compute < 0 {
        panic!("{}", KernelFault::NegativeVisitBudget);
    }
    if params.selector_id == SelectorId::Secondary && !settings.flow_dual_selectors() {
        panic!("{}", KernelFault::SecondarySelectorDisabled);
    }

    let num_policy_moves = parent.num_policy_moves();
    let num_children_expanded = parent.num_children_expanded();
    if num_children_expanded > num_policy_moves {
        panic!(
            "{}",
            KernelFault::ExpandedExceedsPolicyMoves {
                expanded: num_children_expanded,
                policy_moves: num_policy_moves,
            }
        );
    }

    // Invariant 3.
    let num_to_process = (params.max_child_index + 1)
        .min(num_policy_moves)
        .min(MAX_CHILDREN);
    if num_to_process == 0 {
        return;
    }

    scratch::with_scratch(|scratch| {
        gatherer.gather(
            parent,
            params.selector_id,
            params.depth,
            num_to_process,
            scratch,
        );

        adjust::normalize_or_uniform(scratch, num_to_process);

        // Running-Q blend, root only.
        if parent.is_root() && parent.n() > 500 && settings.frac_weight_use_running_q() > 0.0 {
            adjust::running_q_blend(
                scratch,
                num_to_process,
                settings.frac_weight_use_running_q(),
                |i| parent.running_v(i),
            );
        }

        // Empirical-prior blend.
        if let Some(empirical_distrib) = params.empirical_distrib {
            if params.empirical_weight > 0.0 && empirical_distrib.len() >= num_to_process {
                adjust::empirical_prior_blend(
                    scratch,
                    num_to_process,
                    empirical_distrib,
                    params.empirical_weight,
                );
            }
        }

        // Policy decay, root + depth 0 only.
        if parent.is_root()
            && params.depth == 0
            && parent.n() > 100
            && settings.policy_decay_factor() > 0.0
        {
            adjust::policy_decay(
                scratch,
                num_to_process,
                parent.n(),
                settings.policy_decay_factor(),
                settings.policy_decay_exponent(),
            );
        }

        // Uncertainty boosting.
        if parent.n() >= settings.min_n_estimate() && settings.enable_uncertainty_boosting() {
            adjust::uncertainty_boost(
                scratch,
                num_children_expanded,
                parent.uncertainty(),
                settings.min_n_estimate(),
                adjust::default_exploration_multiplier,
            );
        }

        // Root-pruning override.
        if parent.is_root() && params.num_visits_to_compute > 0 {
            adjust::root_pruning_override(scratch, num_to_process, |i| parent.is_pruned(i));
        }

        // Checkmate-certainty propagation.
        let (checkmate_cpuct_multiplier, num_to_process) = adjust::checkmate_certainty_propagation(
            settings.checkmate_certainty_propagation_enabled(),
            settings.checkmate_fully_collapse(),
            parent.checkmate_known_among_children(),
            num_children_expanded,
            num_to_process,
        );
        if num_to_process == 0 {
            return;
        }

        let c = settings.dynamic_cpuct(parent.n()) * params.cpuct_multiplier * checkmate_cpuct_multiplier;

        let base_vloss = settings.virtual_loss();
        let vloss = match params.selector_id {
            SelectorId::Primary => base_vloss,
            SelectorId::Secondary => base_vloss * (1.0 + params.dynamic_vloss_boost),
        };

        let n_parent_effective = parent.n()
            + match params.selector_id {
                SelectorId::Primary => parent.n_in_flight(),
                SelectorId::Secondary => parent.n_in_flight2(),
            };
        let sqrt_n_parent_effective = (n_parent_effective as f32).sqrt();

        let fpu = fpu_value(
            parent.q(),
            parent.sum_p_visited(),
            settings.fpu_reduction(parent.is_root()),
        );

        for i in 0..num_to_process {
            scores_out[i] = score_for(
                scratch.n[i],
                scratch.n_in_flight[i],
                scratch.p[i],
                scratch.w[i],
                0,
                fpu,
                c,
                vloss,
                sqrt_n_parent_effective,
            );
        }

        if params.num_visits_to_compute == 0 {
            return;
        }

        let counts = &mut child_visit_counts_out[..num_to_process];
        for count in counts.iter_mut() {
            *count = 0;
        }
        allocate_visits(
            scratch,
            num_to_process,
            params.num_visits_to_compute as u32,
            fpu,
            c,
            vloss,
            sqrt_n_parent_effective,
            counts,
        );

        hole_fill::fill_holes(counts, num_to_process, num_children_expanded);
    });
}

/// Distributes `budget` visits across `0..num_to_process`, reproducing
/// repeated single-visit selection exactly: each pick re-derives every
/// child's score with its own already-allocated count folded in as extra
/// virtual loss, then assigns the next visit to the argmax (ties breaking
/// toward the lower index, by scanning in increasing index order and
/// requiring a strict improvement to replace the incumbent). No heap
/// allocation: all working state is a fixed-size stack array.
#[allow(clippy::too_many_arguments)]
fn allocate_visits(
    scratch: &ChildScratch,
    num_to_process: usize,
    budget: u32,
    fpu: f32,
    c: f32,
    vloss: f32,
    sqrt_n_parent_effective: f32,
    counts: &mut [i16],
) {
    let mut extra = [0u32; MAX_CHILDREN];

    for _ in 0..budget {
        let mut best_index = 0usize;
        let mut best_score = f32::NEG_INFINITY;

        for i in 0..num_to_process {
            let s = score_for(
                scratch.n[i],
                scratch.n_in_flight[i],
                scratch.p[i],
                scratch.w[i],
                extra[i],
                fpu,
                c,
                vloss,
                sqrt_n_parent_effective,
            );
            if s > best_score {
                best_score = s;
                best_index = i;
            }
        }

        extra[best_index] += 1;
        counts[best_index] += 1;
    }
}
