//! The parent-node view and the child-stat gather contract. Both are
//! external collaborators — the surrounding tree owns the real node
//! storage — so this module only defines the trait boundary, plus one
//! reference implementation (`VecParent`) used by tests and the demo
//! binary to stand in for the enclosing tree.

use crate::scratch::ChildScratch;

/// Which of the two concurrent descent identities is selecting. Dual
/// selectors share one tree but see distinct in-flight counters, enabling
/// two decorrelated concurrent descents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorId {
    Primary = 0,
    Secondary = 1,
}

impl SelectorId {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => SelectorId::Primary,
            1 => SelectorId::Secondary,
            other => panic!("selectorId must be 0 or 1, got {}", other),
        }
    }
}

/// The parent-node fields the kernel reads.
pub trait ParentView {
    /// Total completed visits to this node.
    fn n(&self) -> u32;
    /// Visits currently in flight under selector 0.
    fn n_in_flight(&self) -> u32;
    /// Visits currently in flight under selector 1.
    fn n_in_flight2(&self) -> u32;
    /// Mean value from this node's own perspective, in `[-1, 1]`.
    fn q(&self) -> f32;
    /// Sum of prior mass over children with at least one visit, in `[0, 1]`.
    fn sum_p_visited(&self) -> f32;
    /// Number of legal/policy children.
    fn num_policy_moves(&self) -> usize;
    /// Number of children visited at least once; always `<= num_policy_moves`,
    /// and invariantly the first `num_children_expanded` children in index
    /// order are the expanded ones.
    fn num_children_expanded(&self) -> usize;
    fn is_root(&self) -> bool;
    /// Mean absolute deviation of this node's backed-up value.
    fn uncertainty(&self) -> f32;
    /// Whether a child is a proven forced mate.
    fn checkmate_known_among_children(&self) -> bool;
    /// External pruning status for a child.
    fn is_pruned(&self, child_index: usize) -> bool;
    /// Exponentially-weighted recent per-child value from the root-move
    /// tracker, consulted only at the root.
    fn running_v(&self, child_index: usize) -> f32;
}

/// The `gather(parent, selectorId, depth, lastChild, scratch)` contract.
/// Implementations write `N`, `InFlight`, `P`, `W`, `U` for
/// `0..num_to_process` and return nothing further — the kernel itself
/// derives `numToProcess` before calling this.
pub trait GatherChildren<P: ParentView> {
    fn gather(
        &self,
        parent: &P,
        selector: SelectorId,
        depth: u32,
        num_to_process: usize,
        scratch: &mut ChildScratch,
    );
}

/// Per-child record backing the in-memory reference parent used by tests
/// and the demo binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChildRecord {
    pub n: u32,
    pub n_in_flight: u32,
    pub n_in_flight2: u32,
    pub p: f32,
    pub w: f32,
    pub u: f32,
    pub pruned: bool,
    pub running_v: f32,
}

/// A plain in-memory parent node, standing in for "the enclosing tree" in
/// tests and the demo binary.
#[derive(Clone, Debug, Default)]
pub struct VecParent {
    pub n: u32,
    pub n_in_flight: u32,
    pub n_in_flight2: u32,
    pub q: f32,
    pub num_children_expanded: usize,
    pub is_root: bool,
    pub uncertainty: f32,
    pub checkmate_known_among_children: bool,
    pub children: Vec<ChildRecord>,
}

impl VecParent {
    pub fn sum_p_visited(&self) -> f32 {
        self.children
            .iter()
            .filter(|c| c.n > 0)
            .map(|c| c.p)
            .sum()
    }
}

impl ParentView for VecParent {
    fn n(&self) -> u32 {
        self.n
    }

    fn n_in_flight(&self) -> u32 {
        self.n_in_flight
    }

    fn n_in_flight2(&self) -> u32 {
        self.n_in_flight2
    }

    fn q(&self) -> f32 {
        self.q
    }

    fn sum_p_visited(&self) -> f32 {
        VecParent::sum_p_visited(self)
    }

    fn num_policy_moves(&self) -> usize {
        self.children.len()
    }

    fn num_children_expanded(&self) -> usize {
        self.num_children_expanded
    }

    fn is_root(&self) -> bool {
        self.is_root
    }

    fn uncertainty(&self) -> f32 {
        self.uncertainty
    }

    fn checkmate_known_among_children(&self) -> bool {
        self.checkmate_known_among_children
    }

    fn is_pruned(&self, child_index: usize) -> bool {
        self.children[child_index].pruned
    }

    fn running_v(&self, child_index: usize) -> f32 {
        self.children[child_index].running_v
    }
}

impl GatherChildren<VecParent> for VecParent {
    fn gather(
        &self,
        parent: &VecParent,
        selector: SelectorId,
        _depth: u32,
        num_to_process: usize,
        scratch: &mut ChildScratch,
    ) {
        debug_assert!(std::ptr::eq(self, parent));
        for i in 0..num_to_process {
            let child = &self.children[i];
            scratch.n[i] = child.n;
            scratch.n_in_flight[i] = match selector {
                SelectorId::Primary => child.n_in_flight,
                SelectorId::Secondary => child.n_in_flight2,
            };
            scratch.p[i] = child.p;
            scratch.w[i] = child.w;
            scratch.u[i] = child.u;
        }
    }
}
