//! Fault taxonomy for the kernel.
//!
//! The hot path itself never returns a `Result` — it is pure computation and
//! has no retry logic. `KernelFault` exists for the few boundary operations
//! that a cautious caller may want to check instead of tripping an assert,
//! such as validating a `SelectionParams` built from untrusted input before
//! calling into the kernel.

use std::fmt;

// `SettingOutOfRange` carries an `f32`, which has no total `Eq`, so this
// enum derives `PartialEq` only (still enough for the assertions in tests).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KernelFault {
    /// `minChildIndex` was non-zero. Only 0 is supported.
    NonZeroMinChildIndex,
    /// `maxChildIndex` was at or beyond `MAX_CHILDREN`.
    MaxChildIndexOutOfRange { max_child_index: usize, max_children: usize },
    /// `numVisitsToCompute` was negative.
    NegativeVisitBudget,
    /// `NumChildrenExpanded` exceeded `NumPolicyMoves`, an inconsistent tree state.
    ExpandedExceedsPolicyMoves { expanded: usize, policy_moves: usize },
    /// `selectorId == 1` was requested but `FlowDualSelectors` is disabled in
    /// `KernelSettings`.
    SecondarySelectorDisabled,
    /// A `KernelSettings` field was out of the range the kernel can safely
    /// operate on (see `KernelSettings::validated`).
    SettingOutOfRange { field: &'static str, value: f32 },
}

impl fmt::Display for KernelFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KernelFault::NonZeroMinChildIndex => {
                write!(f, "minChildIndex must be 0")
            }
            KernelFault::MaxChildIndexOutOfRange { max_child_index, max_children } => write!(
                f,
                "maxChildIndex {} is not less than MAX_CHILDREN {}",
                max_child_index, max_children
            ),
            KernelFault::NegativeVisitBudget => write!(f, "numVisitsToCompute must be non-negative"),
            KernelFault::ExpandedExceedsPolicyMoves { expanded, policy_moves } => write!(
                f,
                "NumChildrenExpanded {} exceeds NumPolicyMoves {}",
                expanded, policy_moves
            ),
            KernelFault::SecondarySelectorDisabled => write!(
                f,
                "selectorId 1 was requested but FlowDualSelectors is disabled"
            ),
            KernelFault::SettingOutOfRange { field, value } => {
                write!(f, "KernelSettings field {} is out of range: {}", field, value)
            }
        }
    }
}

impl std::error::Error for KernelFault {}
