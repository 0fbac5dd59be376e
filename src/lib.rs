//! Per-node PUCT child-selection kernel of a neural-network-guided MCTS
//! chess engine.
//!
//! The crate has one entry point, [`kernel::compute_top_child_scores`]: given
//! a parent node (anything implementing [`parent::ParentView`] and
//! [`parent::GatherChildren`]) and a visit budget, it computes a PUCT score
//! per child and, if asked, distributes the budget across children exactly
//! as repeated sequential re-selection would.
//!
//! Everything else in the tree — move generation, position encoding, neural
//! network evaluation, node storage and backup, tournament tooling — lives
//! outside this crate and is represented here only by the trait boundary in
//! [`parent`].

#[cfg(all(feature = "mimalloc", not(feature = "dhat-heap")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static GLOBAL: dhat::Alloc = dhat::Alloc;

pub mod adjust;
pub mod config;
pub mod error;
pub mod hole_fill;
pub mod kernel;
pub mod logging;
pub mod parent;
pub mod scratch;

pub use config::KernelSettings;
pub use error::KernelFault;
pub use kernel::{compute_top_child_scores, SelectionParams};
pub use parent::{GatherChildren, ParentView, SelectorId};

#[cfg(test)]
mod tests;
