//! Thread-local scratch buffers for the child-selection kernel.
//!
//! Each worker thread owns one `ChildScratch`, created lazily on first use
//! and reused for the thread's lifetime. All five arrays are overwritten at
//! the start of every kernel invocation, so no explicit reset is needed
//! between calls; the capacity is fixed at `MAX_CHILDREN`, so no heap
//! allocation occurs on the hot path.

use std::cell::RefCell;

use crate::config::MAX_CHILDREN;

#[derive(Clone)]
pub struct ChildScratch {
    pub n: [u32; MAX_CHILDREN],
    pub n_in_flight: [u32; MAX_CHILDREN],
    pub p: [f32; MAX_CHILDREN],
    pub w: [f32; MAX_CHILDREN],
    pub u: [f32; MAX_CHILDREN],
}

impl Default for ChildScratch {
    fn default() -> Self {
        ChildScratch {
            n: [0; MAX_CHILDREN],
            n_in_flight: [0; MAX_CHILDREN],
            p: [0.0; MAX_CHILDREN],
            w: [0.0; MAX_CHILDREN],
            u: [0.0; MAX_CHILDREN],
        }
    }
}

thread_local! {
    static SCRATCH: RefCell<ChildScratch> = RefCell::new(ChildScratch::default());
}

/// Runs `f` with exclusive access to this thread's scratch buffers,
/// initializing them on first use. The buffer is thread-local and therefore
/// lock-free by construction; no other thread can ever observe it.
pub fn with_scratch<R>(f: impl FnOnce(&mut ChildScratch) -> R) -> R {
    SCRATCH.with(|cell| f(&mut cell.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_is_zeroed_on_first_use() {
        with_scratch(|scratch| {
            assert_eq!(scratch.n[0], 0);
            assert_eq!(scratch.p[0], 0.0);
        });
    }

    #[test]
    fn scratch_is_reused_across_calls_on_the_same_thread() {
        with_scratch(|scratch| scratch.n[3] = 42);
        with_scratch(|scratch| assert_eq!(scratch.n[3], 42));
    }
}
