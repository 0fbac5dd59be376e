//! Closing gaps in the expansion prefix after visit allocation.
//!
//! After allocation the expansion prefix must stay dense: downstream code
//! indexes the first `NumChildrenExpanded + k` children as "the live ones",
//! and a gap would make a child unreachable. This scans once from
//! `NumChildrenExpanded` and performs *at most one* left-shift before
//! returning, relying on the caller to invoke the kernel (and this pass)
//! repeatedly across a search rather than exhaustively filling every gap in
//! one call.

/// Shifts at most one visit leftward to close the first gap found at or
/// after `num_children_expanded`. `counts` covers indices
/// `0..num_to_process`.
pub fn fill_holes(counts: &mut [i16], num_to_process: usize, num_children_expanded: usize) {
    for i in num_children_expanded..num_to_process {
        if counts[i] != 0 {
            continue;
        }
        if let Some(j) = ((i + 1)..num_to_process).find(|&j| counts[j] > 0) {
            counts[i] = 1;
            counts[j] -= 1;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_the_first_gap_from_the_right() {
        let mut counts = [0i16; 4];
        counts[0] = 3;
        counts[3] = 2;
        fill_holes(&mut counts, 4, 1);
        assert_eq!(counts, [3, 1, 0, 1]);
    }

    #[test]
    fn leaves_a_second_gap_in_the_same_call() {
        let mut counts = [0i16; 5];
        counts[0] = 1;
        counts[4] = 3;
        fill_holes(&mut counts, 5, 1);
        // Only the first gap (index 1) is closed; index 2 is still a gap.
        assert_eq!(counts, [1, 1, 0, 0, 2]);
    }

    #[test]
    fn no_gap_is_a_no_op() {
        let mut counts = [2i16, 3, 0, 0];
        fill_holes(&mut counts, 4, 2);
        assert_eq!(counts, [2, 3, 0, 0]);
    }

    #[test]
    fn budget_is_conserved_by_a_shift() {
        let mut counts = [0i16; 4];
        counts[0] = 3;
        counts[3] = 2;
        let before: i16 = counts.iter().sum();
        fill_holes(&mut counts, 4, 1);
        let after: i16 = counts.iter().sum();
        assert_eq!(before, after);
    }
}
