//! Randomized parent/children fixtures for property tests, exercising a
//! large number of random inputs while keeping the suite fast.

use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

use crate::parent::{ChildRecord, VecParent};

/// Builds a `VecParent` with `num_children` (`>= 2`) children, a
/// Dirichlet-sampled prior over them, and randomized visit/value state.
pub fn random_parent(rng: &mut impl Rng, num_children: usize) -> VecParent {
    assert!(num_children >= 2, "Dirichlet sampling needs at least 2 outcomes");

    let alpha = vec![0.8f32; num_children];
    let dirichlet = Dirichlet::new(&alpha).expect("alpha values are positive");
    let p: Vec<f32> = dirichlet.sample(rng);

    let num_children_expanded = rng.gen_range(0..=num_children);
    let children = (0..num_children)
        .map(|i| {
            let n: u32 = if i < num_children_expanded {
                rng.gen_range(1..200)
            } else {
                0
            };
            let w = if n > 0 {
                rng.gen_range(-(n as f32)..=(n as f32))
            } else {
                0.0
            };
            ChildRecord {
                n,
                n_in_flight: rng.gen_range(0..3),
                n_in_flight2: rng.gen_range(0..3),
                p: p[i],
                w,
                u: rng.gen_range(0.0..0.5),
                pruned: rng.gen_bool(0.1),
                running_v: rng.gen_range(-1.0..1.0),
            }
        })
        .collect();

    VecParent {
        n: rng.gen_range(0..2000),
        n_in_flight: rng.gen_range(0..5),
        n_in_flight2: rng.gen_range(0..5),
        q: rng.gen_range(-1.0..1.0),
        num_children_expanded,
        is_root: rng.gen_bool(0.5),
        uncertainty: rng.gen_range(0.0..0.3),
        checkmate_known_among_children: false,
        children,
    }
}
