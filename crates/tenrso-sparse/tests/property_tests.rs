//! Property-based tests for the coordinate and compressed-fiber formats
//!
//! These tests use proptest to check that CSF trees built from arbitrary
//! coordinate tensors keep every non-zero and answer ancestor queries
//! consistently.

use proptest::prelude::*;
use tenrso_sparse::io::{read_tns, write_tns};
use tenrso_sparse::{CooTensor, CsfTensor};

// ============================================================================
// Test Utilities
// ============================================================================

/// Generate a random 3-mode coordinate tensor
fn coo_strategy() -> impl Strategy<Value = CooTensor<f64>> {
    (1usize..7, 1usize..7, 1usize..7).prop_flat_map(|(d0, d1, d2)| {
        prop::collection::vec((0..d0, 0..d1, 0..d2, -100.0..100.0f64), 0..=60).prop_map(
            move |entries| {
                let mut coo = CooTensor::with_capacity(vec![d0, d1, d2], entries.len()).unwrap();
                for (i, j, k, v) in entries {
                    coo.push(&[i, j, k], v).unwrap();
                }
                coo
            },
        )
    })
}

/// Generate a permutation of three modes
fn mode_order_strategy() -> impl Strategy<Value = Vec<usize>> {
    Just(vec![0usize, 1, 2]).prop_shuffle()
}

fn sorted_entries(coo: &CooTensor<f64>) -> Vec<(Vec<usize>, u64)> {
    let mut entries: Vec<_> = coo.iter().map(|(c, v)| (c, v.to_bits())).collect();
    entries.sort();
    entries
}

// ============================================================================
// CSF Construction Properties
// ============================================================================

proptest! {
    /// Property: CSF keeps exactly the non-zeros of its source
    #[test]
    fn prop_csf_preserves_entries(coo in coo_strategy(), order in mode_order_strategy()) {
        let csf = CsfTensor::from_coo(&coo, &order).unwrap();
        prop_assert_eq!(csf.nnz(), coo.nnz());

        let back = csf.to_coo().unwrap();
        prop_assert_eq!(sorted_entries(&back), sorted_entries(&coo));
    }

    /// Property: fiber ranges tile the non-zeros in order
    #[test]
    fn prop_fibers_tile_nonzeros(coo in coo_strategy(), mode in 0usize..3) {
        let csf = CsfTensor::for_mode(&coo, mode).unwrap();

        let mut next = 0;
        for f in 0..csf.nfibs() {
            let range = csf.fiber_range(f);
            prop_assert_eq!(range.start, next);
            prop_assert!(range.end > range.start);
            next = range.end;
        }
        prop_assert_eq!(next, csf.nnz());
    }

    /// Property: all non-zeros of a fiber share their slice and fiber index
    #[test]
    fn prop_fiber_ancestors_shared(coo in coo_strategy(), mode in 0usize..3) {
        let csf = CsfTensor::for_mode(&coo, mode).unwrap();

        for f in 0..csf.nfibs() {
            let range = csf.fiber_range(f);
            let slice = csf.node_index(0, range.start);
            prop_assert_eq!(csf.node_at(1, range.start), f);
            for pos in range {
                prop_assert_eq!(csf.node_index(0, pos), slice);
                prop_assert_eq!(csf.node_index(1, pos), csf.fids(1)[f]);
            }
        }
    }

    /// Property: non-zeros are stored in lexicographic order of the mode order
    #[test]
    fn prop_csf_order_is_lexicographic(coo in coo_strategy(), order in mode_order_strategy()) {
        let csf = CsfTensor::from_coo(&coo, &order).unwrap();

        let keys: Vec<Vec<usize>> = (0..csf.nnz())
            .map(|pos| (0..order.len()).map(|level| csf.node_index(level, pos)).collect())
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        for key in &keys {
            for (level, &m) in order.iter().enumerate() {
                prop_assert!(key[level] < coo.shape()[m]);
            }
        }
    }

    /// Property: sibling nodes are strictly increasing under a parent
    #[test]
    fn prop_children_sorted(coo in coo_strategy(), mode in 0usize..3) {
        let csf = CsfTensor::for_mode(&coo, mode).unwrap();

        prop_assert!(csf.fids(0).windows(2).all(|w| w[0] < w[1]));
        for s in 0..csf.fids(0).len() {
            let children = csf.fptr(0)[s]..csf.fptr(0)[s + 1];
            let mut fibers: Vec<usize> = children.map(|pos| csf.node_at(1, pos)).collect();
            fibers.dedup();
            let ids: Vec<usize> = fibers.iter().map(|&f| csf.fids(1)[f]).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

// ============================================================================
// Text Format Properties
// ============================================================================

proptest! {
    /// Property: writing then reading with a fixed shape restores the tensor
    #[test]
    fn prop_tns_restores_tensor(coo in coo_strategy()) {
        prop_assume!(coo.nnz() > 0);

        let mut buf = Vec::new();
        write_tns(&coo, &mut buf).unwrap();
        let back: CooTensor<f64> = read_tns(buf.as_slice(), Some(coo.shape())).unwrap();

        prop_assert_eq!(back, coo);
    }
}
