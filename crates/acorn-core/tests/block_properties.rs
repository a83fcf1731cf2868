//! Property tests for the block algebra: shape invariants, composition
//! idempotence, and the restoration guarantee across arbitrary count
//! tables.

use acorn_core::{BlockMatrix, ConnectionBlock, QuadrantOverrides};
use proptest::prelude::*;

/// Arbitrary small document-term count tables: 1-6 documents, 1-6 terms,
/// counts in 0..10. Small enough that the dense solves stay well away from
/// overflow, large enough to cover non-square and degenerate shapes.
fn arb_dtm() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..=6, 1usize..=6).prop_flat_map(|(m, n)| {
        proptest::collection::vec(
            proptest::collection::vec((0u8..10).prop_map(f64::from), n),
            m,
        )
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn quadrant_shapes_hold_for_all_tables(dtm in arb_dtm()) {
        let (m, n) = (dtm.len(), dtm[0].len());
        let block = ConnectionBlock::new(&dtm).expect("valid DTM");

        prop_assert_eq!(block.doc_count(), m);
        prop_assert_eq!(block.term_count(), n);
        prop_assert_eq!(block.state().shape(), (m + n, m + n));

        let (e, c, b, d) = block.decompose();
        prop_assert_eq!(e.shape(), (m, m));
        prop_assert_eq!(c.shape(), (m, n));
        prop_assert_eq!(b.shape(), (n, m));
        prop_assert_eq!(d.shape(), (n, n));
    }

    #[test]
    fn transpose_invariant_holds_before_normalization(dtm in arb_dtm()) {
        // The raw block (no resistor applied) must keep B exactly Cᵀ.
        let mut block = BlockMatrix::from_table(&dtm).expect("valid table");
        block.compose(&QuadrantOverrides::default());

        let (_e, c, b, _d) = block.decompose();
        prop_assert_eq!(b, c.transpose());
    }

    #[test]
    fn compose_is_idempotent(dtm in arb_dtm()) {
        let mut block = BlockMatrix::from_table(&dtm).expect("valid table");
        block.compose(&QuadrantOverrides::default());
        let first = block.state().clone();
        block.compose(&QuadrantOverrides::default());
        prop_assert_eq!(&first, block.state());
    }

    #[test]
    fn queries_never_disturb_canonical_state(
        dtm in arb_dtm(),
        norm_by in 0.0f64..=1.0,
    ) {
        let n = dtm[0].len();
        let block = ConnectionBlock::new(&dtm).expect("valid DTM");
        let before = block.decompose();

        // Select every other term; results themselves may fail on singular
        // systems, which must not matter for the stored state.
        let q: Vec<f64> = (0..n).map(|j| f64::from(u8::from(j % 2 == 0))).collect();
        let _ = block.query(&q, norm_by);
        let _ = block.query_dtm(&q, norm_by);

        prop_assert_eq!(before, block.decompose());
    }

    #[test]
    fn degenerate_query_matches_full_query_on_zeroed_block(
        dtm in arb_dtm(),
        norm_by in 0.1f64..=1.0,
    ) {
        let (m, n) = (dtm.len(), dtm[0].len());
        let q: Vec<f64> = (0..n).map(|j| f64::from(u8::from(j % 2 == 0))).collect();

        let block = ConnectionBlock::with_norm(&dtm, norm_by).expect("valid DTM");
        let mut zeroed = ConnectionBlock::with_norm(&dtm, norm_by).expect("valid DTM");
        zeroed
            .compose(&QuadrantOverrides::zeroed_e_and_d(m, n), None)
            .expect("compose succeeds");

        // Both paths solve the same system; compare when both succeed.
        if let (Ok(degenerate), Ok(full)) =
            (block.query_dtm(&q, norm_by), zeroed.query(&q, norm_by))
        {
            for (a, b) in degenerate.iter().zip(full.iter()) {
                prop_assert!((a - b).abs() < 1e-9, "degenerate {} vs full {}", a, b);
            }
        }
    }

    #[test]
    fn query_scores_are_finite(dtm in arb_dtm()) {
        let n = dtm[0].len();
        let block = ConnectionBlock::new(&dtm).expect("valid DTM");
        let q: Vec<f64> = vec![1.0; n];

        if let Ok(scores) = block.query(&q, 1.0) {
            prop_assert_eq!(scores.len(), dtm.len());
            for &s in scores.iter() {
                prop_assert!(s.is_finite());
            }
        }
    }
}
