//! Leak-resistor normalization for a connection block.
//!
//! # Overview
//!
//! In the analog-circuit reading of the model, every document and every term
//! has a leak resistor that bleeds current to ground, bounding how much any
//! row can reinforce itself. A [`ResistorBlock`] holds those resistances as
//! two diagonal matrices and composes them into the Λ operator of equation 9
//! in Giuliano (1963):
//!
//! ```text
//!     [[Λ_doc,      0],
//!      [    0, Λ_term]]
//! ```
//!
//! Left-multiplying Λ onto a composed connection block scales each row of
//! the network by its reciprocal leak, which is what "normalizing" the
//! block means here.
//!
//! # Formulas
//!
//! From the quadrants derived from the document-term matrix `C` being
//! normalized (`B = Cᵀ`, `E = C·B`, `D = B·C`) and the scalar `norm_by`:
//!
//! ```text
//!     λ_i = 1 / (norm_by + Σ_j E[i,j] + Σ_j C[i,j])      (eq. 7, m values)
//!     γ_j = 1 / (norm_by + Σ_i B[j,i] + Σ   D)           (eq. 8, n values)
//! ```
//!
//! Note the asymmetry: eq. 8 adds the *total* sum of `D` — one scalar shared
//! by every row — where eq. 7 adds per-row sums. Note also that eq. 7, which
//! Giuliano labels term normalization, produces the document-sized diagonal,
//! and eq. 8 the term-sized one. Both oddities are preserved exactly; see
//! DESIGN.md for the open question around them.

use nalgebra::{DMatrix, DVector};

use crate::error::{AcornError, Result};

/// The Λ diagonal operator: per-document and per-term leak resistances.
///
/// Rebuilt from scratch on every connection-block composition and never
/// retained between queries, so the resistances always reflect the current
/// `norm_by` and the block's document-term quadrant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistorBlock {
    m: usize,
    n: usize,
    /// m×m diagonal from eq. 7, occupying the `E` quadrant.
    lambda_doc: DMatrix<f64>,
    /// n×n diagonal from eq. 8, occupying the `D` quadrant.
    lambda_term: DMatrix<f64>,
}

impl ResistorBlock {
    /// Build the resistor diagonals for the block whose document-term
    /// quadrant is `c`.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::InvalidParameter`] if `norm_by` is outside
    /// `[0, 1]`.
    pub fn from_quadrant(c: &DMatrix<f64>, norm_by: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&norm_by) {
            return Err(AcornError::InvalidParameter(norm_by));
        }

        let (m, n) = c.shape();
        let b = c.transpose();
        let e = c * &b;
        let d = &b * c;

        let lambda_doc = DMatrix::from_diagonal(&DVector::from_iterator(
            m,
            (0..m).map(|i| 1.0 / (norm_by + e.row(i).sum() + c.row(i).sum())),
        ));

        let d_total: f64 = d.sum();
        let lambda_term = DMatrix::from_diagonal(&DVector::from_iterator(
            n,
            (0..n).map(|j| 1.0 / (norm_by + b.row(j).sum() + d_total)),
        ));

        Ok(Self {
            m,
            n,
            lambda_doc,
            lambda_term,
        })
    }

    /// The m×m document diagonal.
    #[must_use]
    pub const fn lambda_doc(&self) -> &DMatrix<f64> {
        &self.lambda_doc
    }

    /// The n×n term diagonal.
    #[must_use]
    pub const fn lambda_term(&self) -> &DMatrix<f64> {
        &self.lambda_term
    }

    /// Compose the `(m+n) × (m+n)` Λ operator: the diagonals in the `E` and
    /// `D` quadrants, zeros in `C` and `B`.
    #[must_use]
    pub fn composed(&self) -> DMatrix<f64> {
        let size = self.m + self.n;
        let mut g = DMatrix::zeros(size, size);
        g.view_mut((0, 0), (self.m, self.m))
            .copy_from(&self.lambda_doc);
        g.view_mut((self.m, self.m), (self.n, self.n))
            .copy_from(&self.lambda_term);
        g
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_c() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0])
    }

    #[test]
    fn rejects_norm_by_below_zero() {
        let err = ResistorBlock::from_quadrant(&sample_c(), -0.1).unwrap_err();
        assert_eq!(err, AcornError::InvalidParameter(-0.1));
    }

    #[test]
    fn rejects_norm_by_above_one() {
        let err = ResistorBlock::from_quadrant(&sample_c(), 1.5).unwrap_err();
        assert_eq!(err, AcornError::InvalidParameter(1.5));
    }

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(ResistorBlock::from_quadrant(&sample_c(), 0.0).is_ok());
        assert!(ResistorBlock::from_quadrant(&sample_c(), 1.0).is_ok());
    }

    #[test]
    fn document_diagonal_uses_per_row_sums() {
        // For C = [[1,0,1],[0,1,1]]: E = [[2,1],[1,2]], so each E row sums
        // to 3 and each C row sums to 2. With norm_by = 1: λ = 1/6.
        let resistor = ResistorBlock::from_quadrant(&sample_c(), 1.0).expect("valid");
        let lambda = resistor.lambda_doc();
        assert_eq!(lambda.shape(), (2, 2));
        assert!((lambda[(0, 0)] - 1.0 / 6.0).abs() < 1e-12);
        assert!((lambda[(1, 1)] - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(lambda[(0, 1)], 0.0);
    }

    #[test]
    fn term_diagonal_shares_the_total_d_sum() {
        // D = [[1,0,1],[0,1,1],[1,1,2]] sums to 8 in total. B row sums are
        // 1, 1, 2. With norm_by = 1: γ = 1/10, 1/10, 1/11.
        let resistor = ResistorBlock::from_quadrant(&sample_c(), 1.0).expect("valid");
        let gamma = resistor.lambda_term();
        assert_eq!(gamma.shape(), (3, 3));
        assert!((gamma[(0, 0)] - 1.0 / 10.0).abs() < 1e-12);
        assert!((gamma[(1, 1)] - 1.0 / 10.0).abs() < 1e-12);
        assert!((gamma[(2, 2)] - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn composed_operator_is_diagonal() {
        let resistor = ResistorBlock::from_quadrant(&sample_c(), 0.5).expect("valid");
        let g = resistor.composed();
        assert_eq!(g.shape(), (5, 5));
        for i in 0..5 {
            for j in 0..5 {
                if i == j {
                    assert!(g[(i, j)] > 0.0);
                } else {
                    assert_eq!(g[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn off_diagonal_quadrants_are_zero() {
        let resistor = ResistorBlock::from_quadrant(&sample_c(), 1.0).expect("valid");
        let g = resistor.composed();
        // The C quadrant (rows 0..2, cols 2..5) and B quadrant must be zero.
        assert!(g.view((0, 2), (2, 3)).iter().all(|&v| v == 0.0));
        assert!(g.view((2, 0), (3, 2)).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn lower_norm_by_means_larger_resistances() {
        let loose = ResistorBlock::from_quadrant(&sample_c(), 0.0).expect("valid");
        let tight = ResistorBlock::from_quadrant(&sample_c(), 1.0).expect("valid");
        assert!(loose.lambda_doc()[(0, 0)] > tight.lambda_doc()[(0, 0)]);
    }
}
