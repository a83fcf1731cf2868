//! The block matrix underlying the analog-circuit association model.
//!
//! # Overview
//!
//! A [`BlockMatrix`] is a square matrix partitioned into four quadrants
//! derived from a document-term matrix `C`:
//!
//! ```text
//!     [[E, C],        E = C·B   (document-document, m×m)
//!      [B, D]]        B = Cᵀ    (term-document,     n×m)
//!                     D = B·C   (term-term,         n×n)
//! ```
//!
//! The composed state `G` is the `(m+n) × (m+n)` assembly of those quadrants
//! (equation 1 in Giuliano 1963). Queries alter individual quadrants before
//! composing; [`BlockMatrix::decompose`] splits `G` back apart along the
//! stored `m`/`n` boundary so the altered quadrants can be read out.

use nalgebra::DMatrix;

use crate::error::{AcornError, Result};

// ---------------------------------------------------------------------------
// Quadrant overrides
// ---------------------------------------------------------------------------

/// Optional replacement quadrants for a composition.
///
/// Any quadrant left as `None` is pulled from the block's stored matrices.
/// Composing with all-`None` overrides therefore reproduces the canonical
/// assembly.
#[derive(Debug, Clone, Default)]
pub struct QuadrantOverrides {
    /// Replacement document-document matrix (m×m).
    pub e: Option<DMatrix<f64>>,
    /// Replacement document-term matrix (m×n).
    pub c: Option<DMatrix<f64>>,
    /// Replacement term-document matrix (n×m).
    pub b: Option<DMatrix<f64>>,
    /// Replacement term-term matrix (n×n).
    pub d: Option<DMatrix<f64>>,
}

impl QuadrantOverrides {
    /// Overrides that zero out the `E` and `D` quadrants, leaving `C` and
    /// `B` intact. Used by the degenerate-network query, which assumes no
    /// document-document or term-term information is available.
    #[must_use]
    pub fn zeroed_e_and_d(m: usize, n: usize) -> Self {
        Self {
            e: Some(DMatrix::zeros(m, m)),
            d: Some(DMatrix::zeros(n, n)),
            ..Self::default()
        }
    }

    /// Whether every quadrant is left to the block's stored matrices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.e.is_none() && self.c.is_none() && self.b.is_none() && self.d.is_none()
    }
}

// ---------------------------------------------------------------------------
// BlockMatrix
// ---------------------------------------------------------------------------

/// A square matrix partitioned into document and term quadrants.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMatrix {
    /// Number of documents (rows of the input table).
    m: usize,
    /// Number of terms (columns of the input table).
    n: usize,
    /// Document-document matrix, `C·B`.
    e: DMatrix<f64>,
    /// Document-term matrix — a copy of the input table.
    c: DMatrix<f64>,
    /// Term-document matrix, `Cᵀ`.
    b: DMatrix<f64>,
    /// Term-term matrix, `B·C`.
    d: DMatrix<f64>,
    /// The composed state. Starts as all zeros; populated by
    /// [`BlockMatrix::compose`].
    g: DMatrix<f64>,
}

impl BlockMatrix {
    /// Build a block from a rectangular 2-D table.
    ///
    /// The table is copied on ingestion; the caller's data is never aliased.
    /// The composed state starts zeroed — call [`Self::compose`] to
    /// assemble it.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::Dimension`] if the table is empty, has empty
    /// rows, or is ragged.
    pub fn from_table(rows: &[Vec<f64>]) -> Result<Self> {
        let c = table_to_matrix(rows)?;
        let (m, n) = c.shape();

        let b = c.transpose();
        let e = &c * &b;
        let d = &b * &c;
        let g = DMatrix::zeros(m + n, m + n);

        Ok(Self { m, n, e, c, b, d, g })
    }

    /// Number of documents.
    #[must_use]
    pub const fn doc_count(&self) -> usize {
        self.m
    }

    /// Number of terms.
    #[must_use]
    pub const fn term_count(&self) -> usize {
        self.n
    }

    /// Side length of the composed state, `m + n`.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.m + self.n
    }

    /// The current composed state `G`.
    #[must_use]
    pub const fn state(&self) -> &DMatrix<f64> {
        &self.g
    }

    /// The stored document-term quadrant.
    #[must_use]
    pub const fn c(&self) -> &DMatrix<f64> {
        &self.c
    }

    /// Assemble `[[E, C], [B, D]]` from the stored quadrants, with any
    /// subset replaced by `overrides`. Pure: does not touch the stored
    /// state. This is the assembly step shared by [`Self::compose`] and by
    /// callers that need a composed copy without mutating the block.
    #[must_use]
    pub fn assembled(&self, overrides: &QuadrantOverrides) -> DMatrix<f64> {
        let e = overrides.e.as_ref().unwrap_or(&self.e);
        let c = overrides.c.as_ref().unwrap_or(&self.c);
        let b = overrides.b.as_ref().unwrap_or(&self.b);
        let d = overrides.d.as_ref().unwrap_or(&self.d);

        let mut g = DMatrix::zeros(self.size(), self.size());
        g.view_mut((0, 0), (self.m, self.m)).copy_from(e);
        g.view_mut((0, self.m), (self.m, self.n)).copy_from(c);
        g.view_mut((self.m, 0), (self.n, self.m)).copy_from(b);
        g.view_mut((self.m, self.m), (self.n, self.n)).copy_from(d);
        g
    }

    /// Compose the block: set `G` to the quadrant assembly.
    ///
    /// Pure assembly, no normalization. Idempotent: composing twice with no
    /// overrides (and no intervening quadrant change) yields a bit-identical
    /// `G`.
    pub fn compose(&mut self, overrides: &QuadrantOverrides) {
        self.g = self.assembled(overrides);
    }

    /// Replace the composed state wholesale.
    ///
    /// Used by [`crate::ConnectionBlock`], whose composition left-multiplies
    /// a resistor operator onto the assembly before storing it.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not `(m+n) × (m+n)`; the caller controls the shape.
    pub fn set_state(&mut self, g: DMatrix<f64>) {
        assert_eq!(g.shape(), (self.size(), self.size()));
        self.g = g;
    }

    /// Split the current `G` into its quadrants along the `m`/`n` boundary.
    ///
    /// Returns `(E, C, B, D)` in that fixed order. Pure read: the stored
    /// state is not mutated, and the returned matrices are fresh copies.
    #[must_use]
    pub fn decompose(&self) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
        decompose_state(&self.g, self.m, self.n)
    }
}

/// Split a composed `(m+n) × (m+n)` state into `(E, C, B, D)`.
#[must_use]
pub fn decompose_state(
    g: &DMatrix<f64>,
    m: usize,
    n: usize,
) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
    let e = g.view((0, 0), (m, m)).into_owned();
    let c = g.view((0, m), (m, n)).into_owned();
    let b = g.view((m, 0), (n, m)).into_owned();
    let d = g.view((m, m), (n, n)).into_owned();
    (e, c, b, d)
}

/// Validate a 2-D table and copy it into a dense matrix.
fn table_to_matrix(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let m = rows.len();
    if m == 0 {
        return Err(AcornError::Dimension("table has no rows".to_string()));
    }

    let n = rows[0].len();
    if n == 0 {
        return Err(AcornError::Dimension("table has no columns".to_string()));
    }

    for (i, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(AcornError::Dimension(format!(
                "table is ragged: row 0 has {n} columns, row {i} has {}",
                row.len()
            )));
        }
    }

    Ok(DMatrix::from_fn(m, n, |i, j| rows[i][j]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
