//! The connection block: the long-lived query object.
//!
//! # Overview
//!
//! A [`ConnectionBlock`] reinterprets a document-term matrix as a network of
//! electrical conductances. Construction derives the four quadrants, builds
//! the identity matrices used by the association algebra, and composes the
//! canonical state: the quadrant assembly left-multiplied by a fresh
//! [`ResistorBlock`] operator.
//!
//! # Query discipline
//!
//! Queries never mutate the stored state. Each one computes on a locally
//! composed copy (or borrows the canonical state directly when no
//! perturbation is needed), so repeated queries are independent,
//! order-insensitive, and safe to run from concurrent readers. A failed
//! query leaves nothing to clean up.
//!
//! # The four operations
//!
//! - [`ConnectionBlock::query`] — document associations for a term
//!   selection (equation 12 in Giuliano 1963).
//! - [`ConnectionBlock::query_dtm`] — the same, on the degenerate network
//!   with no document-document or term-term information (equation 13).
//! - [`ConnectionBlock::word_associations`] — the full n×n term-term
//!   association matrix.
//! - [`ConnectionBlock::document_associations`] — the m×m
//!   document-document association matrix.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument};

use crate::block::{BlockMatrix, QuadrantOverrides, decompose_state};
use crate::error::{AcornError, InvalidQueryCause, Result};
use crate::resistor::ResistorBlock;

/// Tolerance for deciding whether a per-query `norm_by` matches the stored
/// default.
const NORM_BY_TOLERANCE: f64 = 1e-8;

/// The query object: a resistor-normalized block built from a document-term
/// matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionBlock {
    block: BlockMatrix,
    /// Default leak-resistance scalar, fixed at construction. Queries may
    /// override it per call without touching this value.
    norm_by: f64,
    i_doc: DMatrix<f64>,
    i_term: DMatrix<f64>,
}

impl ConnectionBlock {
    /// Build a connection block from a document-term count table with the
    /// default normalization scalar of 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::Dimension`] if the table is empty or ragged.
    pub fn new(dtm: &[Vec<f64>]) -> Result<Self> {
        Self::with_norm(dtm, 1.0)
    }

    /// Build a connection block with an explicit default `norm_by`.
    ///
    /// The input is copied on ingestion. Derives `B = Cᵀ`, `E = C·B`,
    /// `D = B·C`, then composes the canonical normalized state once.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::Dimension`] for a malformed table and
    /// [`AcornError::InvalidParameter`] for `norm_by` outside `[0, 1]`.
    pub fn with_norm(dtm: &[Vec<f64>], norm_by: f64) -> Result<Self> {
        let block = BlockMatrix::from_table(dtm)?;
        let (m, n) = (block.doc_count(), block.term_count());

        let mut connection = Self {
            block,
            norm_by,
            i_doc: DMatrix::identity(m, m),
            i_term: DMatrix::identity(n, n),
        };
        connection.compose(&QuadrantOverrides::default(), None)?;

        debug!(docs = m, terms = n, norm_by, "connection block composed");
        Ok(connection)
    }

    /// Number of documents.
    #[must_use]
    pub const fn doc_count(&self) -> usize {
        self.block.doc_count()
    }

    /// Number of terms.
    #[must_use]
    pub const fn term_count(&self) -> usize {
        self.block.term_count()
    }

    /// The default normalization scalar.
    #[must_use]
    pub const fn norm_by(&self) -> f64 {
        self.norm_by
    }

    /// The current composed, normalized state.
    #[must_use]
    pub const fn state(&self) -> &DMatrix<f64> {
        self.block.state()
    }

    /// Split the current state into `(E, C, B, D)`.
    #[must_use]
    pub fn decompose(&self) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
        self.block.decompose()
    }

    /// Re-derive the stored state: assemble the quadrants (with optional
    /// overrides), then left-multiply a fresh resistor operator built from
    /// the block's document-term quadrant and the given `norm_by` (the
    /// stored default when `None`).
    ///
    /// Calling this with no overrides and no `norm_by` restores the
    /// canonical state.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::InvalidParameter`] for `norm_by` outside
    /// `[0, 1]`. On error the stored state is left untouched.
    pub fn compose(&mut self, overrides: &QuadrantOverrides, norm_by: Option<f64>) -> Result<()> {
        let state = self.composed_state(overrides, norm_by.unwrap_or(self.norm_by))?;
        self.block.set_state(state);
        Ok(())
    }

    /// Find document associations for a term selection (equation 12).
    ///
    /// `q` selects terms: 1 for selected, 0 for deselected. The result is a
    /// length-m vector of association scores aligned with the input table's
    /// rows. When `norm_by` differs from the stored default the computation
    /// runs on a locally recomposed copy; the stored state is never
    /// disturbed either way.
    ///
    /// # Errors
    ///
    /// [`AcornError::InvalidQuery`] for a malformed selection,
    /// [`AcornError::InvalidParameter`] for an out-of-range `norm_by`,
    /// [`AcornError::SingularMatrix`] if a required inversion is undefined.
    #[instrument(skip(self, q), fields(docs = self.doc_count(), terms = self.term_count()))]
    pub fn query(&self, q: &[f64], norm_by: f64) -> Result<DVector<f64>> {
        self.validate_query(q)?;

        let local;
        let state = if self.matches_default(norm_by) {
            self.block.state()
        } else {
            local = self.composed_state(&QuadrantOverrides::default(), norm_by)?;
            &local
        };

        let (e, c, b, d) = decompose_state(state, self.doc_count(), self.term_count());

        let inv_doc = invert(&self.i_doc - e, "I_doc - E")?;
        let inv_term = invert(&self.i_term - d, "I_term - D")?;
        let c_inv_term = c * &inv_term;

        let f1 = &inv_doc * &c_inv_term;
        let f2 = invert(
            &self.i_term - (b * inv_doc) * c_inv_term,
            "I_term - B·(I_doc - E)⁻¹·C·(I_term - D)⁻¹",
        )?;

        Ok(f1 * f2 * DVector::from_column_slice(q))
    }

    /// Find document associations assuming no document-document or term-term
    /// information is available (equation 13).
    ///
    /// The degenerate network zeroes the `E` and `D` quadrants before
    /// composing, so this always runs on a local copy regardless of
    /// `norm_by`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::query`].
    #[instrument(skip(self, q), fields(docs = self.doc_count(), terms = self.term_count()))]
    pub fn query_dtm(&self, q: &[f64], norm_by: f64) -> Result<DVector<f64>> {
        self.validate_query(q)?;

        let overrides = QuadrantOverrides::zeroed_e_and_d(self.doc_count(), self.term_count());
        let state = self.composed_state(&overrides, norm_by)?;
        let (_e, c, b, _d) = decompose_state(&state, self.doc_count(), self.term_count());

        let f = invert(&self.i_term - b * &c, "I_term - B·C")?;

        Ok(c * f * DVector::from_column_slice(q))
    }

    /// The full n×n word-word association matrix.
    ///
    /// Read-only: operates on the current canonical state with the stored
    /// `norm_by`.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::SingularMatrix`] if a required inversion is
    /// undefined.
    pub fn word_associations(&self) -> Result<DMatrix<f64>> {
        let (e, c, b, d) = self.block.decompose();

        let inv_doc = invert(&self.i_doc - e, "I_doc - E")?;
        let inv_term = invert(&self.i_term - d, "I_term - D")?;

        let f2 = invert(
            &self.i_term - (b * inv_doc) * (c * &inv_term),
            "I_term - B·(I_doc - E)⁻¹·C·(I_term - D)⁻¹",
        )?;

        Ok(inv_term * f2)
    }

    /// The m×m document-document association matrix, `(I_doc - E)⁻¹`.
    ///
    /// Read-only.
    ///
    /// # Errors
    ///
    /// Returns [`AcornError::SingularMatrix`] if the inversion is undefined.
    pub fn document_associations(&self) -> Result<DMatrix<f64>> {
        let (e, _c, _b, _d) = self.block.decompose();
        invert(&self.i_doc - e, "I_doc - E")
    }

    /// Assemble and normalize without touching the stored state.
    ///
    /// The resistor operator is always built from the block's canonical
    /// document-term quadrant, even when other quadrants are overridden.
    fn composed_state(&self, overrides: &QuadrantOverrides, norm_by: f64) -> Result<DMatrix<f64>> {
        let assembled = self.block.assembled(overrides);
        let resistor = ResistorBlock::from_quadrant(self.block.c(), norm_by)?;
        Ok(resistor.composed() * assembled)
    }

    /// A query is valid iff its length equals the term count and every slot
    /// is exactly 0 or 1.
    fn validate_query(&self, q: &[f64]) -> Result<()> {
        if q.len() != self.term_count() {
            return Err(InvalidQueryCause::LengthMismatch {
                expected: self.term_count(),
                actual: q.len(),
            }
            .into());
        }

        if let Some((index, &value)) = q.iter().enumerate().find(|&(_, &v)| v != 0.0 && v != 1.0) {
            return Err(InvalidQueryCause::NonBinary { index, value }.into());
        }

        Ok(())
    }

    fn matches_default(&self, norm_by: f64) -> bool {
        (self.norm_by - norm_by).abs() < NORM_BY_TOLERANCE
    }
}

impl fmt::Display for ConnectionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.block.size();
        write!(f, "a ({size} x {size}) connection block")
    }
}

/// Exact dense inversion. `None` from the backend means the system has no
/// solution under this model.
fn invert(matrix: DMatrix<f64>, context: &'static str) -> Result<DMatrix<f64>> {
    matrix
        .try_inverse()
        .ok_or(AcornError::SingularMatrix(context))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
