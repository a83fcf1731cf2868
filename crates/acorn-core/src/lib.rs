#![forbid(unsafe_code)]
//! acorn-core: the block-matrix association engine.
//!
//! Implements the analog-circuit word/document association model of
//! Giuliano (1963): a document-term frequency matrix is reinterpreted as a
//! resistor network, and association strengths fall out of closed-form
//! matrix equations derived from circuit theory. All solves are exact dense
//! inversions — there are no iterative or approximate paths.
//!
//! # Module layout
//!
//! - [`block`] — [`BlockMatrix`]: quadrant storage, composition, and
//!   decomposition.
//! - [`resistor`] — [`ResistorBlock`]: the diagonal leak-resistance
//!   operator.
//! - [`connection`] — [`ConnectionBlock`]: the query object and its four
//!   association operations.
//! - [`error`] — [`AcornError`] and the crate [`Result`] alias.
//!
//! # Conventions
//!
//! - **Errors**: typed `AcornError` results; nothing is retried internally.
//! - **Logging**: `tracing` macros (`debug!`, `instrument`).
//!
//! # References
//!
//! Giuliano, Vincent E. "Analog Networks for Word Association." IEEE
//! Transactions on Military Electronics MIL-7, no. 2/3 (April 1963):
//! 221-34. <https://doi.org/10.1109/TME.1963.4323077>

pub mod block;
pub mod connection;
pub mod error;
pub mod resistor;

pub use block::{BlockMatrix, QuadrantOverrides};
pub use connection::ConnectionBlock;
pub use error::{AcornError, InvalidQueryCause, Result};
pub use resistor::ResistorBlock;
