//! `acorn words` and `acorn documents` — the full association matrices.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nalgebra::DMatrix;
use serde::Serialize;

use acorn_core::ConnectionBlock;

use crate::output::{OutputMode, print_json};
use crate::table::TermTable;

/// Arguments shared by the matrix commands.
#[derive(Args, Debug)]
pub struct AssociationsArgs {
    /// Document-term table produced by `acorn dataset`.
    #[arg(long)]
    pub table: PathBuf,

    /// Leak-resistance scalar in [0, 1] used for the block's canonical
    /// state.
    #[arg(long, default_value_t = 1.0)]
    pub norm_by: f64,
}

/// Labeled square matrix payload.
#[derive(Debug, Serialize)]
struct MatrixReport {
    labels: Vec<String>,
    matrix: Vec<Vec<f64>>,
}

impl MatrixReport {
    fn new(labels: Vec<String>, matrix: &DMatrix<f64>) -> Self {
        let rows = (0..matrix.nrows())
            .map(|i| matrix.row(i).iter().copied().collect())
            .collect();
        Self {
            labels,
            matrix: rows,
        }
    }

    fn render(&self, output: OutputMode) -> Result<()> {
        match output {
            OutputMode::Json => print_json(self),
            OutputMode::Human => {
                for (label, row) in self.labels.iter().zip(&self.matrix) {
                    let cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
                    println!("{label:<24} {}", cells.join(" "));
                }
                Ok(())
            }
        }
    }
}

/// Execute `acorn words`: the n×n word-word association matrix.
pub fn run_words(args: &AssociationsArgs, output: OutputMode) -> Result<()> {
    let table = TermTable::load(&args.table)?;
    let block = ConnectionBlock::with_norm(&table.to_counts(), args.norm_by)?;
    let matrix = block.word_associations()?;

    MatrixReport::new(table.terms.clone(), &matrix).render(output)
}

/// Execute `acorn documents`: the m×m document-document association matrix.
pub fn run_documents(args: &AssociationsArgs, output: OutputMode) -> Result<()> {
    let table = TermTable::load(&args.table)?;
    let block = ConnectionBlock::with_norm(&table.to_counts(), args.norm_by)?;
    let matrix = block.document_associations()?;

    let labels: Vec<String> = (0..table.doc_count()).map(|i| format!("doc {i}")).collect();
    MatrixReport::new(labels, &matrix).render(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
