//! `acorn query` — document associations for a term selection.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use acorn_core::ConnectionBlock;

use crate::output::{OutputMode, print_json, print_scores};
use crate::table::TermTable;

/// Arguments for `acorn query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Document-term table produced by `acorn dataset`.
    #[arg(long)]
    pub table: PathBuf,

    /// Terms to select, by name.
    #[arg(long, value_delimiter = ',')]
    pub terms: Vec<String>,

    /// Terms to select, by column index.
    #[arg(long, value_delimiter = ',')]
    pub indices: Vec<usize>,

    /// Leak-resistance scalar in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    pub norm_by: f64,

    /// Ignore document-document and term-term information (the degenerate
    /// network of equation 13).
    #[arg(long)]
    pub dtm_only: bool,
}

/// JSON payload for `acorn query`.
#[derive(Debug, Serialize)]
struct QueryReport {
    selected: Vec<String>,
    norm_by: f64,
    associations: Vec<f64>,
}

/// Execute `acorn query`.
pub fn run_query(args: &QueryArgs, output: OutputMode) -> Result<()> {
    let table = TermTable::load(&args.table)?;
    let q = selection_vector(&table, &args.terms, &args.indices)?;

    let block = ConnectionBlock::new(&table.to_counts())?;
    let scores = if args.dtm_only {
        block.query_dtm(&q, args.norm_by)?
    } else {
        block.query(&q, args.norm_by)?
    };
    let scores: Vec<f64> = scores.iter().copied().collect();

    let selected: Vec<String> = table
        .terms
        .iter()
        .zip(&q)
        .filter(|&(_, &on)| on == 1.0)
        .map(|(t, _)| t.clone())
        .collect();

    match output {
        OutputMode::Json => print_json(&QueryReport {
            selected,
            norm_by: args.norm_by,
            associations: scores,
        }),
        OutputMode::Human => {
            println!("selected terms: {}", selected.join(", "));
            let labels: Vec<String> = (0..scores.len()).map(|i| format!("doc {i}")).collect();
            print_scores(&labels, &scores)
        }
    }
}

/// Build the 0/1 selection vector from named terms and column indices.
pub fn selection_vector(table: &TermTable, terms: &[String], indices: &[usize]) -> Result<Vec<f64>> {
    if terms.is_empty() && indices.is_empty() {
        bail!("select at least one term via --terms or --indices");
    }

    let mut q = vec![0.0; table.term_count()];
    for term in terms {
        let idx = table
            .terms
            .iter()
            .position(|t| t == term)
            .with_context(|| format!("term {term:?} not in the table's vocabulary"))?;
        q[idx] = 1.0;
    }
    for &idx in indices {
        if idx >= q.len() {
            bail!(
                "index {idx} outside the table's {} term columns",
                q.len()
            );
        }
        q[idx] = 1.0;
    }
    Ok(q)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TermTable {
        TermTable {
            terms: vec!["film".to_string(), "great".to_string(), "plot".to_string()],
            rows: vec![vec![1, 0, 1], vec![0, 1, 1]],
            ratings: vec![7, 3],
        }
    }

    #[test]
    fn selection_by_name_and_index() {
        let table = sample_table();
        let q = selection_vector(&table, &["film".to_string()], &[2]).expect("valid selection");
        assert_eq!(q, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_term_rejected() {
        let table = sample_table();
        let err = selection_vector(&table, &["actor".to_string()], &[]).unwrap_err();
        assert!(err.to_string().contains("actor"));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let table = sample_table();
        assert!(selection_vector(&table, &[], &[3]).is_err());
    }

    #[test]
    fn empty_selection_rejected() {
        let table = sample_table();
        assert!(selection_vector(&table, &[], &[]).is_err());
    }

    #[test]
    fn selection_feeds_a_valid_query() {
        let table = sample_table();
        let q = selection_vector(&table, &[], &[0, 2]).expect("valid selection");
        let block = ConnectionBlock::new(&table.to_counts()).expect("valid DTM");
        let scores = block.query(&q, 1.0).expect("query succeeds");
        assert_eq!(scores.len(), 2);
    }
}
