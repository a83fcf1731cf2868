//! Persisted document-term tables.
//!
//! The dataset command writes its output as a plain tab-separated table:
//! a header line of term names ending in a `user_rating` column, then one
//! row of counts (and the rating label) per document. The query commands
//! read the same format back. The rating column is carried through for
//! downstream labeling work; the association core never sees it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// The label column appended after the term counts.
pub const RATING_COLUMN: &str = "user_rating";

/// A loaded document-term table: term names, per-document counts, and the
/// per-document rating labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermTable {
    pub terms: Vec<String>,
    pub rows: Vec<Vec<u64>>,
    pub ratings: Vec<i64>,
}

impl TermTable {
    /// Number of documents.
    #[must_use]
    pub fn doc_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of terms (excluding the rating column).
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// The counts as the float table the association core ingests.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_counts(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|&v| v as f64).collect())
            .collect()
    }

    /// Write the table to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        out.push_str(&self.terms.join("\t"));
        out.push('\t');
        out.push_str(RATING_COLUMN);
        out.push('\n');

        for (row, rating) in self.rows.iter().zip(&self.ratings) {
            for count in row {
                out.push_str(&count.to_string());
                out.push('\t');
            }
            out.push_str(&rating.to_string());
            out.push('\n');
        }

        fs::write(path, out).with_context(|| format!("writing table to {}", path.display()))
    }

    /// Load a table from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading table from {}", path.display()))?;
        let mut lines = text.lines();

        let header = lines.next().context("table file is empty")?;
        let mut terms: Vec<String> = header.split('\t').map(str::to_string).collect();
        match terms.pop() {
            Some(last) if last == RATING_COLUMN => {}
            _ => bail!("table header must end with a {RATING_COLUMN} column"),
        }

        let mut rows = Vec::new();
        let mut ratings = Vec::new();
        for (lineno, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != terms.len() + 1 {
                bail!(
                    "row {} has {} fields, expected {}",
                    lineno + 2,
                    fields.len(),
                    terms.len() + 1
                );
            }

            let rating = fields
                .pop()
                .unwrap_or_default()
                .parse::<i64>()
                .with_context(|| format!("bad rating on row {}", lineno + 2))?;
            let counts = fields
                .iter()
                .map(|f| f.parse::<u64>())
                .collect::<std::result::Result<Vec<u64>, _>>()
                .with_context(|| format!("bad count on row {}", lineno + 2))?;

            rows.push(counts);
            ratings.push(rating);
        }

        if rows.is_empty() {
            bail!("table has no data rows");
        }

        Ok(Self {
            terms,
            rows,
            ratings,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
