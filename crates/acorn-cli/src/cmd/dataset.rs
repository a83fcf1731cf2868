//! `acorn dataset` — convert a labeled bag-of-words dataset into a
//! document-term table.
//!
//! Input is the IMDB-style feature format: one document per line,
//! `rating tok_idx:tok_count ...`, plus a vocabulary file with one token
//! per line. The command expands each feature row against the vocabulary,
//! drops stop words and tokens shorter than two characters, applies
//! document-frequency bounds, and writes the resulting counts with the
//! rating as the last column. The association core never sees any of this —
//! it only ever consumes the finished table.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use crate::table::TermTable;

/// English stop words excluded from the vocabulary.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

/// Arguments for `acorn dataset`.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Bag-of-words feature file (`rating tok_idx:tok_count ...` per line).
    #[arg(long)]
    pub bow: PathBuf,

    /// Vocabulary file, one token per line, indexed by the feature file.
    #[arg(long)]
    pub vocab: PathBuf,

    /// Output table path.
    #[arg(long)]
    pub outfile: PathBuf,

    /// Drop terms appearing in more than this fraction of documents.
    #[arg(long, default_value_t = 0.95)]
    pub max_df: f64,

    /// Drop terms appearing in fewer than this fraction of documents.
    #[arg(long, default_value_t = 0.01)]
    pub min_df: f64,
}

/// One parsed feature row: the rating label and `(vocab_index, count)`
/// pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow {
    pub rating: i64,
    pub features: Vec<(usize, u64)>,
}

/// Execute `acorn dataset`.
pub fn run_dataset(args: &DatasetArgs) -> Result<()> {
    if args.min_df > args.max_df {
        bail!("--min-df must not exceed --max-df");
    }

    let bow = std::fs::read_to_string(&args.bow)
        .with_context(|| format!("reading {}", args.bow.display()))?;
    let vocab: Vec<String> = std::fs::read_to_string(&args.vocab)
        .with_context(|| format!("reading {}", args.vocab.display()))?
        .lines()
        .map(|l| l.trim().to_lowercase())
        .collect();

    let docs = bow
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_feature_row)
        .collect::<Result<Vec<FeatureRow>>>()?;
    if docs.is_empty() {
        bail!("feature file {} has no rows", args.bow.display());
    }

    let table = build_table(&docs, &vocab, args.min_df, args.max_df)?;
    info!(
        docs = table.doc_count(),
        terms = table.term_count(),
        "document-term table built"
    );

    table.write(&args.outfile)?;
    println!(
        "wrote {} documents x {} terms to {}",
        table.doc_count(),
        table.term_count(),
        args.outfile.display()
    );
    Ok(())
}

/// Parse one `rating tok_idx:tok_count ...` line.
pub fn parse_feature_row(line: &str) -> Result<FeatureRow> {
    let mut parts = line.split_whitespace();
    let rating = parts
        .next()
        .context("empty feature row")?
        .parse::<i64>()
        .context("feature row must start with a rating")?;

    let features = parts
        .map(|tok| {
            let (idx, count) = tok
                .split_once(':')
                .with_context(|| format!("malformed feature {tok:?}"))?;
            Ok((
                idx.parse::<usize>()
                    .with_context(|| format!("bad token index in {tok:?}"))?,
                count
                    .parse::<u64>()
                    .with_context(|| format!("bad token count in {tok:?}"))?,
            ))
        })
        .collect::<Result<Vec<(usize, u64)>>>()?;

    Ok(FeatureRow { rating, features })
}

/// Expand feature rows against the vocabulary and assemble the filtered
/// document-term table.
#[allow(clippy::cast_precision_loss)]
pub fn build_table(
    docs: &[FeatureRow],
    vocab: &[String],
    min_df: f64,
    max_df: f64,
) -> Result<TermTable> {
    // Per-document token counts, keyed by token text so duplicate vocabulary
    // entries merge.
    let mut doc_counts: Vec<HashMap<&str, u64>> = Vec::with_capacity(docs.len());
    for doc in docs {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for &(idx, count) in &doc.features {
            let token = vocab
                .get(idx)
                .with_context(|| format!("token index {idx} outside vocabulary"))?;
            if keep_token(token) {
                *counts.entry(token.as_str()).or_default() += count;
            }
        }
        doc_counts.push(counts);
    }

    // Document frequencies over the corpus.
    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &doc_counts {
        for &token in counts.keys() {
            *df.entry(token).or_default() += 1;
        }
    }

    let total = docs.len() as f64;
    let terms: Vec<String> = df
        .iter()
        .filter(|&(_, &count)| {
            let fraction = count as f64 / total;
            fraction >= min_df && fraction <= max_df
        })
        .map(|(&token, _)| token.to_string())
        .collect();
    if terms.is_empty() {
        bail!("document-frequency bounds removed every term");
    }

    let rows: Vec<Vec<u64>> = doc_counts
        .iter()
        .map(|counts| {
            terms
                .iter()
                .map(|t| counts.get(t.as_str()).copied().unwrap_or(0))
                .collect()
        })
        .collect();
    let ratings: Vec<i64> = docs.iter().map(|d| d.rating).collect();

    Ok(TermTable {
        terms,
        rows,
        ratings,
    })
}

/// Keep tokens of at least two characters that are not stop words.
fn keep_token(token: &str) -> bool {
    token.chars().count() >= 2 && !STOP_WORDS.contains(&token)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        ["the", "film", "great", "plot", "x"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    #[test]
    fn parses_feature_rows() {
        let row = parse_feature_row("7 1:2 3:1").expect("valid row");
        assert_eq!(row.rating, 7);
        assert_eq!(row.features, vec![(1, 2), (3, 1)]);
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(parse_feature_row("").is_err());
        assert!(parse_feature_row("x 1:2").is_err());
        assert!(parse_feature_row("7 1-2").is_err());
        assert!(parse_feature_row("7 1:abc").is_err());
    }

    #[test]
    fn stop_words_and_short_tokens_dropped() {
        // "the" is a stop word, "x" is too short; both vanish even with
        // wide-open frequency bounds.
        let docs = vec![
            parse_feature_row("7 0:5 1:1 4:2").expect("valid"),
            parse_feature_row("2 0:3 2:1").expect("valid"),
        ];
        let table = build_table(&docs, &vocab(), 0.0, 1.0).expect("table builds");
        assert_eq!(table.terms, vec!["film", "great"]);
    }

    #[test]
    fn document_frequency_bounds_filter_terms() {
        // "film" appears in 2/2 docs, "great" and "plot" in 1/2 each.
        let docs = vec![
            parse_feature_row("7 1:1 2:1").expect("valid"),
            parse_feature_row("2 1:1 3:1").expect("valid"),
        ];

        let everything = build_table(&docs, &vocab(), 0.0, 1.0).expect("table builds");
        assert_eq!(everything.terms, vec!["film", "great", "plot"]);

        let only_common = build_table(&docs, &vocab(), 0.6, 1.0).expect("table builds");
        assert_eq!(only_common.terms, vec!["film"]);

        let only_rare = build_table(&docs, &vocab(), 0.0, 0.6).expect("table builds");
        assert_eq!(only_rare.terms, vec!["great", "plot"]);
    }

    #[test]
    fn rows_align_with_filtered_terms() {
        let docs = vec![
            parse_feature_row("7 1:2 2:1").expect("valid"),
            parse_feature_row("2 1:1 3:4").expect("valid"),
        ];
        let table = build_table(&docs, &vocab(), 0.0, 1.0).expect("table builds");

        assert_eq!(table.terms, vec!["film", "great", "plot"]);
        assert_eq!(table.rows, vec![vec![2, 1, 0], vec![1, 0, 4]]);
        assert_eq!(table.ratings, vec![7, 2]);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let docs = vec![parse_feature_row("7 9:1").expect("valid")];
        assert!(build_table(&docs, &vocab(), 0.0, 1.0).is_err());
    }

    #[test]
    fn all_terms_filtered_is_an_error() {
        let docs = vec![parse_feature_row("7 1:1").expect("valid")];
        assert!(build_table(&docs, &vocab(), 0.99, 0.999).is_err());
    }
}
