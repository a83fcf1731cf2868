#![forbid(unsafe_code)]

mod cmd;
mod output;
mod table;

use std::env;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "acorn: analog-circuit word and document associations",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Convert a labeled bag-of-words dataset into a document-term table",
        after_help = "EXAMPLES:\n    acorn dataset --bow BoW.feat --vocab imdb.vocab --outfile dtm.tsv\n    acorn dataset --bow BoW.feat --vocab imdb.vocab --outfile dtm.tsv --min-df 0.05"
    )]
    Dataset(cmd::dataset::DatasetArgs),

    #[command(
        about = "Document associations for a term selection",
        after_help = "EXAMPLES:\n    acorn query --table dtm.tsv --terms film,plot\n    acorn query --table dtm.tsv --indices 0,2 --norm-by 0.5 --json\n    acorn query --table dtm.tsv --terms film --dtm-only"
    )]
    Query(cmd::query::QueryArgs),

    #[command(
        about = "The full word-word association matrix",
        after_help = "EXAMPLES:\n    acorn words --table dtm.tsv --json"
    )]
    Words(cmd::associations::AssociationsArgs),

    #[command(
        about = "The full document-document association matrix",
        after_help = "EXAMPLES:\n    acorn documents --table dtm.tsv"
    )]
    Documents(cmd::associations::AssociationsArgs),

    #[command(
        about = "Serve the association HTTP endpoint",
        after_help = "EXAMPLES:\n    acorn serve --port 5000"
    )]
    Serve(cmd::serve::ServeArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ACORN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "acorn=debug,info"
        } else {
            "acorn=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = cli.output_mode();

    match cli.command {
        Commands::Dataset(ref args) => cmd::dataset::run_dataset(args),
        Commands::Query(ref args) => cmd::query::run_query(args, output),
        Commands::Words(ref args) => cmd::associations::run_words(args, output),
        Commands::Documents(ref args) => cmd::associations::run_documents(args, output),
        Commands::Serve(ref args) => cmd::serve::run_serve(args),
    }
}
