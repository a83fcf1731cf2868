//! `acorn serve` — run the HTTP association endpoint.

use anyhow::Result;
use clap::Args;

/// Arguments for `acorn serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,
}

/// Execute `acorn serve`. Blocks until the server shuts down.
pub fn run_serve(args: &ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(acorn_server::serve(args.port))
}
