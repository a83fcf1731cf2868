//! CLI command handlers, one module per subcommand.

pub mod associations;
pub mod dataset;
pub mod query;
pub mod serve;
