//! CLI argument definitions using clap derive API

use clap::Parser;

/// Apply all pending schema migrations from ./migrations to the database
/// named by the DATABASE_URL environment variable
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
