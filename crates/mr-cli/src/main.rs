//! migrun CLI - applies pending schema migrations from ./migrations

use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;

mod cli;
mod driver;

use cli::Cli;

fn main() -> ExitCode {
    let _cli = Cli::parse();

    // Loaded before the logger so RUST_LOG may come from .env as well
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = &dotenv {
        if !err.not_found() {
            log::warn!("Ignoring unreadable .env file: {err}");
        }
    }

    let database_url = std::env::var(driver::DATABASE_URL_VAR).ok();
    match driver::run(database_url, driver::MIGRATIONS_SOURCE) {
        Ok(outcome) => {
            log::info!("{outcome}");
            log::info!("Migrations completed successfully.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{:#}", anyhow::Error::new(err));
            ExitCode::FAILURE
        }
    }
}
