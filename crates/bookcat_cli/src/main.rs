//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging and the connection pool the way a host process does.
//! - Print a deterministic catalog summary for quick local sanity checks.

use bookcat_core::{init_logging, CatalogConfig, CatalogService, ConnectionPool};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match CatalogConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bookcat: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("bookcat: logging disabled: {err}");
    }

    let pool = match ConnectionPool::init(&config.database) {
        Ok(pool) => pool,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            eprintln!("bookcat: cannot open catalog database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let catalog = CatalogService::new(&pool);
    let outcome = catalog.summary();
    pool.shutdown();

    match outcome {
        Ok(summary) => {
            println!("bookcat_core version={}", bookcat_core::core_version());
            println!("authors={} titles={}", summary.authors, summary.titles);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("bookcat: catalog summary failed: {err}");
            ExitCode::FAILURE
        }
    }
}
