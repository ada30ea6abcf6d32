//! Hibernate ORM integration test harness
//!
//! Installs the local dialect, provisions the Hibernate ORM test repository,
//! patches its configuration and runs a filtered subset of its tests.

use clap::Parser;
use hibernate_harness::commands::Cli;
use hibernate_harness::{cli, common::logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.validate() {
        e.exit();
    }
    logging::init_cli(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Some(command) => cli::dispatch(command, config).await,
        None => cli::run(cli.run, config).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
