// SPDX-License-Identifier: MIT OR Apache-2.0
//! `novella` - play and manage branching stories from the terminal.

use clap::Parser;
use novella_editor::cli::{self, Cli, CliError};
use novella_editor::config::DEFAULT_LOG_FILTER;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // The config may set the log filter, so read it before logging starts
    let config = cli::load_config(&cli);
    let directive = config
        .as_ref()
        .map_or(DEFAULT_LOG_FILTER, |c| c.log_filter.as_str());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // Logs go to stderr; stdout carries story text and exports
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Novella v{}", env!("CARGO_PKG_VERSION"));

    let result = config.and_then(|config| {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        cli::run(cli.command, &config, stdin.lock(), stdout.lock())
    });

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn report(error: &CliError) {
    tracing::error!("{error}");
}
