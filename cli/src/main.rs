//! # Makan Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Entry point of the `makan` binary:
//! - parses arguments with clap
//! - sets up `tracing` from the `-v` count (or `RUST_LOG`)
//! - loads the configuration and routes to the subcommand handler
//!
//! ```bash
//! makan --help
//! makan -v console
//! makan --config ./makan.toml serve --port 9000
//! makan page
//! ```
//!
use clap::{Parser, Subcommand};
use makan::commands;
use makan::core::config::load_config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "makan",
    about = "🍜 Mr. Makan: restaurant recommendations for your group chat",
    long_about = "Collects restaurant recommendations through guided chat conversations,\n\
                  answers food questions, ranks contributors and publishes a static page.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Configuration file (defaults to ./makan.toml, then the user config directory)
    #[arg(short, long, global = true, env = "MAKAN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the bot in this terminal
    #[command(alias = "c")]
    Console(commands::console::ConsoleArgs),
    /// Accept chat messages over HTTP and serve the generated site
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Regenerate the recommendations page once
    Page(commands::page::PageArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Console(args) => commands::console::handle_console(args, config).await,
            Commands::Serve(args) => commands::serve::handle_serve(args, config).await,
            Commands::Page(args) => commands::page::handle_page(args, config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
