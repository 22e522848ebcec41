//! # Pocketfeed
//!
//! This is the main entry point for the Pocketfeed application, a small
//! social feed for the terminal that keeps its own binary up to date.
//!
//! ## Features
//! - Interactive terminal UI (TUI) with feed, notifications, and profile tabs
//! - Automatic update checks at startup and on window focus
//! - Headless `update` and `config` subcommands
//! - Scripted update scenarios via `--demo` for UI work without the network

mod cli;
mod core;
mod run;
mod tui;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    // Load application configuration (print user-friendly message; exit uses Display not Debug)
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match args.command {
        Some(Commands::Update { check }) => run::run_update(&config, check).await?,
        Some(Commands::Config) => run::run_config(&config),
        Some(Commands::Completions { shell }) => {
            cli::generate(
                shell,
                &mut Args::command(),
                core::app::NAME,
                &mut std::io::stdout(),
            );
        }
        None => {
            let demo = args.demo.map(|scenario| scenario.scenario());
            run::launch_tui(config, demo).await?;
        }
    }

    Ok(())
}
