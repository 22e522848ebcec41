//! Application run modes: logger init, headless update, config info, TUI launch.

use std::io::{self, Write};
use std::sync::Arc;

use crate::cli::Args;
use crate::core;
use crate::core::config::Config;
use crate::core::update::UpdatePhase;
use crate::core::update::client::{SyncEvent, SyncHooks, UpdateClient};
use crate::core::update::github::GithubUpdateClient;
use crate::core::update::scripted::Scenario;

/// Initialize env_logger. In TUI mode, writes to file to avoid corrupting the display.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if args.command.is_none() {
        let log_path = core::paths::cache_dir().map(|d| d.join(format!("{}.log", core::app::NAME)));
        if let Some(path) = log_path
            && let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Run the `update` command: check for the latest release, and unless
/// `check_only` is set, download and install it in place.
pub async fn run_update(
    config: &Config,
    check_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GithubUpdateClient::new(config).with_download_progress(true);

    if check_only {
        let outcome = client.check_for_update().await?;
        if outcome.available {
            let tag = if outcome.mandatory { " (mandatory)" } else { "" };
            println!(
                "Update available: {}{} (current: v{})",
                outcome.label,
                tag,
                core::app::VERSION
            );
            if !outcome.description.is_empty() {
                println!();
                println!("{}", outcome.description);
            }
        } else {
            println!("Already up to date (v{})", core::app::VERSION);
        }
        return Ok(());
    }

    let hooks = SyncHooks {
        on_event: Some(Box::new(|event| match event {
            SyncEvent::Checking => println!("Checking for updates..."),
            SyncEvent::Downloading => println!("Downloading update..."),
            SyncEvent::Installing => println!("Installing update..."),
            // Terminal states are reported from the resolved phase below;
            // errors surface through the returned Result.
            SyncEvent::AwaitingUserAction
            | SyncEvent::Installed
            | SyncEvent::UpToDate
            | SyncEvent::Failed(_) => {}
        })),
        await_continue: Some(Box::new(confirm_mandatory)),
    };

    let phase = client.sync(&config.policy, hooks, None).await?;
    match phase {
        UpdatePhase::UpToDate => println!("Already up to date (v{})", core::app::VERSION),
        UpdatePhase::Installed => println!(
            "Update installed. Relaunch {} to use the new version.",
            core::app::NAME
        ),
        UpdatePhase::AwaitingUserAction => {
            // Declined the dialog; the binary is already in place.
            println!("Update installed; it applies on the next launch.")
        }
        other => log::debug!("update cycle ended in {}", other.label()),
    }
    Ok(())
}

/// Prompt on stderr, read y/N from stdin.
/// For the CLI path where the terminal is already in cooked mode.
fn confirm_mandatory() -> bool {
    eprintln!("This update is mandatory.");
    eprint!("Continue? [y/N] ");
    let _ = io::stderr().flush();
    let mut s = String::new();
    let _ = io::stdin().read_line(&mut s);
    let t = s.trim();
    t.eq_ignore_ascii_case("y") || t.eq_ignore_ascii_case("yes")
}

/// Run the `config` command: display paths, release repo, and install policy.
pub fn run_config(config: &Config) {
    let config_dir = core::paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());
    let cache_dir = core::paths::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());
    let data_dir = core::paths::data_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());

    println!("Config:      {}", config_dir);
    println!("Cache:       {}", cache_dir);
    println!("Data:        {}", data_dir);
    println!("Releases:    {}/{}", config.repo_owner, config.repo_name);
    println!(
        "Install:     {} (mandatory: {})",
        config.policy.install_timing.label(),
        config.policy.mandatory_install_timing.label()
    );
    println!(
        "Dialog:      {}",
        if config.policy.dialog.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    match core::update::metadata::load_applied() {
        Some(applied) => {
            let pending = if applied.first_run {
                " (first run pending)"
            } else {
                ""
            };
            println!("Last update: {}{}", applied.label, pending);
        }
        None => println!("Last update: none recorded"),
    }
}

/// Launch the TUI in a blocking thread. Returns on panic or IO error.
pub async fn launch_tui(
    config: Config,
    demo: Option<Scenario>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let join_result: Result<io::Result<()>, tokio::task::JoinError> =
        tokio::task::spawn_blocking(move || crate::tui::run(config, demo)).await;

    match join_result {
        Ok(io_result) => io_result?,
        Err(join_err) => {
            if let Ok(panic) = join_err.try_into_panic() {
                let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    format!("{:?}", panic)
                };
                eprintln!("TUI panic: {}", msg);
            }
            return Err(
                Box::new(io::Error::other("TUI thread panicked")) as Box<dyn std::error::Error>
            );
        }
    }
    Ok(())
}
