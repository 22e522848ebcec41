//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use clap_complete::generate;

use crate::core::update::scripted::Scenario;

const AFTER_HELP: &str = "\
EXAMPLES:
  pocketfeed                      Launch the interactive TUI
  pocketfeed --demo mandatory     Launch with a scripted mandatory update
  pocketfeed update               Update to the latest release
  pocketfeed update --check       Check for updates without downloading
  pocketfeed config               Show config paths and status
  pocketfeed completions bash     Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "A pocket-sized social feed that keeps itself up to date",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Drive the update flow from a script instead of GitHub
    #[arg(
        long,
        value_enum,
        help = "Play a scripted update scenario in the TUI (no network)"
    )]
    pub demo: Option<DemoScenario>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update to the latest release from GitHub
    Update {
        /// Only check if an update is available, don't download
        #[arg(long)]
        check: bool,
    },
    /// Show configuration paths and current settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

/// Scripted update scenarios, for demos and UI work without the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScenario {
    /// Optional update ending in a Restart/Later prompt
    Optional,
    /// Mandatory update: dialog, then a forced restart
    Mandatory,
    /// Already on the latest version
    UpToDate,
    /// Failure midway through the download
    Fail,
}

impl DemoScenario {
    pub fn scenario(self) -> Scenario {
        match self {
            DemoScenario::Optional => Scenario::Optional,
            DemoScenario::Mandatory => Scenario::Mandatory,
            DemoScenario::UpToDate => Scenario::UpToDate,
            DemoScenario::Fail => Scenario::Fail,
        }
    }
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
