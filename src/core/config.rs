use std::env;

use crate::core::app;
use crate::core::update::client::{InstallTiming, SyncPolicy, UpdateDialog};

#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub owner the release feed is fetched from.
    pub repo_owner: String,
    /// GitHub repository name.
    pub repo_name: String,
    /// How update cycles apply and prompt. Built from env overrides plus defaults.
    pub policy: SyncPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidInstallTiming(String),
    InvalidRepo(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidInstallTiming(value) => write!(
                f,
                "invalid install timing '{}' (expected 'immediate' or 'on-next-restart')",
                value
            ),
            ConfigError::InvalidRepo(value) => {
                write!(f, "invalid repo '{}' (expected 'owner/name')", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn timing_from_env(var: &str, default: InstallTiming) -> Result<InstallTiming, ConfigError> {
    match env::var(var) {
        Ok(raw) => {
            InstallTiming::parse(&raw).ok_or_else(|| ConfigError::InvalidInstallTiming(raw))
        }
        Err(_) => Ok(default),
    }
}

/// Load configuration from environment. Every variable has a default, so this
/// only fails on malformed overrides.
pub fn load() -> Result<Config, ConfigError> {
    let (repo_owner, repo_name) = match env::var("POCKETFEED_REPO") {
        Ok(raw) => {
            let mut parts = raw.splitn(2, '/');
            match (parts.next(), parts.next()) {
                (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                    (owner.to_string(), name.to_string())
                }
                _ => return Err(ConfigError::InvalidRepo(raw)),
            }
        }
        Err(_) => (app::VENDOR.to_string(), app::NAME.to_string()),
    };

    let install_timing =
        timing_from_env("POCKETFEED_INSTALL_TIMING", InstallTiming::OnNextRestart)?;
    let mandatory_install_timing =
        timing_from_env("POCKETFEED_MANDATORY_INSTALL_TIMING", InstallTiming::Immediate)?;

    // Dialog defaults can be overridden per-field; POCKETFEED_NO_DIALOG drops
    // the confirmation step entirely and mandatory updates install unattended.
    let dialog = if env::var("POCKETFEED_NO_DIALOG").is_ok() {
        None
    } else {
        let mut dialog = UpdateDialog::default();
        if let Ok(title) = env::var("POCKETFEED_DIALOG_TITLE") {
            dialog.title = title;
        }
        if let Ok(body) = env::var("POCKETFEED_DIALOG_BODY") {
            dialog.body = body;
        }
        if let Ok(label) = env::var("POCKETFEED_DIALOG_CONTINUE") {
            dialog.continue_label = label;
        }
        Some(dialog)
    };

    Ok(Config {
        repo_owner,
        repo_name,
        policy: SyncPolicy {
            install_timing,
            mandatory_install_timing,
            dialog,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    static CONFIG_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    struct EnvGuard(&'static str);
    impl Drop for EnvGuard {
        fn drop(&mut self) {
            unsafe {
                std::env::remove_var(self.0);
            }
        }
    }

    #[test]
    fn load_defaults_without_env() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let config = load().expect("defaults load");
        assert_eq!(config.repo_owner, app::VENDOR);
        assert_eq!(config.repo_name, app::NAME);
        assert_eq!(config.policy.install_timing, InstallTiming::OnNextRestart);
        assert_eq!(
            config.policy.mandatory_install_timing,
            InstallTiming::Immediate
        );
        assert!(config.policy.dialog.is_some());
    }

    #[test]
    fn load_repo_override() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("POCKETFEED_REPO", "acme/feed-app");
        }
        let _guard = EnvGuard("POCKETFEED_REPO");

        let config = load().expect("repo override load");
        assert_eq!(config.repo_owner, "acme");
        assert_eq!(config.repo_name, "feed-app");
    }

    #[test]
    fn load_rejects_malformed_repo() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("POCKETFEED_REPO", "no-slash-here");
        }
        let _guard = EnvGuard("POCKETFEED_REPO");

        assert!(matches!(load(), Err(ConfigError::InvalidRepo(_))));
    }

    #[test]
    fn load_parses_install_timing() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("POCKETFEED_INSTALL_TIMING", "immediate");
        }
        let _guard = EnvGuard("POCKETFEED_INSTALL_TIMING");

        let config = load().expect("timing override load");
        assert_eq!(config.policy.install_timing, InstallTiming::Immediate);
    }

    #[test]
    fn load_rejects_unknown_install_timing() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("POCKETFEED_MANDATORY_INSTALL_TIMING", "whenever");
        }
        let _guard = EnvGuard("POCKETFEED_MANDATORY_INSTALL_TIMING");

        assert!(matches!(
            load(),
            Err(ConfigError::InvalidInstallTiming(_))
        ));
    }

    #[test]
    fn load_disables_dialog() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("POCKETFEED_NO_DIALOG", "1");
        }
        let _guard = EnvGuard("POCKETFEED_NO_DIALOG");

        let config = load().expect("no-dialog load");
        assert!(config.policy.dialog.is_none());
    }
}
