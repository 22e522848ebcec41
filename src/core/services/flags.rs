//! Feature flags with compile-time validated defaults.
//!
//! Defaults ship in `config/default-flags.json` (embedded at compile time,
//! checked by build.rs). The running app can flip flags at runtime; unknown
//! flags read as disabled.

use std::collections::HashMap;
use std::sync::Mutex;

const DEFAULT_FLAGS_JSON: &str = include_str!("../../../config/default-flags.json");

fn default_flags() -> HashMap<String, bool> {
    serde_json::from_str(DEFAULT_FLAGS_JSON)
        .expect("default-flags.json must be valid (validated at build time)")
}

pub struct FeatureFlags {
    flags: Mutex<HashMap<String, bool>>,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(default_flags()),
        }
    }

    /// Whether `flag` is on. Unknown flags are off and logged once per read.
    pub fn is_enabled(&self, flag: &str) -> bool {
        let Ok(flags) = self.flags.lock() else {
            return false;
        };
        match flags.get(flag) {
            Some(enabled) => *enabled,
            None => {
                log::warn!("unknown feature flag '{}', treating as disabled", flag);
                false
            }
        }
    }

    pub fn set_flag(&self, flag: &str, enabled: bool) {
        if let Ok(mut flags) = self.flags.lock() {
            flags.insert(flag.to_string(), enabled);
        }
    }

    /// Merge a batch of overrides, e.g. from a remote config fetch.
    pub fn update_flags(&self, overrides: &HashMap<String, bool>) {
        if let Ok(mut flags) = self.flags.lock() {
            for (flag, enabled) in overrides {
                flags.insert(flag.clone(), *enabled);
            }
        }
    }

    pub fn all_flags(&self) -> HashMap<String, bool> {
        self.flags
            .lock()
            .map(|flags| flags.clone())
            .unwrap_or_default()
    }

    pub fn reset_to_defaults(&self) {
        if let Ok(mut flags) = self.flags.lock() {
            *flags = default_flags();
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_embedded() {
        let flags = FeatureFlags::new();
        assert!(flags.is_enabled("enable_notifications"));
        assert!(flags.is_enabled("enable_analytics"));
        assert!(!flags.is_enabled("enable_beta_features"));
    }

    #[test]
    fn unknown_flag_reads_disabled() {
        let flags = FeatureFlags::new();
        assert!(!flags.is_enabled("no_such_flag"));
    }

    #[test]
    fn set_flag_overrides_default() {
        let flags = FeatureFlags::new();
        flags.set_flag("enable_beta_features", true);
        assert!(flags.is_enabled("enable_beta_features"));
    }

    #[test]
    fn update_flags_merges_batch() {
        let flags = FeatureFlags::new();
        let mut overrides = HashMap::new();
        overrides.insert("enable_dark_mode".to_string(), true);
        overrides.insert("enable_analytics".to_string(), false);
        flags.update_flags(&overrides);

        assert!(flags.is_enabled("enable_dark_mode"));
        assert!(!flags.is_enabled("enable_analytics"));
        // Untouched flags keep their defaults.
        assert!(flags.is_enabled("enable_in_app_messages"));
    }

    #[test]
    fn reset_restores_defaults() {
        let flags = FeatureFlags::new();
        flags.set_flag("enable_analytics", false);
        flags.reset_to_defaults();
        assert!(flags.is_enabled("enable_analytics"));
    }
}
