//! Build script: validates default-flags.json at compile time.

use std::collections::HashMap;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "default-flags.json"]
        .iter()
        .collect();
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. default-flags.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    let _: HashMap<String, bool> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "default-flags.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
}
