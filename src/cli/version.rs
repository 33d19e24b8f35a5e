//! Version information for the parley CLI.

/// The current version of parley, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `parley <version>` as printed by `--version`.
pub fn version_line() -> String {
    format!("parley {}", VERSION)
}
