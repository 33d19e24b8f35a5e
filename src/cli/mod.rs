//! CLI module for parley.
//!
//! - Argument parsing into [`CliCommand`]
//! - Command execution against the backend ([`run_command`])
//! - Version display
//!
//! # Usage
//!
//! ```ignore
//! use parley::cli::{parse_args, run_command, CommandContext};
//!
//! let command = parse_args(std::env::args());
//! runtime.block_on(run_command(command, ctx, &mut std::io::stdout()))?;
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use commands::{run_command, CommandContext};
pub use version::{version_line, VERSION};
