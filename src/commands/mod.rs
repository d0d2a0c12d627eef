// ABOUTME: Command module aggregator for the harbormaster CLI.
// ABOUTME: One handler per subcommand plus shared config loading and warning output.

mod backstop;
mod backup;
mod deploy;
mod preview;
mod release;

pub use backstop::{backstop_compare, backstop_snapshot};
pub use backup::{backup, latest_backup_url};
pub use deploy::deploy;
pub use preview::preview_rebuild;
pub use release::release;

use harbormaster::config::Config;
use harbormaster::diagnostics::Diagnostics;
use harbormaster::error::Result;
use harbormaster::output::Output;
use std::env;
use std::path::Path;

/// Load the configuration from `--config` or discover it in the working directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    }
}

fn emit_warnings(output: &Output, diag: &Diagnostics) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
