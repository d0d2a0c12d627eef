// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the global output flags.

use clap::{Args, Parser, Subcommand};
use harbormaster::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harbormaster")]
#[command(about = "Release and deployment orchestration for hosted CMS environments")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to harbormaster.yml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a harbormaster.yml template
    Init {
        /// Application (database) name
        #[arg(long)]
        application: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Take reference screenshots in CI
    BackstopSnapshot {
        /// Environment to screenshot, or `tugboat` for a branch preview
        #[arg(long, default_value = "prod")]
        target: String,

        #[command(flatten)]
        run: BackstopArgs,
    },

    /// Compare a target against reference screenshots in CI
    BackstopCompare {
        /// Environment to test, or `tugboat` for a branch preview
        #[arg(long, default_value = "test")]
        target: String,

        /// Environment the reference screenshots come from
        #[arg(long, default_value = "prod")]
        reference: String,

        /// Take new reference screenshots instead of reusing saved ones
        #[arg(long)]
        force_reference: bool,

        #[command(flatten)]
        run: BackstopArgs,
    },

    /// Start an on-demand database backup
    Backup {
        /// Target environment
        target: String,
    },

    /// Print the download URL of the most recent database backup
    LatestBackupUrl {
        /// Target environment
        target: String,

        /// Backup type: ondemand or daily
        #[arg(value_name = "TYPE")]
        kind: Option<String>,
    },

    /// Run the deploy command in CI
    Release {
        /// Target environment
        target: String,

        /// Tag or branch to deploy
        git_ref: String,

        /// Branch CI should check out (defaults to the git ref)
        #[arg(long)]
        ci_branch: Option<String>,

        #[command(flatten)]
        flags: ReleaseFlags,
    },

    /// Deploy a git ref to an environment
    Deploy {
        /// Target environment
        target: String,

        /// Tag or branch to deploy
        git_ref: String,

        #[command(flatten)]
        flags: ReleaseFlags,

        /// Run a full cache rebuild after purging
        #[arg(long)]
        cache_rebuild: bool,

        /// Break an existing deploy lock
        #[arg(long)]
        force_unlock: bool,
    },

    /// Rebuild the preview of a branch
    PreviewRebuild {
        /// Branch name
        branch: String,
    },
}

#[derive(Args)]
pub struct BackstopArgs {
    /// Branch CI should check out
    #[arg(long, default_value = "develop")]
    pub ci_branch: String,

    /// Page list to run: page, all, post-release
    #[arg(long, default_value = "all")]
    pub list: String,

    /// Viewport to run: desktop, tablet, phone, all
    #[arg(long, default_value = "all")]
    pub viewport: String,

    /// Preview URL to use when the target is `tugboat`
    #[arg(long)]
    pub tugboat: Option<String>,

    /// Append a cache-busting query string to tested URLs
    #[arg(long)]
    pub cachebuster: bool,
}

#[derive(Args)]
pub struct ReleaseFlags {
    /// Do not enable maintenance mode
    #[arg(long = "skip-maint")]
    pub skip_maintenance: bool,

    /// Copy the production database first (ignored for prod)
    #[arg(long)]
    pub refresh_db: bool,
}
