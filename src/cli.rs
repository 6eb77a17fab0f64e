//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio content pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Drafts directory (relative to project root)
    #[arg(short, long = "drafts-dir")]
    pub drafts_dir: Option<PathBuf>,

    /// Published directory (relative to project root)
    #[arg(short, long = "publish-dir")]
    pub publish_dir: Option<PathBuf>,

    /// Built content directory (relative to project root)
    #[arg(short, long = "content-dir")]
    pub content_dir: Option<PathBuf>,

    /// Index output directory (relative to project root)
    #[arg(short, long = "indexes-dir")]
    pub indexes_dir: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// Print per-file progress
    #[arg(long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Publish all drafts, or only the given draft files
    Publish {
        /// Draft files, relative to the current directory or the drafts directory
        files: Vec<PathBuf>,
    },

    /// Build everything that has already been published, or only the given files
    Build {
        /// Published files, relative to the current directory or the published directory
        files: Vec<PathBuf>,

        /// Rebuild records even when they are up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Publish all drafts, build all content and rebuild the indexes
    Run {
        /// Rebuild records even when they are up to date
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Whether the current command asked for a forced rebuild.
    pub const fn force(&self) -> bool {
        match self.command {
            Commands::Build { force, .. } | Commands::Run { force } => force,
            Commands::Publish { .. } => false,
        }
    }
}
