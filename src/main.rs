//! Folio - a staged content pipeline for static sites.

mod build;
mod cli;
mod config;
mod frontmatter;
mod indexes;
mod pipeline;
mod publish;
mod record;
mod render;
mod report;
mod tracker;
mod utils;
mod walker;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use std::path::Path;
use utils::log::set_verbose;

#[tokio::main]
async fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    set_verbose(cli.verbose);
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Publish { files } => pipeline::run_publish(config, files).await,
        Commands::Build { files, .. } => pipeline::run_build(config, files, cli.force()).await,
        Commands::Run { .. } => pipeline::run_all(config, cli.force()).await,
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error; every setting has a default.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
