//! Command-line front end for the render and inline stages.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::bundle::inline_bundle;
use crate::config::ProjectConfig;
use crate::environment::{MEDIA_ENV_VAR, MediaEnvironment};
use crate::render::{MediaRenderer, RenderContext};

/// Environment variable holding a log filter that overrides `-v`.
pub const LOG_ENV_VAR: &str = "PAGE_PACKAGER_LOG";

/// Resolve media placeholders and package single-page bundles into one HTML file.
#[derive(Parser, Debug)]
#[command(name = "page_packager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  /// Verbosity level (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  #[command(subcommand)]
  pub command: Commands,
}

/// Build stages exposed on the command line.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
  /// Substitute media URLs into the template and write it to the output directory
  Render {
    /// Build for production (selects `prod` media unless overridden)
    #[arg(long)]
    production: bool,

    /// Media environment override
    #[arg(long, env = MEDIA_ENV_VAR)]
    media_env: Option<String>,

    /// Project config file (defaults to packager.config.json in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// Inline stylesheets and scripts from the output directory into a single HTML file
  Inline,
}

/// Install the global log subscriber. Later calls are ignored.
pub fn init_tracing(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter =
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Execute a parsed command relative to the current working directory.
pub fn run(cli: Cli) -> Result<()> {
  let project_dir = env::current_dir().context("failed to resolve working directory")?;

  match cli.command {
    Commands::Render {
      production,
      media_env,
      config,
    } => {
      let config = match config {
        Some(path) => ProjectConfig::from_path(&path)?,
        None => ProjectConfig::discover(&project_dir)?,
      };
      let environment = MediaEnvironment::resolve(media_env.as_deref(), production);
      let report = MediaRenderer::new(RenderContext {
        project_dir: &project_dir,
        config: &config,
        environment: environment.clone(),
      })
      .render()?;

      println!(
        "Rendered {} for the {} environment.",
        report.output_path.display(),
        environment
      );
    }
    Commands::Inline => {
      let config = ProjectConfig::discover(&project_dir)?;
      let report = inline_bundle(
        &config.dist_dir(&project_dir),
        &config.index_html_file,
        &config.inline_html_file,
      )?;

      println!(
        "Inline HTML created successfully at: {}",
        report.output_path.display()
      );
      println!(
        "Inlined {} stylesheet(s) and {} script(s) for single-file upload.",
        report.stylesheets.len(),
        report.scripts.len()
      );
    }
  }

  Ok(())
}
