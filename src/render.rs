//! Render stage orchestrator: resolve media placeholders and write the page to the output
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::bundle::mirror_media;
use crate::catalog::AssetCatalog;
use crate::config::ProjectConfig;
use crate::environment::MediaEnvironment;
use crate::substitution::{Substitution, substitute_media};

/// Inputs for a single render run.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
  /// Root against which configured paths are resolved.
  pub project_dir: &'a Path,
  /// Project layout.
  pub config: &'a ProjectConfig,
  /// Environment whose URLs are substituted.
  pub environment: MediaEnvironment,
}

/// Summary of a completed render run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
  /// Location of the rendered HTML.
  pub output_path: PathBuf,
  /// Catalog keys left unsubstituted because the environment has no URL for them.
  pub skipped_keys: Vec<String>,
  /// Placeholder tokens remaining in the rendered HTML.
  pub unresolved: Vec<String>,
  /// Number of media files mirrored into the output directory.
  pub media_files: usize,
}

/// Runs the render stage for one build.
pub struct MediaRenderer<'a> {
  context: RenderContext<'a>,
}

impl<'a> MediaRenderer<'a> {
  /// Create a renderer for the provided context.
  pub fn new(context: RenderContext<'a>) -> Self {
    Self { context }
  }

  /// Load and validate the catalog, substitute the template, then write the page and mirror
  /// media into the output directory.
  ///
  /// Catalog and template failures abort before anything is written.
  pub fn render(&self) -> Result<RenderReport> {
    let RenderContext {
      project_dir,
      config,
      environment,
    } = &self.context;

    let template_path = config.template_path(project_dir);
    let template = fs::read_to_string(&template_path)
      .with_context(|| format!("failed to read template {}", template_path.display()))?;

    let Substitution {
      html,
      skipped_keys,
      unresolved,
    } = render_html(&template, &config.assets_path(project_dir), environment)?;

    let dist_dir = config.dist_dir(project_dir);
    fs::create_dir_all(&dist_dir)
      .with_context(|| format!("failed to create {}", dist_dir.display()))?;
    let output_path = dist_dir.join(&config.index_html_file);
    fs::write(&output_path, html)
      .with_context(|| format!("failed to write {}", output_path.display()))?;

    let media_files = mirror_media(
      &config.media_dir(project_dir),
      &dist_dir.join(&config.media_output_dir),
    )?;

    tracing::info!(
      path = %output_path.display(),
      %environment,
      media_files,
      "rendered page"
    );

    Ok(RenderReport {
      output_path,
      skipped_keys,
      unresolved: unresolved.into_iter().collect(),
      media_files,
    })
  }
}

/// Substitute media placeholders in `html` using the catalog at `assets_path`.
///
/// The catalog is read and validated on every call; any failure is returned before the
/// substitution runs so callers never see partially rendered markup.
pub fn render_html(
  html: &str,
  assets_path: &Path,
  environment: &MediaEnvironment,
) -> Result<Substitution> {
  let catalog = AssetCatalog::load(assets_path)?;
  catalog.validate(environment)?;
  tracing::debug!(entries = catalog.len(), %environment, "loaded asset catalog");
  Ok(substitute_media(html, &catalog, environment))
}
