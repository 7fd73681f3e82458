//! Project configuration loader describing where the packager reads and writes files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name searched for in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "packager.config.json";

/// Discoverable project configuration describing the source and output layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Asset catalog mapping media keys to per-environment URLs.
  pub assets_path: String,
  /// HTML template containing `{{ KEY }}` placeholders.
  pub template_path: String,
  /// Flat output directory shared with the bundler.
  pub dist_dir: String,
  /// File name of the rendered HTML inside the output directory.
  pub index_html_file: String,
  /// File name of the single-file HTML written by the inline stage.
  pub inline_html_file: String,
  /// Directory of media files mirrored into the output directory.
  pub media_dir: String,
  /// Directory name inside the output directory receiving mirrored media.
  pub media_output_dir: String,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      assets_path: "src/assets.json".into(),
      template_path: "src/index.html".into(),
      dist_dir: "dist".into(),
      index_html_file: "index.html".into(),
      inline_html_file: "index-inline.html".into(),
      media_dir: "src/assets".into(),
      media_output_dir: "assets".into(),
    }
  }
}

impl ProjectConfig {
  /// Load `packager.config.json` from the project root, falling back to defaults when the
  /// file does not exist.
  ///
  /// A configuration file that exists but fails to parse is an error: silently building with
  /// defaults would write to the wrong directories.
  pub fn discover(project_dir: &Path) -> Result<Self> {
    let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
      tracing::debug!(path = %candidate.display(), "no project config, using defaults");
      return Ok(Self::default());
    }
    Self::from_path(&candidate)
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse project config {}", path.display()))
  }
}

impl ProjectConfig {
  /// Resolve the asset catalog path against the project root.
  pub fn assets_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.assets_path)
  }

  /// Resolve the HTML template path against the project root.
  pub fn template_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.template_path)
  }

  /// Resolve the output directory against the project root.
  pub fn dist_dir(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.dist_dir)
  }

  /// Resolve the media source directory against the project root.
  pub fn media_dir(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.media_dir)
  }
}
