//! Inline stylesheets and scripts from the output directory into a single HTML document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use same_file::is_same_file;

/// Precondition failures of the inline stage.
#[derive(Debug, thiserror::Error)]
pub enum InlineError {
  /// The bundler has not produced the HTML document yet.
  #[error("HTML file not found at {}. Run the bundler first.", .path.display())]
  MissingHtml {
    /// Expected location of the HTML document.
    path: PathBuf,
  },

  /// The configured output file would overwrite the source document.
  #[error("refusing to overwrite source HTML {} with inlined output", .path.display())]
  OutputIsSource {
    /// Path shared by source and output.
    path: PathBuf,
  },
}

/// Summary of a completed inline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineReport {
  /// Location of the single-file HTML document.
  pub output_path: PathBuf,
  /// Stylesheets whose `<link>` tags were replaced.
  pub stylesheets: Vec<String>,
  /// Scripts whose `<script>` tags were replaced.
  pub scripts: Vec<String>,
}

/// A stylesheet or script read from the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinableAsset {
  /// File name as listed in the output directory.
  pub file_name: String,
  /// Full text of the file.
  pub contents: String,
}

/// Kind of tag an asset replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
  /// `.css`, referenced by `<link href>`.
  Stylesheet,
  /// `.js`, referenced by `<script src>`.
  Script,
}

impl AssetKind {
  fn extension(self) -> &'static str {
    match self {
      Self::Stylesheet => ".css",
      Self::Script => ".js",
    }
  }

  fn tag_pattern(self, file_name: &str) -> Regex {
    // The value must end with the file name as its own path segment, optionally followed by a
    // query string or fragment.
    let reference = format!(
      r#"["'](?:[^"'>]*/)?{}(?:[?#][^"'>]*)?["']"#,
      regex::escape(file_name)
    );
    let pattern = match self {
      Self::Stylesheet => format!(r"<link\b[^>]*\bhref\s*=\s*{reference}[^>]*>"),
      Self::Script => format!(r"<script\b[^>]*\bsrc\s*=\s*{reference}[^>]*>\s*</script\s*>"),
    };
    RegexBuilder::new(&pattern)
      .case_insensitive(true)
      .build()
      .expect("escaped inline tag pattern")
  }

  fn inline_block(self, contents: &str) -> String {
    match self {
      Self::Stylesheet => format!("<style>{contents}</style>"),
      Self::Script => format!("<script>{contents}</script>"),
    }
  }
}

/// Read `index_html_file` from `dist_dir`, inline every referenced stylesheet and script found
/// in the same directory, and write the result to `inline_html_file` beside it.
///
/// Original files are never modified. Nothing is written when the source HTML is missing.
pub fn inline_bundle(
  dist_dir: &Path,
  index_html_file: &str,
  inline_html_file: &str,
) -> Result<InlineReport> {
  let html_path = dist_dir.join(index_html_file);
  if !html_path.is_file() {
    return Err(InlineError::MissingHtml { path: html_path }.into());
  }

  let output_path = dist_dir.join(inline_html_file);
  if index_html_file == inline_html_file
    || (output_path.exists() && is_same_file(&html_path, &output_path)?)
  {
    return Err(InlineError::OutputIsSource { path: html_path }.into());
  }

  let html = fs::read_to_string(&html_path)
    .with_context(|| format!("failed to read {}", html_path.display()))?;

  let stylesheets = collect_assets(dist_dir, AssetKind::Stylesheet)?;
  let scripts = collect_assets(dist_dir, AssetKind::Script)?;

  let (html, inlined_styles) = inline_assets(html, AssetKind::Stylesheet, &stylesheets);
  let (html, inlined_scripts) = inline_assets(html, AssetKind::Script, &scripts);

  fs::write(&output_path, html)
    .with_context(|| format!("failed to write {}", output_path.display()))?;
  tracing::info!(path = %output_path.display(), "wrote inlined HTML");

  Ok(InlineReport {
    output_path,
    stylesheets: inlined_styles,
    scripts: inlined_scripts,
  })
}

/// Replace every tag referencing one of `assets` with an inline block.
///
/// Returns the rewritten HTML and the names of assets that matched at least one tag.
pub fn inline_assets(
  mut html: String,
  kind: AssetKind,
  assets: &[InlinableAsset],
) -> (String, Vec<String>) {
  let mut inlined = Vec::new();

  for asset in assets {
    let pattern = kind.tag_pattern(&asset.file_name);
    if !pattern.is_match(&html) {
      tracing::debug!(file = %asset.file_name, "no tag references asset");
      continue;
    }

    let block = kind.inline_block(&asset.contents);
    html = pattern.replace_all(&html, NoExpand(&block)).into_owned();
    tracing::debug!(file = %asset.file_name, "inlined asset");
    inlined.push(asset.file_name.clone());
  }

  (html, inlined)
}

/// List files of `kind` directly inside `dir`, sorted by name.
fn collect_assets(dir: &Path, kind: AssetKind) -> Result<Vec<InlinableAsset>> {
  let mut assets = Vec::new();

  for entry in
    fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
  {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if !name.ends_with(kind.extension()) {
      continue;
    }

    let path = entry.path();
    let contents = fs::read_to_string(&path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    assets.push(InlinableAsset {
      file_name: name.to_string(),
      contents,
    });
  }

  assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
  Ok(assets)
}
