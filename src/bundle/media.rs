//! Mirror authored media files into the output directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use same_file::is_same_file;

/// Copy every file below `source_dir` into `destination_dir`, preserving relative paths.
///
/// A missing source directory is not an error: builds without local media are common. Hidden
/// entries are skipped. Returns the number of files mirrored.
pub fn mirror_media(source_dir: &Path, destination_dir: &Path) -> Result<usize> {
  if !source_dir.is_dir() {
    tracing::debug!(path = %source_dir.display(), "no media directory to mirror");
    return Ok(0);
  }

  mirror_tree(source_dir, destination_dir)
}

fn mirror_tree(source_dir: &Path, destination_dir: &Path) -> Result<usize> {
  fs::create_dir_all(destination_dir)
    .with_context(|| format!("failed to create {}", destination_dir.display()))?;

  let mut mirrored = 0;
  for entry in fs::read_dir(source_dir)
    .with_context(|| format!("failed to read {}", source_dir.display()))?
  {
    let entry = entry?;
    let file_name = entry.file_name();
    if file_name.to_string_lossy().starts_with('.') {
      continue;
    }

    let source = entry.path();
    let destination = destination_dir.join(&file_name);
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      mirrored += mirror_tree(&source, &destination)?;
    } else if file_type.is_file() {
      let install = install_media_file(&source, &destination)?;
      tracing::debug!(file = %destination.display(), ?install, "mirrored media file");
      mirrored += 1;
    }
  }

  Ok(mirrored)
}

/// How a media file reached the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaInstall {
  /// The destination already is the source file.
  Unchanged,
  /// The destination was hard-linked to the source.
  Linked,
  /// Linking failed (for example across filesystems) and the file was copied.
  Copied,
}

/// Hard-link `source` to `destination`, falling back to a copy.
///
/// A stale destination that is not the source file is replaced.
fn install_media_file(source: &Path, destination: &Path) -> Result<MediaInstall> {
  if destination.exists() {
    if is_same_file(source, destination)
      .with_context(|| format!("failed to compare {}", destination.display()))?
    {
      return Ok(MediaInstall::Unchanged);
    }
    fs::remove_file(destination)
      .with_context(|| format!("failed to remove stale {}", destination.display()))?;
  }

  if fs::hard_link(source, destination).is_ok() {
    return Ok(MediaInstall::Linked);
  }

  fs::copy(source, destination).with_context(|| {
    format!(
      "failed to copy {} to {}",
      source.display(),
      destination.display()
    )
  })?;
  Ok(MediaInstall::Copied)
}
