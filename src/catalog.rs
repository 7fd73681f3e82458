//! Asset catalog loading and validation.
//!
//! The catalog maps media keys such as `KOALA_JPG` to per-environment URLs. Values are kept
//! as raw structured data until [`AssetCatalog::validate`] runs so that malformed entries are
//! reported against the key that holds them rather than as an anonymous parse failure.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::environment::{DEV, MediaEnvironment, PROD};

/// Errors raised while loading or validating an asset catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  /// The catalog file is missing or unreadable.
  #[error("failed to read asset catalog {}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// The catalog file is not well-formed structured data.
  #[error("failed to parse asset catalog {}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Underlying JSON or YAML error.
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The top level of the catalog is not a key to object mapping.
  #[error("asset catalog {} must be a mapping of media keys", .path.display())]
  NotAMapping {
    /// Path that caused the error.
    path: PathBuf,
  },

  /// An entry is not a mapping of environment names to URLs.
  #[error("invalid media configuration for {key}: expected a mapping of environments")]
  InvalidEntry {
    /// Offending media key.
    key: String,
  },

  /// An entry lacks a required environment or holds an empty URL for it.
  #[error("invalid media configuration for {key}: missing {environment} environment")]
  MissingEnvironment {
    /// Offending media key.
    key: String,
    /// Environment that is absent or empty.
    environment: String,
  },

  /// An entry holds a non-string value for an environment.
  #[error("invalid media configuration for {key}: {environment} must be a string")]
  NonStringValue {
    /// Offending media key.
    key: String,
    /// Environment holding the bad value.
    environment: String,
  },
}

impl CatalogError {
  /// Media key named by a validation failure, if any.
  pub fn key(&self) -> Option<&str> {
    match self {
      Self::InvalidEntry { key }
      | Self::MissingEnvironment { key, .. }
      | Self::NonStringValue { key, .. } => Some(key.as_str()),
      _ => None,
    }
  }
}

/// Structured text formats accepted for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
  /// JSON, the default for unknown extensions.
  Json,
  /// YAML, selected by `.yaml` or `.yml`.
  Yaml,
}

impl CatalogFormat {
  /// Pick the format from the file extension.
  pub fn from_path(path: &Path) -> Self {
    match path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_ascii_lowercase)
      .as_deref()
    {
      Some("yaml" | "yml") => Self::Yaml,
      _ => Self::Json,
    }
  }
}

/// Immutable set of media entries loaded once per build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCatalog {
  entries: BTreeMap<String, Value>,
}

impl AssetCatalog {
  /// Read and parse the catalog at `path`.
  pub fn load(path: &Path) -> Result<Self, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content, CatalogFormat::from_path(path), path)
  }

  /// Parse catalog text; `origin` is only used for error reporting.
  pub fn parse(
    content: &str,
    format: CatalogFormat,
    origin: &Path,
  ) -> Result<Self, CatalogError> {
    let parse_error = |source: Box<dyn std::error::Error + Send + Sync>| CatalogError::Parse {
      path: origin.to_path_buf(),
      source,
    };

    let root: Value = match format {
      CatalogFormat::Json => {
        serde_json::from_str(content).map_err(|err| parse_error(err.into()))?
      }
      CatalogFormat::Yaml => {
        serde_yaml::from_str(content).map_err(|err| parse_error(err.into()))?
      }
    };

    match root {
      Value::Object(map) => Ok(Self {
        entries: map.into_iter().collect(),
      }),
      _ => Err(CatalogError::NotAMapping {
        path: origin.to_path_buf(),
      }),
    }
  }

  /// Check that every entry defines `dev`, `prod` and the active environment as non-empty
  /// strings. Other environments are not inspected.
  ///
  /// Keys are checked in sorted order and the first failure is returned.
  pub fn validate(&self, environment: &MediaEnvironment) -> Result<(), CatalogError> {
    let mut required = vec![DEV, PROD];
    if !required.contains(&environment.as_str()) {
      required.push(environment.as_str());
    }

    for (key, value) in &self.entries {
      let Some(environments) = value.as_object() else {
        return Err(CatalogError::InvalidEntry { key: key.clone() });
      };

      for name in &required {
        match environments.get(*name) {
          Some(Value::String(url)) if !url.is_empty() => {}
          Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(CatalogError::MissingEnvironment {
              key: key.clone(),
              environment: (*name).to_string(),
            });
          }
          Some(_) => {
            return Err(CatalogError::NonStringValue {
              key: key.clone(),
              environment: (*name).to_string(),
            });
          }
        }
      }
    }

    Ok(())
  }

  /// Iterate over every key together with its URL for `environment`.
  ///
  /// The URL is `None` when the environment branch is absent, empty, or not a string.
  pub fn resolve<'a>(
    &'a self,
    environment: &'a MediaEnvironment,
  ) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + 'a {
    self.entries.iter().map(move |(key, value)| {
      let url = value
        .as_object()
        .and_then(|environments| lookup_url(environments, environment));
      (key.as_str(), url)
    })
  }

  /// Number of entries in the catalog.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when the catalog has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

fn lookup_url<'a>(
  environments: &'a Map<String, Value>,
  environment: &MediaEnvironment,
) -> Option<&'a str> {
  environments
    .get(environment.as_str())
    .and_then(Value::as_str)
    .filter(|url| !url.is_empty())
}
