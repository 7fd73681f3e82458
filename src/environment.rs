//! Selection of the environment whose media URLs are substituted during a build.

use std::fmt;

/// Environment variable consulted by the CLI for an explicit override.
pub const MEDIA_ENV_VAR: &str = "MEDIA_ENV";

/// Environment name used for development builds.
pub const DEV: &str = "dev";

/// Environment name used for production builds.
pub const PROD: &str = "prod";

/// The single environment branch read from every asset entry for one build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaEnvironment(String);

impl MediaEnvironment {
  /// Resolve the active environment from an optional override and the production flag.
  ///
  /// A blank override is treated as absent.
  pub fn resolve(override_name: Option<&str>, production: bool) -> Self {
    match override_name.map(str::trim).filter(|name| !name.is_empty()) {
      Some(name) => Self(name.to_string()),
      None if production => Self::prod(),
      None => Self::dev(),
    }
  }

  /// The `dev` environment.
  pub fn dev() -> Self {
    Self(DEV.to_string())
  }

  /// The `prod` environment.
  pub fn prod() -> Self {
    Self(PROD.to_string())
  }

  /// Environment name as used for lookups in the asset catalog.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for MediaEnvironment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
