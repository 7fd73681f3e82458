//! Replacement of `{{ KEY }}` media placeholders in generated HTML.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::catalog::AssetCatalog;
use crate::environment::MediaEnvironment;

/// Outcome of a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
  /// HTML with every resolvable placeholder replaced.
  pub html: String,
  /// Catalog keys that have no URL for the active environment.
  pub skipped_keys: Vec<String>,
  /// Placeholder tokens still present in `html` after substitution.
  pub unresolved: BTreeSet<String>,
}

/// Replace every placeholder whose key has a URL for `environment`.
///
/// Keys are matched case-insensitively with optional whitespace inside the braces. Keys
/// without a URL for the active environment are skipped and their placeholders left in
/// place; both those and any unknown tokens are logged as warnings. A key too large to
/// compile into a pattern is skipped the same way. URLs are inserted literally.
pub fn substitute_media(
  html: &str,
  catalog: &AssetCatalog,
  environment: &MediaEnvironment,
) -> Substitution {
  let mut text = html.to_string();
  let mut skipped_keys = Vec::new();

  for (key, url) in catalog.resolve(environment) {
    let Some(url) = url else {
      tracing::warn!(
        %key,
        %environment,
        "no media URL for active environment, leaving placeholder"
      );
      skipped_keys.push(key.to_string());
      continue;
    };

    let pattern = match placeholder_pattern(key) {
      Ok(pattern) => pattern,
      Err(err) => {
        tracing::warn!(
          key_len = key.len(),
          error = %err,
          "cannot build placeholder pattern, leaving placeholder"
        );
        skipped_keys.push(key.to_string());
        continue;
      }
    };
    if pattern.is_match(&text) {
      text = pattern.replace_all(&text, NoExpand(url)).into_owned();
      tracing::debug!(%key, %url, "substituted media placeholder");
    }
  }

  let unresolved = find_placeholders(&text);
  for token in &unresolved {
    tracing::warn!(%token, "unresolved media placeholder");
  }

  Substitution {
    html: text,
    skipped_keys,
    unresolved,
  }
}

/// Collect the keys of all `{{ KEY }}` tokens present in `html`.
pub fn find_placeholders(html: &str) -> BTreeSet<String> {
  any_placeholder()
    .captures_iter(html)
    .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
    .collect()
}

fn placeholder_pattern(key: &str) -> Result<Regex, regex::Error> {
  RegexBuilder::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(key)))
    .case_insensitive(true)
    .build()
}

fn any_placeholder() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"\{\{\s*([^{}]*?[^{}\s])\s*\}\}").expect("invalid placeholder regex")
  })
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;
  use crate::catalog::CatalogFormat;

  fn catalog(content: &str) -> AssetCatalog {
    AssetCatalog::parse(content, CatalogFormat::Json, Path::new("assets.json")).unwrap()
  }

  fn koala() -> AssetCatalog {
    catalog(r#"{"KOALA_JPG": {"dev": "./medias/koala.jpg", "prod": "media://73"}}"#)
  }

  #[test]
  fn replaces_every_casing_and_spacing_variant() {
    let html = r#"<img src="{{ KOALA_JPG }}"><img src="{{KOALA_JPG}}"><img src="{{ koala_jpg }}"><img src="{{  Koala_Jpg	}}">"#;
    let result = substitute_media(html, &koala(), &MediaEnvironment::prod());

    assert_eq!(
      result.html,
      r#"<img src="media://73"><img src="media://73"><img src="media://73"><img src="media://73">"#
    );
    assert!(result.skipped_keys.is_empty());
    assert!(result.unresolved.is_empty());
  }

  #[test]
  fn uses_active_environment_branch() {
    let result = substitute_media("{{ KOALA_JPG }}", &koala(), &MediaEnvironment::dev());
    assert_eq!(result.html, "./medias/koala.jpg");
  }

  #[test]
  fn leaves_unknown_placeholders_untouched() {
    let html = "<p>{{ KOALA_JPG }} and {{ PANDA_PNG }}</p>";
    let result = substitute_media(html, &koala(), &MediaEnvironment::prod());

    assert_eq!(result.html, "<p>media://73 and {{ PANDA_PNG }}</p>");
    assert_eq!(
      result.unresolved.into_iter().collect::<Vec<_>>(),
      vec!["PANDA_PNG".to_string()]
    );
  }

  #[test]
  fn skips_keys_without_active_environment() {
    let catalog = catalog(r#"{"KOALA_JPG": {"dev": "./medias/koala.jpg"}}"#);
    let html = r#"<img src="{{ KOALA_JPG }}">"#;
    let result = substitute_media(html, &catalog, &MediaEnvironment::prod());

    assert_eq!(result.html, html);
    assert_eq!(result.skipped_keys, vec!["KOALA_JPG".to_string()]);
  }

  #[test]
  fn second_pass_is_a_no_op() {
    let first = substitute_media(
      "<img src=\"{{ KOALA_JPG }}\"> {{ }}",
      &koala(),
      &MediaEnvironment::prod(),
    );
    let second = substitute_media(&first.html, &koala(), &MediaEnvironment::prod());
    assert_eq!(first.html, second.html);
  }

  #[test]
  fn inserts_urls_literally() {
    let catalog = catalog(r#"{"PRICE": {"dev": "$1.00", "prod": "cost: ${amount} $0"}}"#);
    let result = substitute_media("{{ PRICE }}", &catalog, &MediaEnvironment::prod());
    assert_eq!(result.html, "cost: ${amount} $0");
  }

  #[test]
  fn keys_with_regex_metacharacters_match_literally() {
    let catalog = catalog(r#"{"LOGO.SVG": {"dev": "./logo.svg", "prod": "media://9"}}"#);
    let result = substitute_media(
      "{{ LOGO.SVG }} {{ LOGOXSVG }}",
      &catalog,
      &MediaEnvironment::prod(),
    );
    assert_eq!(result.html, "media://9 {{ LOGOXSVG }}");
  }

  #[test]
  fn oversized_key_is_skipped_instead_of_panicking() {
    let key = "K".repeat(2_000_000);
    let catalog = catalog(&format!(r#"{{"{key}": {{"dev": "d", "prod": "p"}}}}"#));
    let result = substitute_media("x {{ KOALA_JPG }}", &catalog, &MediaEnvironment::prod());

    assert_eq!(result.html, "x {{ KOALA_JPG }}");
    assert_eq!(result.skipped_keys, vec![key]);
  }

  #[test]
  fn reports_leftover_tokens_with_spaces_and_non_ascii_keys() {
    let found = find_placeholders("{{ MY KEY }} {{ koala_été }} {{ }}");
    assert_eq!(
      found.into_iter().collect::<Vec<_>>(),
      vec!["MY KEY".to_string(), "koala_été".to_string()]
    );
  }

  #[test]
  fn finds_placeholders_in_text() {
    let found = find_placeholders("{{ A }} {{b}} {{ c-d }} {not} {{ }}");
    assert_eq!(
      found.into_iter().collect::<Vec<_>>(),
      vec!["A".to_string(), "b".to_string(), "c-d".to_string()]
    );
  }
}
