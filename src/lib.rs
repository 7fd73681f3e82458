#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bundle;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod environment;
pub mod render;
pub mod substitution;

pub use bundle::{InlineError, InlineReport, inline_bundle};
pub use catalog::{AssetCatalog, CatalogError};
pub use config::ProjectConfig;
pub use environment::MediaEnvironment;
pub use render::{MediaRenderer, RenderContext, RenderReport};
pub use substitution::{Substitution, substitute_media};
