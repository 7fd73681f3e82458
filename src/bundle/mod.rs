//! Helpers operating on the flat output directory shared with the bundler.

pub mod inline;
pub mod media;

pub use inline::{InlineError, InlineReport, inline_bundle};
pub use media::mirror_media;
