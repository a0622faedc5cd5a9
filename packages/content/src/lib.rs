#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site content for the glamping map: property slugs, the glossary, and
//! the XML sitemap.

pub mod glossary;
pub mod sitemap;
pub mod slug;

/// Errors raised while loading static content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The glossary TOML could not be parsed.
    #[error("Failed to parse glossary: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two glossary terms resolve to the same slug.
    #[error("Duplicate glossary slug '{slug}'")]
    DuplicateSlug {
        /// The repeated slug.
        slug: String,
    },

    /// A glossary term has an empty name or definition.
    #[error("Glossary term '{term}' is incomplete")]
    IncompleteTerm {
        /// The offending term (possibly empty).
        term: String,
    },
}
