//! Glossary of outdoor-hospitality terms.
//!
//! Terms are defined in `glossary/terms.toml` and embedded at compile
//! time. Slugs default to the slugified term.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::ContentError;
use crate::slug::slugify;

const TERMS_TOML: &str = include_str!("../glossary/terms.toml");

/// Topic a glossary term belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GlossaryCategory {
    /// Unit and structure types.
    Accommodation,
    /// Guest-facing facilities.
    Amenities,
    /// Investment and financial terms.
    Business,
    /// Day-to-day running of a property.
    Operations,
    /// Activities and settings.
    Outdoor,
    /// Zoning, permits, and compliance.
    Regulatory,
}

/// A glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryTerm {
    /// Display name.
    pub term: String,
    /// URL slug.
    pub slug: String,
    /// Plain-language definition.
    pub definition: String,
    /// Topic.
    pub category: GlossaryCategory,
    /// Slugs of related terms.
    #[serde(rename = "relatedTerms", skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl GlossaryTerm {
    /// Uppercase first letter used for alphabetical grouping; `'#'` for
    /// terms starting with anything but a letter.
    #[must_use]
    pub fn letter(&self) -> char {
        self.term
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map_or('#', |c| c.to_ascii_uppercase())
    }
}

#[derive(Debug, Deserialize)]
struct TermsFile {
    terms: Vec<TermEntry>,
}

#[derive(Debug, Deserialize)]
struct TermEntry {
    term: String,
    slug: Option<String>,
    definition: String,
    category: GlossaryCategory,
    #[serde(default)]
    related: Vec<String>,
}

/// The full set of glossary terms, sorted case-insensitively by term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
}

impl Glossary {
    /// Loads the glossary compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the embedded TOML is invalid.
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_toml(TERMS_TOML)
    }

    /// Parses a glossary from TOML with a `[[terms]]` array.
    ///
    /// # Errors
    ///
    /// * [`ContentError::Toml`] if the document does not parse
    /// * [`ContentError::IncompleteTerm`] for blank terms or definitions
    /// * [`ContentError::DuplicateSlug`] if two terms share a slug
    pub fn from_toml(source: &str) -> Result<Self, ContentError> {
        let file: TermsFile = toml::from_str(source)?;
        let mut seen = BTreeSet::new();
        let mut terms = Vec::with_capacity(file.terms.len());

        for entry in file.terms {
            let term = entry.term.trim().to_string();
            let definition = entry.definition.trim().to_string();
            if term.is_empty() || definition.is_empty() {
                return Err(ContentError::IncompleteTerm { term });
            }

            let slug = entry
                .slug
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| slugify(&term));
            if !seen.insert(slug.clone()) {
                return Err(ContentError::DuplicateSlug { slug });
            }

            terms.push(GlossaryTerm {
                term,
                slug,
                definition,
                category: entry.category,
                related: entry.related,
            });
        }

        terms.sort_by_cached_key(|t| t.term.to_lowercase());
        log::debug!("Loaded {} glossary terms", terms.len());
        Ok(Self { terms })
    }

    /// All terms in alphabetical order.
    #[must_use]
    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    /// Looks up a term by slug.
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&GlossaryTerm> {
        self.terms.iter().find(|t| t.slug == slug)
    }

    /// Terms in one category, alphabetical.
    #[must_use]
    pub fn in_category(&self, category: GlossaryCategory) -> Vec<&GlossaryTerm> {
        self.terms.iter().filter(|t| t.category == category).collect()
    }

    /// Terms grouped by first letter.
    #[must_use]
    pub fn by_letter(&self) -> BTreeMap<char, Vec<&GlossaryTerm>> {
        group_by_letter(self.terms.iter())
    }
}

/// Groups terms by [`GlossaryTerm::letter`], keeping input order within a
/// letter.
#[must_use]
pub fn group_by_letter<'a, I>(terms: I) -> BTreeMap<char, Vec<&'a GlossaryTerm>>
where
    I: IntoIterator<Item = &'a GlossaryTerm>,
{
    let mut groups: BTreeMap<char, Vec<&GlossaryTerm>> = BTreeMap::new();
    for term in terms {
        groups.entry(term.letter()).or_default().push(term);
    }
    groups
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn embedded_glossary_loads() {
        let glossary = Glossary::embedded().unwrap();
        assert!(glossary.terms().len() >= 20);
    }

    #[test]
    fn every_category_has_terms() {
        let glossary = Glossary::embedded().unwrap();
        for category in GlossaryCategory::iter() {
            assert!(
                !glossary.in_category(category).is_empty(),
                "No terms in category {category}"
            );
        }
    }

    #[test]
    fn related_terms_resolve() {
        let glossary = Glossary::embedded().unwrap();
        for term in glossary.terms() {
            for related in &term.related {
                assert!(
                    glossary.find(related).is_some(),
                    "{} references unknown term {related}",
                    term.slug
                );
            }
        }
    }

    #[test]
    fn sorted_and_grouped() {
        let glossary = Glossary::from_toml(
            r#"
            [[terms]]
            term = "yurt"
            definition = "A round tent."
            category = "accommodation"

            [[terms]]
            term = "ADR"
            slug = "average-daily-rate"
            definition = "Average daily rate."
            category = "business"

            [[terms]]
            term = "4-season tent"
            definition = "A tent for winter use."
            category = "accommodation"
            "#,
        )
        .unwrap();

        let names: Vec<&str> = glossary.terms().iter().map(|t| t.term.as_str()).collect();
        assert_eq!(names, vec!["4-season tent", "ADR", "yurt"]);

        let letters: Vec<char> = glossary.by_letter().keys().copied().collect();
        assert_eq!(letters, vec!['#', 'A', 'Y']);

        assert_eq!(glossary.find("average-daily-rate").map(|t| t.term.as_str()), Some("ADR"));
        assert_eq!(glossary.find("yurt").map(|t| t.category), Some(GlossaryCategory::Accommodation));
        assert_eq!(glossary.in_category(GlossaryCategory::Accommodation).len(), 2);
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let err = Glossary::from_toml(
            r#"
            [[terms]]
            term = "Yurt"
            definition = "A round tent."
            category = "accommodation"

            [[terms]]
            term = "yurt"
            definition = "Again."
            category = "accommodation"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { .. }));
    }

    #[test]
    fn rejects_unknown_category() {
        let err = Glossary::from_toml(
            r#"
            [[terms]]
            term = "Yurt"
            definition = "A round tent."
            category = "housing"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::Toml(_)));
    }

    #[test]
    fn category_names_round_trip_through_strum() {
        assert_eq!(GlossaryCategory::Regulatory.to_string(), "regulatory");
        assert_eq!("outdoor".parse::<GlossaryCategory>().ok(), Some(GlossaryCategory::Outdoor));
    }
}
