//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/property/pine-yurts</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use glamping_map_property_models::{AttributeValue, PropertyRecord};

use crate::glossary::Glossary;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Pages that exist regardless of data.
pub const STATIC_PATHS: &[&str] = &["/", "/map", "/glossary"];

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Absolute URL.
    pub loc: String,
    /// `YYYY-MM-DD`, when known.
    pub lastmod: Option<String>,
}

/// A list of URLs rendered as a sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

impl Sitemap {
    /// Builds the site's sitemap: static pages, then one page per
    /// published property slug (first occurrence wins), then one page per
    /// glossary term.
    ///
    /// Paths are made absolute against `site_url`; an empty `site_url`
    /// leaves them root-relative.
    #[must_use]
    pub fn build(site_url: &str, properties: &[PropertyRecord], glossary: &Glossary) -> Self {
        let base = site_url.trim_end_matches('/');
        let mut urls: Vec<UrlEntry> = STATIC_PATHS
            .iter()
            .map(|path| UrlEntry {
                loc: format!("{base}{path}"),
                lastmod: None,
            })
            .collect();

        let mut seen = BTreeSet::new();
        for property in properties.iter().filter(|p| p.is_public()) {
            let Some(slug) = property.slug.as_deref() else {
                continue;
            };
            if !seen.insert(slug) {
                continue;
            }
            urls.push(UrlEntry {
                loc: format!("{base}/property/{slug}"),
                lastmod: last_modified(property),
            });
        }

        urls.extend(glossary.terms().iter().map(|term| UrlEntry {
            loc: format!("{base}/glossary/{}", term.slug),
            lastmod: None,
        }));

        Self { urls }
    }

    /// The entries in output order.
    #[must_use]
    pub fn urls(&self) -> &[UrlEntry] {
        &self.urls
    }

    /// Renders the `urlset` document.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(64 + self.urls.len() * 96);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in &self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = &entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(lastmod);
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// `updated_at` as a `YYYY-MM-DD` date, if the record carries one.
fn last_modified(property: &PropertyRecord) -> Option<String> {
    let AttributeValue::Text(raw) = property.attributes.get("updated_at")? else {
        return None;
    };
    parse_date(raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parses the timestamp shapes storage hands back.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
