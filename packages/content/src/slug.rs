//! URL slugs for property pages.
//!
//! Every row sharing a `property_name` shares a slug. Distinct names that
//! slugify to the same base are told apart with numeric suffixes in
//! alphabetical name order: `base`, `base-2`, `base-3`, ...

use std::collections::{BTreeMap, BTreeSet};

/// Slug used when a name has no ASCII-representable characters.
pub const FALLBACK_SLUG: &str = "property";

/// Converts a name into a lowercase, hyphen-separated ASCII slug.
///
/// Non-ASCII text is transliterated first (`"Café Étoile"` becomes
/// `"cafe-etoile"`). Apostrophes are dropped rather than split on.
#[must_use]
pub fn slugify(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Computes the slug for every distinct name.
///
/// Names are trimmed; blank names are ignored. Unsuffixed bases are
/// reserved first, so a name that naturally slugifies to `glamp-2` keeps
/// it and the colliding `glamp` group skips to `glamp-3`.
#[must_use]
pub fn assign_slugs<'a, I>(names: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    extend_slugs(names, &BTreeMap::new(), &BTreeSet::new())
}

/// Plans slugs for `names` around assignments that already exist.
///
/// `existing` maps names to the slug they already hold; those names keep
/// it. `taken` lists every slug already in use (it may include slugs held
/// by rows without a name). Remaining names get their natural base when
/// it is free, otherwise the next free numeric suffix, following the same
/// alphabetical order as [`assign_slugs`]. The result covers `existing`
/// plus every new name, and no slug is ever handed to two names.
#[must_use]
pub fn extend_slugs<'a, I>(
    names: I,
    existing: &BTreeMap<String, String>,
    taken: &BTreeSet<String>,
) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || existing.contains_key(name) {
            continue;
        }
        groups
            .entry(slugify(name))
            .or_default()
            .insert(name.to_string());
    }

    let mut used: BTreeSet<String> = taken.iter().chain(existing.values()).cloned().collect();
    let free_bases: BTreeSet<String> = groups
        .keys()
        .filter(|base| !used.contains(*base))
        .cloned()
        .collect();
    used.extend(free_bases.iter().cloned());

    let mut slugs = existing.clone();

    for (base, names) in &groups {
        let mut names = names.iter();
        if free_bases.contains(base) {
            if let Some(first) = names.next() {
                slugs.insert(first.clone(), base.clone());
            }
        }

        let mut suffix = 2;
        for name in names {
            let slug = loop {
                let candidate = format!("{base}-{suffix}");
                suffix += 1;
                if used.insert(candidate.clone()) {
                    break candidate;
                }
            };
            slugs.insert(name.clone(), slug);
        }
    }

    slugs
}
