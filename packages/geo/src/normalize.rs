//! Expansion of requested country/state filters into stored spellings.
//!
//! Storage holds whatever the import that created a row wrote: `"USA"`,
//! `"United States"`, `"US"`, `"ca"`, `"California"`, ... Filters are
//! therefore expanded into every accepted raw variant and matched with a
//! plain inclusion test.

use std::collections::BTreeSet;

use glamping_map_property_models::CountryFilter;

use crate::regions::{Country, lookup_region};

/// Builds the country restriction for a request.
///
/// - No countries requested: [`CountryFilter::Deny`]. An empty selection
///   on the map means "show nothing", not "show everything".
/// - Exactly one country: its accepted spellings.
/// - Two or more: [`CountryFilter::Any`]. This is deliberately not an
///   N-way union; the map only offers the United States and Canada, and
///   selecting both disables country filtering entirely.
#[must_use]
pub fn expand_countries(requested: &[String]) -> CountryFilter {
    let distinct: BTreeSet<&str> = requested
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    let mut iter = distinct.iter();
    match (iter.next(), iter.next()) {
        (None, _) => CountryFilter::Deny,
        (Some(only), None) => CountryFilter::OneOf(country_variants(only)),
        (Some(_), Some(_)) => CountryFilter::Any,
    }
}

/// Every stored spelling that should match a requested country.
#[must_use]
pub fn country_variants(requested: &str) -> BTreeSet<String> {
    let mut variants = case_variants(requested.trim());
    if let Some(country) = Country::lookup(requested) {
        for alias in country.aliases() {
            variants.extend(case_variants(alias));
        }
    }
    variants
}

/// Expands requested states into abbreviation, full name, and case
/// variants.
///
/// Returns `None` when nothing usable was requested (no state filtering).
/// The lookup table is shared between the US and Canada and is keyed by
/// abbreviation first, so `"CA"` expands to California's spellings and
/// also matches any row whose stored state is literally `"CA"`, whatever
/// its country.
#[must_use]
pub fn expand_states(requested: &[String]) -> Option<BTreeSet<String>> {
    let mut variants = BTreeSet::new();

    for state in requested.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        variants.extend(case_variants(state));
        if let Some(region) = lookup_region(state) {
            variants.extend(case_variants(region.abbr));
            variants.extend(case_variants(region.name));
        }
    }

    (!variants.is_empty()).then_some(variants)
}

/// Collects exact-match filter values (unit types, rate categories).
///
/// Returns `None` when nothing usable was requested.
#[must_use]
pub fn expand_exact(requested: &[String]) -> Option<BTreeSet<String>> {
    let values: BTreeSet<String> = requested
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();

    (!values.is_empty()).then_some(values)
}

/// The value as given plus its lower- and upper-case forms.
fn case_variants(value: &str) -> BTreeSet<String> {
    [
        value.to_string(),
        value.to_lowercase(),
        value.to_uppercase(),
    ]
    .into_iter()
    .filter(|v| !v.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn no_countries_denies_everything() {
        assert_eq!(expand_countries(&[]), CountryFilter::Deny);
        assert_eq!(expand_countries(&strings(&["", "  "])), CountryFilter::Deny);
    }

    #[test]
    fn single_country_expands_to_aliases() {
        let CountryFilter::OneOf(values) = expand_countries(&strings(&["United States"])) else {
            panic!("expected OneOf");
        };
        for expected in ["USA", "United States", "US", "usa", "united states"] {
            assert!(values.contains(expected), "missing {expected}");
        }
        assert!(!values.contains("Canada"));
    }

    #[test]
    fn canada_matches_its_code() {
        let CountryFilter::OneOf(values) = expand_countries(&strings(&["Canada"])) else {
            panic!("expected OneOf");
        };
        assert!(values.contains("CA"));
        assert!(values.contains("canada"));
    }

    #[test]
    fn unknown_single_country_matches_itself() {
        let CountryFilter::OneOf(values) = expand_countries(&strings(&["Mexico"])) else {
            panic!("expected OneOf");
        };
        assert_eq!(values, BTreeSet::from([
            "MEXICO".to_string(),
            "Mexico".to_string(),
            "mexico".to_string(),
        ]));
    }

    #[test]
    fn two_countries_disable_country_filtering() {
        assert_eq!(
            expand_countries(&strings(&["United States", "Canada"])),
            CountryFilter::Any
        );
    }

    #[test]
    fn repeated_country_counts_once() {
        assert!(matches!(
            expand_countries(&strings(&["Canada", "Canada"])),
            CountryFilter::OneOf(_)
        ));
    }

    #[test]
    fn state_abbreviation_matches_full_name_and_back() {
        let from_abbr = expand_states(&strings(&["CA"])).unwrap();
        assert!(from_abbr.contains("California"));
        assert!(from_abbr.contains("CA"));
        assert!(from_abbr.contains("california"));

        let from_name = expand_states(&strings(&["California"])).unwrap();
        assert!(from_name.contains("CA"));
        assert!(from_name.contains("ca"));
    }

    #[test]
    fn canadian_province_expands() {
        let values = expand_states(&strings(&["bc"])).unwrap();
        assert!(values.contains("BC"));
        assert!(values.contains("British Columbia"));
        assert!(values.contains("BRITISH COLUMBIA"));
    }

    #[test]
    fn unknown_state_keeps_case_variants() {
        let values = expand_states(&strings(&["Baja California"])).unwrap();
        assert!(values.contains("Baja California"));
        assert!(values.contains("baja california"));
    }

    #[test]
    fn empty_state_request_means_no_filter() {
        assert_eq!(expand_states(&[]), None);
        assert_eq!(expand_states(&strings(&[" "])), None);
    }

    #[test]
    fn exact_values_are_trimmed() {
        assert_eq!(
            expand_exact(&strings(&[" Yurt ", "", "Safari Tent"])),
            Some(BTreeSet::from([
                "Safari Tent".to_string(),
                "Yurt".to_string(),
            ]))
        );
        assert_eq!(expand_exact(&[]), None);
    }
}
