//! US state and Canadian province lookup tables.
//!
//! Provides mappings between two-letter abbreviations and full names for
//! the 50 US states + DC and the 13 Canadian provinces and territories,
//! plus the spellings each supported country is stored under.

use strum_macros::{Display, IntoStaticStr};

/// A country the map covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, IntoStaticStr)]
pub enum Country {
    /// The United States, including Alaska and Hawaii.
    #[strum(serialize = "United States")]
    UnitedStates,
    /// Canada.
    #[strum(serialize = "Canada")]
    Canada,
}

impl Country {
    /// Canonical display name, as stored by newer imports.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Every spelling of this country found in the properties table.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::UnitedStates => &["United States", "USA", "US", "United States of America"],
            Self::Canada => &["Canada", "CA", "CAN"],
        }
    }

    /// Resolves a free-text country value to a [`Country`].
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace and
    /// dots (`"U.S.A."` resolves to the United States).
    #[must_use]
    pub fn lookup(value: &str) -> Option<Self> {
        let cleaned: String = value.trim().chars().filter(|c| *c != '.').collect();
        [Self::UnitedStates, Self::Canada].into_iter().find(|country| {
            country
                .aliases()
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(&cleaned))
        })
    }
}

/// A state or province entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Two-letter postal abbreviation.
    pub abbr: &'static str,
    /// Full name.
    pub name: &'static str,
    /// Country the region belongs to.
    pub country: Country,
}

const fn us(abbr: &'static str, name: &'static str) -> Region {
    Region {
        abbr,
        name,
        country: Country::UnitedStates,
    }
}

const fn ca(abbr: &'static str, name: &'static str) -> Region {
    Region {
        abbr,
        name,
        country: Country::Canada,
    }
}

/// All known regions: 51 US entries (50 states + DC) followed by 13
/// Canadian provinces and territories.
pub const REGIONS: &[Region] = &[
    us("AL", "Alabama"),
    us("AK", "Alaska"),
    us("AZ", "Arizona"),
    us("AR", "Arkansas"),
    us("CA", "California"),
    us("CO", "Colorado"),
    us("CT", "Connecticut"),
    us("DE", "Delaware"),
    us("DC", "District of Columbia"),
    us("FL", "Florida"),
    us("GA", "Georgia"),
    us("HI", "Hawaii"),
    us("ID", "Idaho"),
    us("IL", "Illinois"),
    us("IN", "Indiana"),
    us("IA", "Iowa"),
    us("KS", "Kansas"),
    us("KY", "Kentucky"),
    us("LA", "Louisiana"),
    us("ME", "Maine"),
    us("MD", "Maryland"),
    us("MA", "Massachusetts"),
    us("MI", "Michigan"),
    us("MN", "Minnesota"),
    us("MS", "Mississippi"),
    us("MO", "Missouri"),
    us("MT", "Montana"),
    us("NE", "Nebraska"),
    us("NV", "Nevada"),
    us("NH", "New Hampshire"),
    us("NJ", "New Jersey"),
    us("NM", "New Mexico"),
    us("NY", "New York"),
    us("NC", "North Carolina"),
    us("ND", "North Dakota"),
    us("OH", "Ohio"),
    us("OK", "Oklahoma"),
    us("OR", "Oregon"),
    us("PA", "Pennsylvania"),
    us("RI", "Rhode Island"),
    us("SC", "South Carolina"),
    us("SD", "South Dakota"),
    us("TN", "Tennessee"),
    us("TX", "Texas"),
    us("UT", "Utah"),
    us("VT", "Vermont"),
    us("VA", "Virginia"),
    us("WA", "Washington"),
    us("WV", "West Virginia"),
    us("WI", "Wisconsin"),
    us("WY", "Wyoming"),
    ca("AB", "Alberta"),
    ca("BC", "British Columbia"),
    ca("MB", "Manitoba"),
    ca("NB", "New Brunswick"),
    ca("NL", "Newfoundland and Labrador"),
    ca("NS", "Nova Scotia"),
    ca("NT", "Northwest Territories"),
    ca("NU", "Nunavut"),
    ca("ON", "Ontario"),
    ca("PE", "Prince Edward Island"),
    ca("QC", "Quebec"),
    ca("SK", "Saskatchewan"),
    ca("YT", "Yukon"),
];

/// Looks up a region by abbreviation or full name, case-insensitively.
///
/// Abbreviations are checked first, so `"CA"` always resolves to
/// California.
#[must_use]
pub fn lookup_region(value: &str) -> Option<&'static Region> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    REGIONS
        .iter()
        .find(|r| r.abbr.eq_ignore_ascii_case(value))
        .or_else(|| REGIONS.iter().find(|r| r.name.eq_ignore_ascii_case(value)))
}

/// Maps a state value to its full name (`"or"` → `"Oregon"`).
#[must_use]
pub fn canonical_state_name(value: &str) -> Option<&'static str> {
    lookup_region(value).map(|r| r.name)
}

/// Maps a state value to its abbreviation (`"Quebec"` → `"QC"`).
#[must_use]
pub fn state_abbreviation(value: &str) -> Option<&'static str> {
    lookup_region(value).map(|r| r.abbr)
}

/// Maps a free-text country to its canonical display name.
#[must_use]
pub fn canonical_country(value: &str) -> Option<&'static str> {
    Country::lookup(value).map(Country::name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn region_counts() {
        let us = REGIONS
            .iter()
            .filter(|r| r.country == Country::UnitedStates)
            .count();
        let canada = REGIONS
            .iter()
            .filter(|r| r.country == Country::Canada)
            .count();
        assert_eq!(us, 51);
        assert_eq!(canada, 13);
    }

    #[test]
    fn abbreviations_are_unique() {
        let mut seen = BTreeSet::new();
        for region in REGIONS {
            assert!(seen.insert(region.abbr), "duplicate abbr: {}", region.abbr);
        }
    }

    #[test]
    fn abbr_name_roundtrip() {
        for region in REGIONS {
            assert_eq!(state_abbreviation(region.name), Some(region.abbr));
            assert_eq!(canonical_state_name(region.abbr), Some(region.name));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(canonical_state_name("ca"), Some("California"));
        assert_eq!(canonical_state_name("BRITISH COLUMBIA"), Some("British Columbia"));
        assert_eq!(canonical_state_name(" Tx "), Some("Texas"));
        assert_eq!(canonical_state_name("Atlantis"), None);
        assert_eq!(canonical_state_name(""), None);
    }

    #[test]
    fn country_aliases_resolve() {
        assert_eq!(Country::lookup("usa"), Some(Country::UnitedStates));
        assert_eq!(Country::lookup("U.S."), Some(Country::UnitedStates));
        assert_eq!(Country::lookup("United States of America"), Some(Country::UnitedStates));
        assert_eq!(Country::lookup("CAN"), Some(Country::Canada));
        assert_eq!(canonical_country("ca"), Some("Canada"));
        assert_eq!(canonical_country("Mexico"), None);
    }

    #[test]
    fn country_name_matches_display_and_first_alias() {
        for country in [Country::UnitedStates, Country::Canada] {
            assert_eq!(country.name(), country.to_string());
            assert_eq!(country.aliases()[0], country.name());
        }
    }
}
