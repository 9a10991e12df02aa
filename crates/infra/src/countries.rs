//! Built-in country titles.

use std::collections::HashMap;

use podship_engine::CountryDirectory;

/// ISO alpha-2 code to the host's country title.
///
/// Covers every country the vendor ships to plus a handful of common
/// destinations it doesn't, so those resolve to a name and are rejected as
/// unsupported instead of unknown.
const COUNTRY_TITLES: [(&str, &str); 56] = [
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("BG", "Bulgaria"),
    ("CA", "Canada"),
    ("CN", "China"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GI", "Gibraltar"),
    ("GR", "Greece"),
    ("GL", "Greenland"),
    ("HK", "Hong Kong SAR"),
    ("HU", "Hungary"),
    ("IS", "Iceland"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("LV", "Latvia"),
    ("LI", "Liechtenstein"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("NZ", "New Zealand"),
    ("NO", "Norway"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SG", "Singapore"),
    ("SK", "Slovakia"),
    ("SI", "Slovenia"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("TW", "Taiwan"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("GB", "United Kingdom"),
    ("US", "United States"),
    ("VA", "Vatican City"),
    ("YU", "Yugoslavia"),
    ("IN", "India"),
    ("ZA", "South Africa"),
    ("KR", "South Korea"),
    ("AE", "United Arab Emirates"),
    ("PH", "Philippines"),
    ("EG", "Egypt"),
];

#[derive(Debug, Clone)]
pub struct StaticCountryDirectory {
    titles: HashMap<&'static str, &'static str>,
}

impl StaticCountryDirectory {
    pub fn new() -> Self {
        Self {
            titles: COUNTRY_TITLES.iter().copied().collect(),
        }
    }
}

impl Default for StaticCountryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryDirectory for StaticCountryDirectory {
    fn country_name(&self, code: &str) -> Option<String> {
        self.titles
            .get(code.trim().to_ascii_uppercase().as_str())
            .map(|title| (*title).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podship_engine::{VENDOR_COUNTRIES, vendor_country};

    #[test]
    fn every_vendor_country_has_a_code() {
        let directory = StaticCountryDirectory::new();
        let resolved: Vec<_> = COUNTRY_TITLES
            .iter()
            .filter_map(|(code, _)| directory.country_name(code))
            .filter_map(|title| vendor_country(&title))
            .collect();
        for country in VENDOR_COUNTRIES {
            assert!(resolved.contains(&country), "{country} has no code");
        }
    }

    #[test]
    fn codes_are_case_insensitive() {
        let directory = StaticCountryDirectory::new();
        assert_eq!(directory.country_name(" hk ").as_deref(), Some("Hong Kong SAR"));
        assert_eq!(directory.country_name("ZZ"), None);
    }

    #[test]
    fn known_but_unsupported_country_resolves_to_a_title() {
        let directory = StaticCountryDirectory::new();
        let title = directory.country_name("IN").unwrap();
        assert_eq!(vendor_country(&title), None);
    }
}
