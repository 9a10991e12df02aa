//! Shipping address rules.

use serde::Deserialize;

use podship_vendor::state_required;

use crate::collaborators::CountryDirectory;
use crate::error::ValidationError;

/// Countries the vendor ships to, spelled the way it expects them.
pub const VENDOR_COUNTRIES: [&str; 50] = [
    "Argentina",
    "Australia",
    "Austria",
    "Belgium",
    "Brazil",
    "Bulgaria",
    "Canada",
    "China",
    "Cyprus",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Gibraltar",
    "Greece",
    "Greenland",
    "Hong Kong",
    "Hungary",
    "Iceland",
    "Ireland",
    "Israel",
    "Italy",
    "Japan",
    "Latvia",
    "Liechtenstein",
    "Lithuania",
    "Luxembourg",
    "Mexico",
    "Netherlands",
    "New Zealand",
    "Norway",
    "Poland",
    "Portugal",
    "Romania",
    "Russia",
    "Singapore",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
    "Switzerland",
    "Taiwan",
    "Turkey",
    "Ukraine",
    "United Kingdom",
    "United States",
    "Vatican City",
    "Yugoslavia",
];

/// Host titles that differ from the vendor's spelling.
const TITLE_ALIASES: [(&str, &str); 1] = [("Hong Kong SAR", "Hong Kong")];

/// Map a host country title to the vendor's name, if the vendor ships there.
pub fn vendor_country(host_title: &str) -> Option<&'static str> {
    let title = host_title.trim();
    let title = TITLE_ALIASES
        .iter()
        .find(|(host, _)| *host == title)
        .map_or(title, |(_, vendor)| *vendor);
    VENDOR_COUNTRIES.iter().copied().find(|c| *c == title)
}

/// Vendor country name for an ISO alpha-2 code.
pub fn resolve_country(code: &str, countries: &dyn CountryDirectory) -> Option<&'static str> {
    if code.trim().is_empty() {
        return None;
    }
    countries.country_name(code.trim()).as_deref().and_then(vendor_country)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO alpha-2 code.
    pub country: String,
}

impl ShippingAddress {
    fn is_complete(&self) -> bool {
        let filled = |s: &str| !s.trim().is_empty();
        filled(&self.street)
            && filled(&self.city)
            && filled(&self.postal_code)
            && filled(&self.country)
            && (!state_required(&self.country) || filled(&self.state))
    }
}

/// A host product in a signup/order form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestedProduct {
    pub product_id: String,
    #[serde(default)]
    pub billing_plan_id: String,
}

/// Signup/order form fields checked before an order is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressRequest {
    pub address: ShippingAddress,
    pub products: Vec<RequestedProduct>,
}

/// Check an address for shipping `products` (display names).
///
/// Unsupported country and incomplete address are independent checks; both
/// can be reported. A blank country is only an incomplete address.
pub fn check_address(
    address: &ShippingAddress,
    products: &[String],
    countries: &dyn CountryDirectory,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !address.country.trim().is_empty() && resolve_country(&address.country, countries).is_none() {
        errors.push(ValidationError::UnsupportedCountry {
            products: products.to_vec(),
        });
    }

    if !address.is_complete() {
        errors.push(ValidationError::IncompleteAddress {
            products: products.to_vec(),
        });
    }

    errors
}
