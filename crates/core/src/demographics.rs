//! Registration demographics: auth providers and country distribution.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::stats::rate;

// ---------------------------------------------------------------------------
// Auth providers
// ---------------------------------------------------------------------------

/// The sign-up providers the platform supports. Registrations with no
/// recorded provider default to email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Google,
    Apple,
    Facebook,
    Email,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 4] = [
        AuthProvider::Google,
        AuthProvider::Apple,
        AuthProvider::Facebook,
        AuthProvider::Email,
    ];

    /// Position in [`Self::ALL`].
    fn index(self) -> usize {
        match self {
            AuthProvider::Google => 0,
            AuthProvider::Apple => 1,
            AuthProvider::Facebook => 2,
            AuthProvider::Email => 3,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AuthProvider::Google => "google",
            AuthProvider::Apple => "apple",
            AuthProvider::Facebook => "facebook",
            AuthProvider::Email => "email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthProvider::Google => "Google",
            AuthProvider::Apple => "Apple",
            AuthProvider::Facebook => "Facebook",
            AuthProvider::Email => "Email",
        }
    }

    /// Parse a stored provider code; absent or unrecognized means email.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("google") => AuthProvider::Google,
            Some("apple") => AuthProvider::Apple,
            Some("facebook") => AuthProvider::Facebook,
            _ => AuthProvider::Email,
        }
    }
}

/// Registration share of one auth provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPoint {
    pub provider: &'static str,
    pub label: &'static str,
    pub count: i64,
    pub percentage: f64,
}

/// Tally registrations per provider, most used first.
///
/// Every supported provider appears even with zero registrations; the
/// fixed provider order breaks count ties.
pub fn tally_providers(providers: &[Option<String>]) -> Vec<ProviderPoint> {
    let total = providers.len() as i64;
    let mut counts = [0i64; AuthProvider::ALL.len()];

    for code in providers {
        let provider = AuthProvider::from_code(code.as_deref());
        counts[provider.index()] += 1;
    }

    let mut points: Vec<ProviderPoint> = AuthProvider::ALL
        .iter()
        .zip(counts)
        .map(|(provider, count)| ProviderPoint {
            provider: provider.code(),
            label: provider.label(),
            count,
            percentage: rate(count, total),
        })
        .collect();

    points.sort_by(|a, b| b.count.cmp(&a.count));
    points
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// Display names for the country codes the platform commonly sees.
/// Codes outside this table fall back to the code itself.
const COUNTRY_NAMES: [(&str, &str); 15] = [
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("DE", "Germany"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("IT", "Italy"),
    ("MX", "Mexico"),
    ("PE", "Peru"),
    ("PT", "Portugal"),
    ("US", "United States"),
];

/// Display name for an ISO country code.
pub fn country_name(code: &str) -> &str {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Registration share of one country.
#[derive(Debug, Clone, Serialize)]
pub struct GeographyPoint {
    pub country_code: String,
    pub country_name: String,
    pub count: i64,
    pub percentage: f64,
}

/// Tally registrations per country, largest first (code ascending on
/// ties). The input holds only users with a recorded country.
pub fn tally_geography(country_codes: &[String]) -> Vec<GeographyPoint> {
    let total = country_codes.len() as i64;
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for code in country_codes {
        *counts.entry(code.as_str()).or_insert(0) += 1;
    }

    let mut points: Vec<GeographyPoint> = counts
        .into_iter()
        .map(|(code, count)| GeographyPoint {
            country_code: code.to_string(),
            country_name: country_name(code).to_string(),
            count,
            percentage: rate(count, total),
        })
        .collect();

    points.sort_by(|a, b| b.count.cmp(&a.count));
    points
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_to_email() {
        assert_eq!(AuthProvider::from_code(None), AuthProvider::Email);
        assert_eq!(AuthProvider::from_code(Some("myspace")), AuthProvider::Email);
        assert_eq!(AuthProvider::from_code(Some("google")), AuthProvider::Google);
    }

    #[test]
    fn providers_tallied_and_sorted() {
        let providers = vec![
            Some("google".to_string()),
            Some("google".to_string()),
            None,
            Some("apple".to_string()),
        ];
        let points = tally_providers(&providers);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].provider, "google");
        assert_eq!(points[0].count, 2);
        assert_eq!(points[0].percentage, 50.0);

        // Facebook has no registrations but still appears.
        let facebook = points.iter().find(|p| p.provider == "facebook").unwrap();
        assert_eq!(facebook.count, 0);
        assert_eq!(facebook.percentage, 0.0);
    }

    #[test]
    fn providers_empty_input() {
        let points = tally_providers(&[]);
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.count == 0 && p.percentage == 0.0));
    }

    #[test]
    fn country_name_falls_back_to_code() {
        assert_eq!(country_name("ES"), "Spain");
        assert_eq!(country_name("ZZ"), "ZZ");
    }

    #[test]
    fn geography_sorted_by_count() {
        let codes = vec![
            "ES".to_string(),
            "ES".to_string(),
            "MX".to_string(),
            "ZZ".to_string(),
        ];
        let points = tally_geography(&codes);
        assert_eq!(points[0].country_code, "ES");
        assert_eq!(points[0].country_name, "Spain");
        assert_eq!(points[0].count, 2);
        assert_eq!(points[0].percentage, 50.0);
        assert_eq!(points.len(), 3);

        let unknown = points.iter().find(|p| p.country_code == "ZZ").unwrap();
        assert_eq!(unknown.country_name, "ZZ");
    }

    #[test]
    fn geography_empty_input() {
        assert!(tally_geography(&[]).is_empty());
    }
}
