//! US location parsing and normalization.
//!
//! Accepts the shapes people type into a search box:
//! - `80202` (bare ZIP)
//! - `Denver, CO`
//! - `Denver, CO 80202`
//!
//! and the structured `{city, state, zip}` form posted by the front end.
//! Everything is validated against the 50 states plus DC; no geocoding or
//! fuzzy correction happens here.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::zipcode;

/// USPS codes for the 50 states plus the District of Columbia.
pub const US_STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

static STATE_AND_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2})\s+([0-9]{5})$").expect("valid state/zip pattern"));

/// Errors produced while validating a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location is empty")]
    Empty,
    #[error("could not understand location '{0}'")]
    Unrecognized(String),
    #[error("city is missing")]
    MissingCity,
    #[error("'{0}' is not a recognized US state code")]
    UnknownState(String),
    #[error("'{0}' is not a valid 5-digit ZIP code")]
    InvalidZip(String),
    #[error("a city and state, or a ZIP code, is required")]
    MissingFields,
}

/// A validated US location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    CityState {
        city: String,
        state: String,
        zip: Option<String>,
    },
    Zip(String),
}

/// Check a state code against the 51 recognized codes, ignoring case.
pub fn is_state_code(code: &str) -> bool {
    let upper = code.trim().to_ascii_uppercase();
    US_STATE_CODES.contains(&upper.as_str())
}

fn is_zip(s: &str) -> bool {
    s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Collapse runs of whitespace so `"New  York "` and `"New York"` agree.
fn normalize_city(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl Location {
    /// Build a city/state location, validating every field.
    pub fn city_state(city: &str, state: &str, zip: Option<&str>) -> Result<Self, LocationError> {
        let city = normalize_city(city);
        if city.is_empty() {
            return Err(LocationError::MissingCity);
        }

        let state = state.trim().to_ascii_uppercase();
        if !is_state_code(&state) {
            return Err(LocationError::UnknownState(state));
        }

        let zip = match non_empty(zip) {
            Some(z) if is_zip(z) => Some(z.to_string()),
            Some(z) => return Err(LocationError::InvalidZip(z.to_string())),
            None => None,
        };

        Ok(Self::CityState { city, state, zip })
    }

    /// Build a ZIP-only location.
    pub fn zip(zip: &str) -> Result<Self, LocationError> {
        let zip = zip.trim();
        if is_zip(zip) {
            Ok(Self::Zip(zip.to_string()))
        } else {
            Err(LocationError::InvalidZip(zip.to_string()))
        }
    }

    /// Validate the structured request form. Blank strings count as absent.
    pub fn from_fields(
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Result<Self, LocationError> {
        match (non_empty(city), non_empty(state), non_empty(zip)) {
            (Some(city), Some(state), zip) => Self::city_state(city, state, zip),
            (None, None, Some(zip)) => Self::zip(zip),
            (None, Some(_), _) => Err(LocationError::MissingCity),
            _ => Err(LocationError::MissingFields),
        }
    }

    /// Deterministic cache key: lower-cased city, upper-cased state, optional ZIP.
    pub fn cache_key(&self) -> String {
        match self {
            Self::CityState {
                city,
                state,
                zip: Some(zip),
            } => format!("{}, {} {}", city.to_lowercase(), state, zip),
            Self::CityState {
                city,
                state,
                zip: None,
            } => format!("{}, {}", city.to_lowercase(), state),
            Self::Zip(zip) => zip.clone(),
        }
    }

    /// Human readable label, resolving bare ZIPs to a city when possible.
    pub fn label(&self) -> String {
        match self {
            Self::Zip(zip) => match zipcode::lookup_zipcode(zip) {
                Some((city, state)) => format!("{} ({}, {})", zip, city, state),
                None => zip.clone(),
            },
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CityState {
                city,
                state,
                zip: Some(zip),
            } => write!(f, "{}, {} {}", city, state, zip),
            Self::CityState {
                city,
                state,
                zip: None,
            } => write!(f, "{}, {}", city, state),
            Self::Zip(zip) => write!(f, "{}", zip),
        }
    }
}

/// Parse free text into a validated [`Location`].
///
/// Rules, in order: a bare 5-digit ZIP; otherwise split on the last comma
/// and read the right-hand side as `ST ZIP` or `ST`.
pub fn parse_location(input: &str) -> Result<Location, LocationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LocationError::Empty);
    }

    if is_zip(input) {
        return Ok(Location::Zip(input.to_string()));
    }

    let Some((city, rest)) = input.rsplit_once(',') else {
        return Err(LocationError::Unrecognized(input.to_string()));
    };
    let rest = rest.trim().to_ascii_uppercase();

    if let Some(caps) = STATE_AND_ZIP.captures(&rest) {
        return Location::city_state(city, &caps[1], Some(&caps[2]));
    }

    if rest.len() == 2 && rest.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Location::city_state(city, &rest, None);
    }

    Err(LocationError::Unrecognized(input.to_string()))
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_location(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code_set() {
        assert_eq!(US_STATE_CODES.len(), 51);
        assert!(is_state_code("dc"));
        assert!(is_state_code("Tx"));
        assert!(!is_state_code("ZZ"));
        assert!(!is_state_code("PR"));
    }

    #[test]
    fn test_parse_zip_only() {
        assert_eq!(
            parse_location("80202").unwrap(),
            Location::Zip("80202".to_string())
        );
        assert_eq!(
            parse_location("  80202 ").unwrap(),
            Location::Zip("80202".to_string())
        );
    }

    #[test]
    fn test_parse_city_state() {
        assert_eq!(
            parse_location("Denver, CO").unwrap(),
            Location::CityState {
                city: "Denver".to_string(),
                state: "CO".to_string(),
                zip: None,
            }
        );
    }

    #[test]
    fn test_parse_city_state_zip() {
        assert_eq!(
            parse_location("Denver, CO 80202").unwrap(),
            Location::CityState {
                city: "Denver".to_string(),
                state: "CO".to_string(),
                zip: Some("80202".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_uses_last_comma() {
        let loc = parse_location("Washington, District of Columbia, dc").unwrap();
        assert_eq!(
            loc,
            Location::CityState {
                city: "Washington, District of Columbia".to_string(),
                state: "DC".to_string(),
                zip: None,
            }
        );
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(
            parse_location("gibberish"),
            Err(LocationError::Unrecognized("gibberish".to_string()))
        );
        assert_eq!(parse_location("   "), Err(LocationError::Empty));
        assert_eq!(
            parse_location("Denver, Colorado"),
            Err(LocationError::Unrecognized("Denver, Colorado".to_string()))
        );
        assert_eq!(
            parse_location("Denver, ZZ"),
            Err(LocationError::UnknownState("ZZ".to_string()))
        );
        assert_eq!(parse_location(", CO"), Err(LocationError::MissingCity));
        assert!(parse_location("8020").is_err());
        assert!(parse_location("Denver, CO 8020").is_err());
    }

    #[test]
    fn test_cache_key_ignores_case() {
        let a = Location::city_state("Austin", "tx", None).unwrap();
        let b = Location::city_state("AUSTIN", "TX", None).unwrap();
        let c = parse_location("austin, Tx").unwrap();
        assert_eq!(a.cache_key(), "austin, TX");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_cache_key_collapses_whitespace() {
        let a = Location::city_state("New  York ", "ny", None).unwrap();
        let b = Location::city_state("new york", "NY", None).unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_with_zip() {
        let loc = Location::city_state("Denver", "co", Some("80202")).unwrap();
        assert_eq!(loc.cache_key(), "denver, CO 80202");
        assert_eq!(Location::Zip("80202".to_string()).cache_key(), "80202");
    }

    #[test]
    fn test_from_fields() {
        assert_eq!(
            Location::from_fields(Some("Austin"), Some("tx"), None).unwrap(),
            Location::CityState {
                city: "Austin".to_string(),
                state: "TX".to_string(),
                zip: None,
            }
        );
        assert_eq!(
            Location::from_fields(None, None, Some("73301")).unwrap(),
            Location::Zip("73301".to_string())
        );
        assert_eq!(
            Location::from_fields(Some(""), Some(" "), Some("")),
            Err(LocationError::MissingFields)
        );
        assert_eq!(
            Location::from_fields(Some("Nowhere"), Some("zz"), None),
            Err(LocationError::UnknownState("ZZ".to_string()))
        );
        assert_eq!(
            Location::from_fields(None, None, Some("1234a")),
            Err(LocationError::InvalidZip("1234a".to_string()))
        );
        assert_eq!(
            Location::from_fields(None, Some("CO"), None),
            Err(LocationError::MissingCity)
        );
    }

    #[test]
    fn test_display() {
        let loc = parse_location("denver, co 80202").unwrap();
        assert_eq!(loc.to_string(), "denver, CO 80202");
    }
}
