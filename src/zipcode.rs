/// Look up city and state from a US zip code.
///
/// Only used to label ZIP-only requests; an unknown ZIP is still a valid
/// request and goes to the upstream model as-is.
pub fn lookup_zipcode(zip: &str) -> Option<(String, String)> {
    // Avoid zipcodes::matching to suppress debug_print output.
    let results = zipcodes::filter_by(vec![|z: &zipcodes::Zipcode| z.zip_code == zip], None).ok()?;
    let info = results.first()?;
    Some((info.city.clone(), info.state.clone()))
}

/// Describe a ZIP for a prompt: `"ZIP code 80202 (Denver, CO)"` when known.
pub fn describe_zip(zip: &str) -> String {
    match lookup_zipcode(zip) {
        Some((city, state)) => format!("ZIP code {} ({}, {})", zip, city, state),
        None => format!("ZIP code {}", zip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_zip_falls_back_to_digits() {
        assert!(lookup_zipcode("00000").is_none());
        assert_eq!(describe_zip("00000"), "ZIP code 00000");
    }

    #[test]
    fn test_known_zip_mentions_city() {
        if let Some((city, state)) = lookup_zipcode("80202") {
            assert_eq!(state, "CO");
            assert!(describe_zip("80202").contains(&city));
        }
    }
}
