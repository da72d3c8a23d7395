//! Prompt text for the two endpoints.

use crate::location::Location;
use crate::zipcode;

/// Section headers every weather report must contain, in order.
pub const REPORT_SECTIONS: [&str; 4] = [
    "CURRENT CONDITIONS",
    "5-DAY FORECAST",
    "WEATHER ALERTS",
    "RECOMMENDATIONS",
];

/// Most suggestions ever returned for one query.
pub const MAX_SUGGESTIONS: usize = 6;

pub const WEATHER_SYSTEM_PROMPT: &str = "\
You are a weather reporting assistant for locations in the United States.
Write a concise weather report for the location the user gives you.

Format rules:
- Plain text only. Do not use markdown: no '#', no '*', no '**', no tables, no code fences.
- Use exactly these section headers, each on its own line, in this order:
  CURRENT CONDITIONS
  5-DAY FORECAST
  WEATHER ALERTS
  RECOMMENDATIONS
- Under CURRENT CONDITIONS give temperature in Fahrenheit, sky conditions, humidity and wind.
- Under 5-DAY FORECAST give one line per day: day name, high/low in Fahrenheit, short summary.
- Under WEATHER ALERTS write 'None' if there is nothing notable.
- Under RECOMMENDATIONS give two or three short practical suggestions.
- Do not add any introduction or closing remarks outside these sections.";

pub const SUGGEST_SYSTEM_PROMPT: &str = "\
You are an autocomplete service for United States locations.
Given a partial location typed by a user, return up to 6 real US places that match it.

Respond with ONLY a JSON array of strings and nothing else.
Each string must be formatted exactly as \"City, ST\" or \"City, ST ZIP\",
where ST is the two-letter USPS state code and ZIP is a 5-digit ZIP code.
Order results from most to least likely. If nothing matches, respond with [].";

/// User message for a weather report.
pub fn weather_user_message(location: &Location) -> String {
    let place = match location {
        Location::Zip(zip) => zipcode::describe_zip(zip),
        other => other.to_string(),
    };
    format!("Give me the weather report for {}.", place)
}

/// User message for an autocomplete query.
pub fn suggest_user_message(query: &str) -> String {
    format!("Partial location: {}", query.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_prompt_lists_every_section() {
        for section in REPORT_SECTIONS {
            assert!(WEATHER_SYSTEM_PROMPT.contains(section), "missing {}", section);
        }
    }

    #[test]
    fn test_weather_user_message() {
        let loc = Location::city_state("Austin", "tx", None).unwrap();
        assert_eq!(
            weather_user_message(&loc),
            "Give me the weather report for Austin, TX."
        );

        let loc = Location::Zip("00000".to_string());
        assert_eq!(
            weather_user_message(&loc),
            "Give me the weather report for ZIP code 00000."
        );
    }

    #[test]
    fn test_suggest_prompt_mentions_limit() {
        assert!(SUGGEST_SYSTEM_PROMPT.contains(&MAX_SUGGESTIONS.to_string()));
        assert_eq!(suggest_user_message("  den "), "Partial location: den");
    }
}
