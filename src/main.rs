use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use llm_weather::{Config, UpstreamClient, WeatherService, parse_location};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <location>", args[0]);
        eprintln!("  location: \"City, ST\", \"City, ST ZIP\", or a 5-digit ZIP");
        eprintln!("  e.g. {} \"Denver, CO\"", args[0]);
        std::process::exit(1);
    }

    // Allow unquoted input such as: llm-weather Denver, CO
    let input = args[1..].join(" ");
    let location = match parse_location(&input) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Enter a city and state like \"Denver, CO\", or a 5-digit ZIP code.");
            std::process::exit(1);
        }
    };

    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let client = Arc::new(
        UpstreamClient::new(config.upstream.clone()).context("Failed to build HTTP client")?,
    );
    let service = WeatherService::new(client, config.weather.clone());
    if !service.is_configured() {
        eprintln!("Error: OPENROUTER_API_KEY is not set (or is still a placeholder)");
        std::process::exit(1);
    }

    println!("Weather for {}...\n", location.label());
    let report = service
        .report(&location)
        .await
        .with_context(|| format!("Failed to get weather for {}", location))?;

    println!("{}", report.report);
    Ok(())
}
