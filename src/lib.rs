pub mod cache;
pub mod config;
pub mod location;
pub mod prompts;
pub mod server;
pub mod suggest;
pub mod types;
pub mod upstream;
pub mod weather;
pub mod zipcode;

pub use cache::{Clock, ManualClock, ResponseCache, SystemClock};
pub use config::Config;
pub use location::{Location, LocationError, parse_location};
pub use server::{AppState, build_app};
pub use suggest::SuggestService;
pub use types::WeatherReport;
pub use upstream::{UpstreamClient, UpstreamError};
pub use weather::WeatherService;
