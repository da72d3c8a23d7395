//! Weather reports generated by the upstream model, cached per location.

use std::sync::Arc;

use crate::cache::{ResponseCache, WEATHER_TTL};
use crate::config::EndpointConfig;
use crate::location::Location;
use crate::prompts;
use crate::types::WeatherReport;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Produces weather reports, serving repeats from a 15-minute cache.
///
/// A request goes through cache lookup, then (on a miss) one upstream call,
/// then a cache write. Failures are returned as-is and never retried.
#[derive(Clone)]
pub struct WeatherService {
    client: Arc<UpstreamClient>,
    cache: ResponseCache<String>,
    settings: EndpointConfig,
}

impl WeatherService {
    pub fn new(client: Arc<UpstreamClient>, settings: EndpointConfig) -> Self {
        Self::with_cache(client, ResponseCache::new(WEATHER_TTL), settings)
    }

    pub fn with_cache(
        client: Arc<UpstreamClient>,
        cache: ResponseCache<String>,
        settings: EndpointConfig,
    ) -> Self {
        Self {
            client,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &ResponseCache<String> {
        &self.cache
    }

    /// Whether the upstream credential is usable.
    pub fn is_configured(&self) -> bool {
        self.client.has_credentials()
    }

    /// Report for `location`, from cache when fresh.
    pub async fn report(&self, location: &Location) -> Result<WeatherReport, UpstreamError> {
        let key = location.cache_key();

        if let Some(report) = self.cache.get(&key).await {
            tracing::info!("Weather cache hit for '{}'", key);
            return Ok(WeatherReport {
                report,
                cached: true,
            });
        }

        tracing::info!("Weather cache miss for '{}', asking upstream", key);
        let report = self
            .client
            .complete(
                &self.settings,
                prompts::WEATHER_SYSTEM_PROMPT,
                &prompts::weather_user_message(location),
            )
            .await?;

        self.cache.put(key, report.clone()).await;
        Ok(WeatherReport {
            report,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit_needs_no_credentials() {
        let client = Arc::new(UpstreamClient::new(Default::default()).unwrap());
        let service = WeatherService::new(client, EndpointConfig::weather());
        assert!(!service.is_configured());

        service
            .cache()
            .put("austin, TX", "CURRENT CONDITIONS\nHot".to_string())
            .await;

        let location = Location::city_state("AUSTIN", "tx", None).unwrap();
        let report = service.report(&location).await.unwrap();
        assert!(report.cached);
        assert_eq!(report.report, "CURRENT CONDITIONS\nHot");
    }

    #[tokio::test]
    async fn test_miss_without_credentials_is_not_cached() {
        let client = Arc::new(UpstreamClient::new(Default::default()).unwrap());
        let service = WeatherService::new(client, EndpointConfig::weather());

        let location = Location::Zip("80202".to_string());
        let err = service.report(&location).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unauthenticated));
        assert!(service.cache().is_empty().await);
    }
}
