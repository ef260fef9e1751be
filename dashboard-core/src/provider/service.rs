use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    error::{DashboardError, DashboardResult},
    model::CityWeather,
    normalize::{normalize, parse_weather},
    provider::{clean_city_name, truncate_body},
};

use super::WeatherProvider;

/// HTTP client of the dashboard's weather service.
#[derive(Debug, Clone)]
pub struct WeatherServiceClient {
    base_url: String,
    http: Client,
}

impl WeatherServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn city_url(&self, city: &str) -> String {
        format!("{}/weather_api/{}", self.base_url, urlencoding::encode(city))
    }
}

#[async_trait]
impl WeatherProvider for WeatherServiceClient {
    async fn fetch_city(&self, city: &str) -> DashboardResult<CityWeather> {
        let city = clean_city_name(city)?;
        let url = self.city_url(city);
        debug!(%url, "requesting city weather");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DashboardError::from_transport(&e, &self.base_url))?;

        let status = res.status();
        if !status.is_success() {
            // the status decides the error; the body is only logged
            let body = res.text().await.unwrap_or_default();
            warn!(city, %status, body = %truncate_body(&body), "weather request failed");
            return Err(DashboardError::from_status(status, city));
        }

        let body = res
            .text()
            .await
            .map_err(|e| DashboardError::from_transport(&e, &self.base_url))?;
        let raw = parse_weather(&body)?;
        normalize(raw)
    }

    async fn health(&self) -> DashboardResult<()> {
        let url = format!("{}/health", self.base_url);
        debug!(%url, "checking weather service health");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DashboardError::from_transport(&e, &self.base_url))?;

        let status = res.status();
        if !status.is_success() {
            return Err(DashboardError::ServerError(status.as_u16()));
        }
        Ok(())
    }
}
