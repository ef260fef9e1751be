use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{CityWeather, Config, error::DashboardResult, provider::service::WeatherServiceClient};

pub mod service;

/// Source of weather snapshots, one city per call.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch and normalize the current weather for `city`.
    async fn fetch_city(&self, city: &str) -> DashboardResult<CityWeather>;

    /// Liveness probe of the underlying service.
    async fn health(&self) -> DashboardResult<()>;
}

/// Construct the HTTP weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    config.validate()?;
    Ok(Arc::new(WeatherServiceClient::new(config.api_base_url.clone())))
}

/// Trim user input into a lookup key, rejecting blank names.
pub fn clean_city_name(raw: &str) -> DashboardResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(crate::DashboardError::Validation(
            "Please enter the name of a city".to_string(),
        ));
    }
    Ok(trimmed)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
