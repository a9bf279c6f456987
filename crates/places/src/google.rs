use std::env;
use std::time::Duration;

use reqwest::Client;

use crate::{DirectoryError, NearbyQuery, NearbySearchResponse, PlacesDirectory};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";

#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl PlacesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// `None` when `GOOGLE_MAPS_API_KEY` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let base_url =
            env::var("VIBES_PLACES_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            env::var("VIBES_PLACES_TIMEOUT_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        );

        Some(Self {
            api_key,
            base_url,
            timeout,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    config: PlacesConfig,
}

impl GooglePlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            NEARBY_SEARCH_PATH
        )
    }
}

impl PlacesDirectory for GooglePlacesClient {
    async fn nearby_search(
        &self,
        query: &NearbyQuery<'_>,
    ) -> Result<NearbySearchResponse, DirectoryError> {
        let params = [
            ("key", self.config.api_key.clone()),
            ("location", query.location.as_query_value()),
            ("radius", query.radius_m.to_string()),
            ("type", query.category.to_string()),
            ("opennow", "true".to_string()),
        ];

        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<NearbySearchResponse>().await?)
    }
}
