//! Async client for the REST Countries API
//!
//! One GET per ISO code; the response is narrowed to the entry matching
//! the requested code. A 404 means "no detail", not a failure.

use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::core::config::LookupConfig;
use crate::core::error::{GeoError, Result};
use crate::lookup::detail::{parse_response, CountryDetail};
use crate::lookup::DetailLookup;

pub struct RestCountriesClient {
    client: Client,
    base_url: String,
}

impl RestCountriesClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeoError::Lookup(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code.trim().to_ascii_lowercase())
    }
}

impl DetailLookup for RestCountriesClient {
    async fn lookup(&self, code: &str) -> Result<Option<CountryDetail>> {
        let url = self.url_for(code);
        tracing::debug!("Fetching country detail from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeoError::Lookup(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GeoError::Lookup(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeoError::Lookup(e.to_string()))?;
        Ok(parse_response(&body, code)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let config = LookupConfig {
            base_url: "https://example.test/v3.1/alpha/".into(),
            timeout_secs: 1,
        };
        let client = RestCountriesClient::new(&config).unwrap();
        assert_eq!(client.url_for(" FR "), "https://example.test/v3.1/alpha/fr");
    }
}
