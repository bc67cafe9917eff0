//! Reverse geocoding against a Nominatim-style endpoint
//!
//! This adapter owns its own HTTP client instead of going through the
//! gateway: the geocoding service is third-party, and the bearer token
//! must never leave our backend. The caller bounds the whole lookup
//! with its own deadline, so no timeout is set here.

use anyhow::Context;
use async_trait::async_trait;
use ft_core::ports::ReverseGeocodePort;
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!("fieldtrack/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

pub struct HttpReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReverseGeocoder {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("build geocoder HTTP client failed")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocodePort for HttpReverseGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url, latitude, longitude
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("reverse geocoding request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("reverse geocoding returned {}", status);
        }

        let body: ReverseResponse = response
            .json()
            .await
            .context("reverse geocoding response did not parse")?;
        debug!(
            found = body.display_name.is_some(),
            "reverse geocoding completed"
        );
        Ok(body.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_reverse_returns_display_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/reverse")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("format".into(), "jsonv2".into()),
                Matcher::UrlEncoded("lat".into(), "26.9124".into()),
                Matcher::UrlEncoded("lon".into(), "75.7873".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"display_name": "Jaipur, Rajasthan, India"}"#)
            .create_async()
            .await;

        let geocoder = HttpReverseGeocoder::new(server.url()).unwrap();
        let address = geocoder.reverse(26.9124, 75.7873).await.unwrap();
        assert_eq!(address.as_deref(), Some("Jaipur, Rajasthan, India"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reverse_unknown_location_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Unable to geocode"}"#)
            .create_async()
            .await;

        let geocoder = HttpReverseGeocoder::new(server.url()).unwrap();
        let address = geocoder.reverse(0.0, 0.0).await.unwrap();
        assert_eq!(address, None);
    }

    #[tokio::test]
    async fn test_reverse_server_error_is_err() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let geocoder = HttpReverseGeocoder::new(server.url()).unwrap();
        let result = geocoder.reverse(26.9124, 75.7873).await;
        assert!(result.is_err());
    }
}
