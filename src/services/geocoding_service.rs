use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::location::Coordinate;

/// The only failure a geocoder reports. Network errors, provider errors and
/// empty result sets all look the same to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("address could not be resolved")]
pub struct Unresolvable;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> std::result::Result<Coordinate, Unresolvable>;
}

/// Resolve an address or fail with the crate's `AddressUnresolvable`.
pub async fn resolve_address(geocoder: &dyn Geocoder, address: &str) -> Result<Coordinate> {
    geocoder
        .resolve(address)
        .await
        .map_err(|_| Error::AddressUnresolvable(address.to_string()))
}

/// Google Geocoding API client.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    endpoint: url::Url,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, endpoint: url::Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build geocoder HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    async fn lookup(&self, address: &str) -> anyhow::Result<Coordinate> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("geocoder returned HTTP {}", status.as_u16());
        }

        let body: GeocodeResponse = resp.json().await?;
        if body.status != "OK" {
            anyhow::bail!(
                "geocoder status {}: {}",
                body.status,
                body.error_message.unwrap_or_default()
            );
        }

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("geocoder returned no results"))?;
        let location = first.geometry.location;
        Ok(Coordinate::new(location.lng, location.lat)?)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, address: &str) -> std::result::Result<Coordinate, Unresolvable> {
        if address.trim().is_empty() {
            return Err(Unresolvable);
        }
        match self.lookup(address).await {
            Ok(coordinate) => Ok(coordinate),
            Err(e) => {
                tracing::warn!(error = %e, "Geocoding failed");
                Err(Unresolvable)
            }
        }
    }
}
