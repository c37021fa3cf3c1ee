use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Endpoints;
use crate::models::{non_empty, GeoResponse, IpResponse, LocationData};

/// Best-effort IP geolocation of the current visitor
#[derive(Clone)]
pub struct LocationResolver {
    client: Arc<Client>,
    endpoints: Endpoints,
}

impl LocationResolver {
    pub fn new(client: Arc<Client>, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Resolves the visitor's location, falling back to the fixed default
    /// on any failure. Never fails.
    pub async fn resolve(&self) -> LocationData {
        match self.lookup().await {
            Ok(location) => {
                tracing::info!(
                    "Resolved location: {}, {} ({}, {})",
                    location.city,
                    location.country,
                    location.latitude,
                    location.longitude
                );
                location
            }
            Err(e) => {
                tracing::warn!("Geolocation failed, using default location: {:#}", e);
                LocationData::fallback()
            }
        }
    }

    /// Public IP lookup followed by geolocation of that IP
    pub async fn lookup(&self) -> Result<LocationData> {
        let ip_info = self
            .make_request::<IpResponse>(&self.endpoints.ip_lookup_url)
            .await
            .context("IP lookup failed")?;
        let ip = non_empty(ip_info.ip).context("IP lookup response has no address")?;

        tracing::debug!("Public IP: {}", ip);

        let geo = self
            .make_request::<GeoResponse>(&self.endpoints.geo_url(&ip))
            .await
            .context("geolocation lookup failed")?;

        Ok(geo.into_location())
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Request failed with status: {}", response.status());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}
