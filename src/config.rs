use anyhow::Result;
use reqwest::Client;

use crate::constants::{GEO_API_BASE, IP_LOOKUP_URL, REQUEST_TIMEOUT, USER_AGENT, WEBHOOK_URL};

/// Remote endpoints used by one resolution cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ip_lookup_url: String,
    pub geo_api_base: String,
    pub webhook_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ip_lookup_url: IP_LOOKUP_URL.to_string(),
            geo_api_base: GEO_API_BASE.to_string(),
            webhook_url: WEBHOOK_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Geolocation URL for a given address
    pub fn geo_url(&self, ip: &str) -> String {
        format!("{}/{}", self.geo_api_base.trim_end_matches('/'), ip)
    }
}

/// Builds the HTTP client shared by the resolver and the fetcher
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_url_appends_address() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.geo_url("203.0.113.7"),
            "https://freeipapi.com/api/json/203.0.113.7"
        );

        let endpoints = Endpoints {
            geo_api_base: "http://127.0.0.1:9000/geo/".into(),
            ..Endpoints::default()
        };
        assert_eq!(endpoints.geo_url("::1"), "http://127.0.0.1:9000/geo/::1");
    }
}
