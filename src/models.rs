use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, UNKNOWN};

// ============================================================================
// Location
// ============================================================================

/// Approximate visitor location. Also the webhook request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationData {
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            latitude,
            longitude,
        }
    }

    /// Location used whenever geolocation cannot be completed
    pub fn fallback() -> Self {
        Self::new(DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }

    /// Copy with city/country replaced where a correction is present.
    /// Coordinates are always kept.
    pub fn corrected(&self, city: Option<String>, country: Option<String>) -> Self {
        Self {
            city: non_empty(city).unwrap_or_else(|| self.city.clone()),
            country: non_empty(country).unwrap_or_else(|| self.country.clone()),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Treats an empty string the same as an absent value
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ============================================================================
// ipify / freeipapi Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IpResponse {
    pub ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeoResponse {
    #[serde(rename = "cityName")]
    pub city_name: Option<String>,
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoResponse {
    /// Fills each missing field independently: names become "Unknown",
    /// coordinates become 0.
    pub fn into_location(self) -> LocationData {
        LocationData {
            city: non_empty(self.city_name).unwrap_or_else(|| UNKNOWN.to_string()),
            country: non_empty(self.country_name).unwrap_or_else(|| UNKNOWN.to_string()),
            latitude: self.latitude.unwrap_or(0.0),
            longitude: self.longitude.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// Webhook Models
// ============================================================================

#[derive(Debug, Default, PartialEq)]
pub struct WebhookResponse {
    pub img_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl WebhookResponse {
    /// Reads each field on its own; a missing or non-string value leaves
    /// only that field empty. Non-object bodies yield nothing.
    pub fn from_value(body: &Value) -> Self {
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);

        Self {
            img_url: field("imgUrl"),
            city: field("city"),
            country: field("country"),
        }
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetWelcomeRequest {
    /// "text" (default) or "json"
    #[serde(default)]
    pub format: ViewFormat,
    /// Block until the resolution cycle has finished
    #[serde(default)]
    pub wait: bool,
}
