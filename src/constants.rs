use std::time::Duration;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "welcome-background/0.1.0";

/// Public IP lookup endpoint (responds with `{"ip": "..."}`)
pub const IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

/// IP geolocation API base URL, the address is appended as a path segment
pub const GEO_API_BASE: &str = "https://freeipapi.com/api/json";

/// Automation webhook that exchanges a location for a background image
pub const WEBHOOK_URL: &str =
    "https://nass11.app.n8n.cloud/webhook-test/0ed3d82f-8c6a-4746-8423-226584100d86";

/// Upper bound for any single outbound request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CITY: &str = "New York";
pub const DEFAULT_COUNTRY: &str = "United States";
pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;

/// Placeholder for a city or country the geolocation service left out
pub const UNKNOWN: &str = "Unknown";

/// Shown when a failure carries no message of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
