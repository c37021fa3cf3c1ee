use reqwest::Client;
use std::sync::Arc;

use crate::error::BackgroundError;
use crate::models::{non_empty, LocationData, WebhookResponse};

/// Successful webhook exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// Never empty
    pub image_url: String,
    /// Input location with the webhook's city/country corrections applied
    pub location: LocationData,
}

/// Exchanges a location for a background image URL via the webhook
#[derive(Clone)]
pub struct BackgroundFetcher {
    client: Arc<Client>,
    webhook_url: String,
}

impl BackgroundFetcher {
    pub fn new(client: Arc<Client>, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    /// Posts the location once. No retry.
    pub async fn fetch(&self, location: &LocationData) -> Result<Background, BackgroundError> {
        tracing::info!("Requesting background for {}, {}", location.city, location.country);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(location)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackgroundError::Webhook {
                status: status.as_u16(),
            });
        }

        let body = response.json::<serde_json::Value>().await?;
        let reply = WebhookResponse::from_value(&body);

        let image_url = non_empty(reply.img_url).ok_or(BackgroundError::MissingImage)?;

        Ok(Background {
            image_url,
            location: location.corrected(reply.city, reply.country),
        })
    }
}
