use thiserror::Error;

/// Failures while exchanging a location for a background image
#[derive(Debug, Error)]
pub enum BackgroundError {
    /// The webhook answered outside the 2xx range
    #[error("Webhook returned status {status}")]
    Webhook { status: u16 },

    /// The webhook answered without a usable `imgUrl`
    #[error("No image URL in response")]
    MissingImage,

    /// Network failure or an undecodable body, reported as-is
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}
