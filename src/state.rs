use serde::Serialize;

use crate::constants::GENERIC_ERROR_MESSAGE;
use crate::models::LocationData;

/// UI-visible state of one resolution cycle.
///
/// `Loading` is the only non-terminal variant. A cycle moves from `Loading`
/// to exactly one of `Failed` or `Ready` and never back; only an explicit
/// restart puts a fresh `Loading` in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionState {
    #[default]
    Loading,
    Failed {
        message: String,
    },
    Ready {
        location: LocationData,
        background_image_url: String,
    },
}

impl ResolutionState {
    /// Failed state; an empty message is replaced by a generic one
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self::Failed { message }
    }

    pub fn ready(location: LocationData, background_image_url: impl Into<String>) -> Self {
        Self::Ready {
            location,
            background_image_url: background_image_url.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}
