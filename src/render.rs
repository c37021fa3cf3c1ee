use anyhow::Result;

use crate::models::ViewFormat;
use crate::state::ResolutionState;

pub const LOADING_TEXT: &str = "Discovering your location...";
pub const WELCOME_HEADING: &str = "Welcome";
pub const WELCOME_TAGLINE: &str = "Discover the beauty of your location";

/// Renders a state in the requested format
pub fn render(state: &ResolutionState, format: ViewFormat) -> Result<String> {
    match format {
        ViewFormat::Text => Ok(render_text(state)),
        ViewFormat::Json => render_json(state),
    }
}

/// Formats the welcome view into a human-readable string
pub fn render_text(state: &ResolutionState) -> String {
    match state {
        ResolutionState::Loading => format!("{}\n", LOADING_TEXT),
        ResolutionState::Failed { message } => format!("Error\n\n{}\n", message),
        ResolutionState::Ready {
            location,
            background_image_url,
        } => format!(
            "{}\n{}\n\n\u{1f4cd} {}\n  {}\n\nBackground: {}\n",
            WELCOME_HEADING, WELCOME_TAGLINE, location.city, location.country, background_image_url
        ),
    }
}

pub fn render_json(state: &ResolutionState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}
