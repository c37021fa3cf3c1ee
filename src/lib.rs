//! Locates a visitor by IP address, trades the location for a background
//! image at an automation webhook, and exposes the resulting welcome view.

pub mod background;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod location;
pub mod models;
pub mod render;
pub mod service;
pub mod state;

pub use background::{Background, BackgroundFetcher};
pub use config::Endpoints;
pub use controller::{run_cycle, ResolutionController};
pub use error::BackgroundError;
pub use location::LocationResolver;
pub use models::LocationData;
pub use state::ResolutionState;
