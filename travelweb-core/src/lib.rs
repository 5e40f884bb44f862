//! Core library for the `travelweb` tools.
//!
//! This crate defines:
//! - The KMA forecast-grid projection and issuance-window resolvers
//! - Decoding of forecast category codes into observations
//! - Configuration & service-key handling
//! - Clients for the tourism, weather, and photo-award REST services
//!
//! It is used by `travelweb-cli`, but can also be reused by other binaries or services.

pub mod broadcast;
pub mod client;
pub mod config;
pub mod decode;
pub mod grid;

pub use broadcast::{ForecastWindow, ncst_window, ultra_fcst_window, village_window};
pub use client::{ApiError, Page, photo_client_from_config, tour_client_from_config, weather_client_from_config};
pub use config::{ApiId, Config, ServiceConfig};
pub use decode::{WeatherObservation, decode_observation};
pub use grid::{GridCell, project_to_grid};
