pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{InMemoryStore, ViaCepClient};
pub use crate::core::{ParcelService, RateFreightCalculator, ServiceSettings};
pub use domain::status::ParcelStatus;
pub use utils::error::{ParcelError, Result};
