//! Markov Attribution
//!
//! Data-driven marketing channel attribution from event-level conversion data.
//!
//! This library provides functionality for:
//! - Loading touchpoint tables from JSON exports or built-in sample data
//! - Reconstructing time-ordered conversion paths per conversion
//! - Estimating first-order channel transition probabilities
//! - Computing Markov removal effects and normalized attribution weights
//! - Ranking conversion paths and adjacent channel pairs by attributed value

pub mod attribution;
pub mod cli;
pub mod config;
pub mod data_source;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries report output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
