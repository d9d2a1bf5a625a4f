//! Startup, configuration and HTTP exposition for the kvmon exporter.

pub mod app;
pub mod config;
pub mod logging;
pub mod state;
