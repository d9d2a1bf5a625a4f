//! In-memory metric store for KV modify indexes.
//!
//! [`gauge::MetricStore`] keeps one gauge per `(dc, key)` pair in a private
//! Prometheus registry. Pollers write to it concurrently; the HTTP exposition
//! endpoint reads it on demand through [`gauge::MetricStore::snapshot`] or
//! [`gauge::MetricStore::render`].

pub mod error;
pub mod gauge;


pub use error::StoreError;
pub use gauge::{MetricStore, METRIC_HELP, METRIC_NAME};
