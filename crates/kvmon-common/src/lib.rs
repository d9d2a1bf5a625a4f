//! Shared types for the kvmon exporter.
//!
//! A [`types::Target`] names one `(dc, directory)` pair to poll, a
//! [`types::TargetSet`] is the resolved list of them, and
//! [`types::Observation`] / [`types::MetricSample`] carry modify indexes
//! between the collector and the metric store.

pub mod types;

pub use types::{MetricSample, Observation, Target, TargetSet};
