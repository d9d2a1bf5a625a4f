//! Collection loop for Consul KV modify indexes.
//!
//! A [`supervisor::Supervisor`] spawns one [`poller::Poller`] task per
//! [`kvmon_common::Target`]. Each poller repeatedly fetches the recursive KV
//! listing through a [`fetcher::Fetcher`], decodes it with
//! [`parser::parse_entries`], and writes the modify indexes into the shared
//! [`kvmon_storage::MetricStore`].
//!
//! Failures never stop a poller: fetch and decode errors skip the cycle,
//! malformed records skip only themselves.

pub mod error;
pub mod fetcher;
pub mod parser;
pub mod poller;
pub mod supervisor;


pub use error::{CollectError, EntryError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use parser::{parse_entries, KvEntry, ParsedEntries, SkippedEntry};
pub use poller::{CycleOutcome, Poller, DEFAULT_POLL_INTERVAL};
pub use supervisor::Supervisor;
