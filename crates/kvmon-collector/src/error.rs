/// Errors that abort a single poll cycle.
///
/// Neither variant is fatal: the poller logs it and tries again after the
/// next interval.
///
/// # Examples
///
/// ```rust
/// use kvmon_collector::error::CollectError;
///
/// let err: CollectError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
/// assert!(err.to_string().contains("decode"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("KV request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The payload is not a JSON array of objects.
    #[error("Failed to decode KV listing: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, CollectError>;

/// Why an individual KV record was skipped.
///
/// Record errors never fail the batch they belong to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("record has no 'Key' field")]
    MissingKey,

    /// `Key` is present but not a string; holds the JSON type found.
    #[error("'Key' field is {0}, expected string")]
    InvalidKey(&'static str),

    #[error("record '{key}' has no 'ModifyIndex' field")]
    MissingModifyIndex { key: String },

    #[error("'ModifyIndex' of record '{key}' is {found}, expected number")]
    InvalidModifyIndex { key: String, found: &'static str },
}
