/// Errors raised while building or encoding the metric store.
///
/// Updating and reading values never fails; only registry construction and
/// text encoding can.
///
/// # Examples
///
/// ```rust
/// use kvmon_storage::StoreError;
///
/// let err = StoreError::Registry(prometheus::Error::Msg("duplicate".to_string()));
/// assert!(err.to_string().contains("duplicate"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The gauge vector could not be created or registered.
    #[error("Store: metric registry error: {0}")]
    Registry(#[from] prometheus::Error),

    /// The text encoder produced bytes that are not valid UTF-8.
    #[error("Store: exposition output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Convenience `Result` alias for metric store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
