use thiserror::Error;

/// Result type alias for trustsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while synchronizing trust bundles
#[derive(Error, Debug)]
pub enum SyncError {
    /// Bundle URL could not be parsed or uses an unsupported scheme
    #[error("invalid bundle url: {0}")]
    Url(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// PEM decoding failed
    #[error("PEM decode error: {0}")]
    PemDecode(String),

    /// X.509 certificate parsing failed
    #[error("certificate parse error: {0}")]
    CertParse(String),

    /// CMS signed-data structure was malformed
    #[error("signed container error: {0}")]
    Cms(String),

    /// A bundle or anchor store operation failed
    #[error("store error: {0}")]
    Store(String),

    /// A bundle with the same name already exists
    #[error("bundle name already in use: {0}")]
    DuplicateName(String),

    /// Configuration is invalid or missing required fields
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
