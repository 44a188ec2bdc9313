use thiserror::Error;

/// Core error type shared across Lycophron crates.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more requested namespaces are not declared in the catalog.
    #[error("unknown namespace(s): {}", .0.join(", "))]
    UnknownNamespace(Vec<String>),
    /// CSV headers that are not part of the catalog.
    #[error("invalid header(s): {}", .0.join(", "))]
    InvalidHeaders(Vec<String>),
}

/// Convenience alias for results returned by Lycophron crates.
pub type Result<T> = std::result::Result<T, Error>;
