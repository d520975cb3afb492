use thiserror::Error;

/// Core error type shared across pgmatch crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A catalog query failed or could not be decoded.
    #[error("database error: {0}")]
    Db(String),
    /// The connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),
    /// The server asked for a password and none was supplied.
    #[error("password required: {0}")]
    PasswordRequired(String),
    /// A mandatory lookup returned no rows.
    #[error("no rows returned: {0}")]
    NoRows(String),
    /// The catalog reader broke one of its own guarantees.
    #[error("internal error: {0}")]
    Invariant(String),
    /// An identifier was rejected before being interpolated into SQL.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by pgmatch crates.
pub type Result<T> = std::result::Result<T, Error>;
