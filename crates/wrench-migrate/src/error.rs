//! Error types for the migration engine.

/// Errors surfaced by schema build, diff generation, and apply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The DDL text was rejected by the parser.
    #[error("{uri}: failed to parse ddl: {message}")]
    Parse {
        /// File path or URI the text came from.
        uri: String,
        /// Parser message including line/column.
        message: String,
    },

    /// An index or change stream referenced a table that is not defined.
    #[error("cannot find table {table} to apply {kind} {name}")]
    MissingTable {
        /// What referenced the table ("index", "search index", ...).
        kind: &'static str,
        /// Name of the referencing object.
        name: String,
        /// The missing table.
        table: String,
    },

    /// Interleave parent table is not defined.
    #[error("parent table {parent} of {table} not found")]
    MissingParent {
        /// The missing parent.
        parent: String,
        /// The interleaved child.
        table: String,
    },

    /// A statement kind the schema builder does not accept.
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// A source URI that is neither a spanner URI nor a file path.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// File read failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential loading or token fetch failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] gcp_auth::Error),

    /// The admin or data API returned an error status.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, Error>;
