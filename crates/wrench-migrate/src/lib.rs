//! Schema migrations for Cloud Spanner.
//!
//! `wrench-migrate` compares two schemas and produces the ordered DDL
//! that transforms one into the other while respecting the database's
//! structural constraints: interleaving, foreign keys, primary-key
//! immutability, index rebuilds, change-stream watches, and the
//! role/grant lifecycle.
//!
//! # Architecture
//!
//! - **ddl** — statement filtering on the way in, the emitted
//!   [`Operation`] list on the way out.
//! - **schema** — folds statements into a typed [`Database`].
//! - **compare** — structural equality with semantic normalization.
//! - **diff** — the planner: a fixed-order walk with cascade-tracking
//!   scratch state.
//! - **client** / **source** — the admin API wrapper and URI-addressed
//!   schema sources.
//!
//! # Example
//!
//! ```
//! use wrench_migrate::prelude::*;
//!
//! let option = DdlOption::default();
//! let from = parse_ddl("from", "CREATE TABLE t (a INT64) PRIMARY KEY(a);", &option).unwrap();
//! let to = parse_ddl(
//!     "to",
//!     "CREATE TABLE t (a INT64, b STRING(36)) PRIMARY KEY(a);",
//!     &option,
//! )
//! .unwrap();
//!
//! let operations = diff(&Database::new(&from).unwrap(), &Database::new(&to).unwrap());
//! let sql: Vec<String> = operations.iter().map(Operation::sql).collect();
//! assert_eq!(sql, vec!["ALTER TABLE t ADD COLUMN b STRING(36)"]);
//! ```

pub mod client;
pub mod compare;
pub mod ddl;
pub mod diff;
pub mod error;
pub mod schema;
pub mod source;

pub use ddl::{parse_ddl, Ddl, DdlOption, Operation};
pub use diff::{diff, diff_with_config, DiffConfig};
pub use error::{Error, Result};
pub use schema::Database;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{Client, DatabaseId};
    pub use crate::ddl::{parse_ddl, Ddl, DdlOption, Operation};
    pub use crate::diff::{diff, diff_with_config, DiffConfig};
    pub use crate::error::{Error, Result};
    pub use crate::schema::Database;
    pub use crate::source::Source;
}
