//! Cloud Spanner DDL as data.
//!
//! `wrench-ddl` provides the three pieces a schema tool needs from its
//! SQL dialect:
//!
//! - **Lexer** — tokenizes DDL text, including comments, back-quoted
//!   identifiers and typed literals.
//! - **AST** — a closed enumeration of statement kinds with structural
//!   equality (identifier comparison is case-insensitive, source
//!   positions are not part of the tree).
//! - **Parser / printer** — recursive-descent parsing into the AST, and
//!   canonical single-line SQL back out via [`std::fmt::Display`].
//!
//! # Example
//!
//! ```
//! use wrench_ddl::parse_ddl;
//!
//! let statements = parse_ddl(
//!     "CREATE TABLE Users (
//!        UserId INT64 NOT NULL, -- comment
//!        Name   STRING(64),
//!      ) PRIMARY KEY(UserId);",
//! )
//! .unwrap();
//! assert_eq!(
//!     statements[0].to_string(),
//!     "CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(64)) PRIMARY KEY (UserId)"
//! );
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use parser::{ParseError, Parser};

/// Parses a complete DDL text into statements.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text is not valid DDL.
pub fn parse_ddl(input: &str) -> Result<Vec<ast::Statement>, ParseError> {
    Parser::new(input).parse_ddl()
}
