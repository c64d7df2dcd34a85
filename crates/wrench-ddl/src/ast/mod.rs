//! Typed AST for Cloud Spanner DDL.
//!
//! Statement kinds form a closed enumeration ([`Statement`]); every node
//! renders back to canonical SQL through [`std::fmt::Display`].
//! Identifiers compare case-insensitively, which makes derived
//! structural equality on AST nodes match the database's own notion of
//! schema-object identity. Source positions are not stored on nodes, so
//! two parses of differently-formatted but equivalent DDL compare equal.

mod ddl;
mod expr;
mod types;

pub use ddl::{
    AlterChangeStream, AlterDatabase, AlterIndex, AlterTable, Check, ColumnDef, ColumnOptions,
    Constraint, CreateChangeStream, CreateIndex, CreateRole, CreateSearchIndex, CreateTable,
    CreateView, DatabaseOptions, DropChangeStream, DropIndex, DropRole, DropSearchIndex, DropTable,
    DropView, ForeignKey, Grant, GrantTarget, IndexAlteration, Interleave, KeyPart, OnDelete,
    PrivilegeKind, RawStatement, Revoke, RowDeletionPolicy, SqlSecurity, Statement,
    StreamAlteration, StreamOptions, TableAlteration, TableConstraint, TablePrivilege, Watch,
    WatchDef,
};
pub use expr::{BinaryOp, Expr, Lit, UnaryOp};
pub use types::{ColumnType, Length, TypeBase};

use std::fmt;
use std::hash::{Hash, Hasher};

/// A single schema identifier.
///
/// Equality and hashing are case-insensitive; the original spelling is
/// preserved for printing.
#[derive(Debug, Clone)]
pub struct Ident(pub String);

impl Ident {
    /// Creates an identifier from its source spelling.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the source spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Ident {}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_quoting(&self.0) {
            write!(f, "`{}`", self.0)
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A possibly multi-part schema path (`name` or `schema.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(pub Vec<Ident>);

impl Path {
    /// Creates a single-segment path.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![Ident::new(name)])
    }

    /// Returns the final segment (the object's own name).
    #[must_use]
    pub fn name(&self) -> &Ident {
        self.0.last().expect("path has at least one segment")
    }

    /// Returns the lower-cased dotted form used as a map key.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|i| i.0.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::single(s)
    }
}

/// Returns true if an identifier must be back-quoted when printed.
fn needs_quoting(name: &str) -> bool {
    let simple = !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    !simple || is_reserved(name)
}

/// Reserved words of the GoogleSQL dialect; these are back-quoted when
/// used as identifiers.
fn is_reserved(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "ASSERT_ROWS_MODIFIED", "AT", "BETWEEN", "BY",
        "CASE", "CAST", "COLLATE", "CONTAINS", "CREATE", "CROSS", "CUBE", "CURRENT", "DEFAULT",
        "DEFINE", "DESC", "DISTINCT", "ELSE", "END", "ENUM", "ESCAPE", "EXCEPT", "EXCLUDE",
        "EXISTS", "EXTRACT", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL", "GROUP",
        "GROUPING", "GROUPS", "HASH", "HAVING", "IF", "IGNORE", "IN", "INNER", "INTERSECT",
        "INTERVAL", "INTO", "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "LOOKUP", "MERGE",
        "NATURAL", "NEW", "NO", "NOT", "NULL", "NULLS", "OF", "ON", "OR", "ORDER", "OUTER",
        "OVER", "PARTITION", "PRECEDING", "PROTO", "RANGE", "RECURSIVE", "RESPECT", "RIGHT",
        "ROLLUP", "ROWS", "SELECT", "SET", "SOME", "STRUCT", "TABLESAMPLE", "THEN", "TO", "TREAT",
        "TRUE", "UNBOUNDED", "UNION", "UNNEST", "USING", "WHEN", "WHERE", "WINDOW", "WITH",
        "WITHIN",
    ];
    let upper = name.to_ascii_uppercase();
    RESERVED.contains(&upper.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_eq_ignores_case() {
        assert_eq!(Ident::new("Users"), Ident::new("users"));
        assert_ne!(Ident::new("Users"), Ident::new("accounts"));
    }

    #[test]
    fn test_ident_display_quotes_reserved() {
        assert_eq!(Ident::new("UserId").to_string(), "UserId");
        assert_eq!(Ident::new("order").to_string(), "`order`");
        assert_eq!(Ident::new("default").to_string(), "`default`");
        assert_eq!(Ident::new("with space").to_string(), "`with space`");
    }

    #[test]
    fn test_path_display_and_canonical() {
        let p = Path(vec![Ident::new("Billing"), Ident::new("Invoices")]);
        assert_eq!(p.to_string(), "Billing.Invoices");
        assert_eq!(p.canonical(), "billing.invoices");
        assert_eq!(p.name(), &Ident::new("invoices"));
    }

    #[test]
    fn test_path_eq_ignores_case() {
        assert_eq!(Path::single("T1"), Path::single("t1"));
    }
}
