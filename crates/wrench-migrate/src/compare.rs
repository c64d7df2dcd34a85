//! Structural comparators with semantic normalization.
//!
//! The AST already ignores source positions and compares identifiers
//! case-insensitively; these functions add the normalizations that sit
//! above plain structure: implicit `ASC`, implicit `ON DELETE NO
//! ACTION`, timestamp literals compared as instants, index equality
//! with and without `STORING`.

use chrono::{DateTime, FixedOffset};
use wrench_ddl::ast::{
    ColumnDef, CreateIndex, CreateSearchIndex, CreateView, Expr, Grant, Interleave, Lit, OnDelete,
    StreamOptions, TableConstraint,
};

/// Full structural column equality, used to decide "no change".
#[must_use]
pub fn column_def_eq(a: &ColumnDef, b: &ColumnDef) -> bool {
    a.name == b.name
        && a.ty == b.ty
        && a.not_null == b.not_null
        && a.hidden == b.hidden
        && a.options == b.options
        && a.generated == b.generated
        && default_eq(a.default.as_ref(), b.default.as_ref())
}

/// Column equality with the hidden flag masked out; a column that
/// differs only here takes a single in-place `ALTER COLUMN`.
#[must_use]
pub fn column_def_eq_ignoring_hidden(a: &ColumnDef, b: &ColumnDef) -> bool {
    let mut b = b.clone();
    b.hidden = a.hidden;
    column_def_eq(a, &b)
}

/// Base-type-and-arrayness equality, used to decide "can be altered in
/// place". `STRING(36)` and `STRING(50)` are equal here.
#[must_use]
pub fn column_type_eq(a: &ColumnDef, b: &ColumnDef) -> bool {
    a.ty.array == b.ty.array && a.ty.base.same_kind(&b.ty.base)
}

/// Default-expression equality. Timestamp literals compare as instants
/// (their canonical rendering, not their lexical input).
#[must_use]
pub fn default_eq(a: Option<&Expr>, b: Option<&Expr>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Expr::Lit(Lit::Timestamp(a))), Some(Expr::Lit(Lit::Timestamp(b)))) => {
            timestamp_eq(a, b)
        }
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%z"))
        .ok()
}

fn timestamp_eq(a: &str, b: &str) -> bool {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.eq_ignore_ascii_case(b),
    }
}

/// Constraint equality with `ON DELETE NO ACTION` treated as the
/// default for foreign keys.
#[must_use]
pub fn constraint_eq(a: &TableConstraint, b: &TableConstraint) -> bool {
    normalize_constraint(a) == normalize_constraint(b)
}

fn normalize_constraint(c: &TableConstraint) -> TableConstraint {
    let mut c = c.clone();
    if let wrench_ddl::ast::Constraint::ForeignKey(fk) = &mut c.constraint {
        fk.on_delete = Some(fk.on_delete.unwrap_or(OnDelete::NoAction));
    }
    c
}

/// Interleave equality with the same `ON DELETE` normalization.
#[must_use]
pub fn interleave_eq(a: Option<&Interleave>, b: Option<&Interleave>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.parent == b.parent
                && a.on_delete.unwrap_or(OnDelete::NoAction)
                    == b.on_delete.unwrap_or(OnDelete::NoAction)
        }
        _ => false,
    }
}

/// Strict index equality (everything, including `STORING`).
#[must_use]
pub fn index_eq(a: &CreateIndex, b: &CreateIndex) -> bool {
    a == b
}

/// Index equality ignoring the `STORING` column list: "is this still
/// the same index, apart from what it stores?". A difference only in
/// `STORING` is reconcilable via `ALTER INDEX`; anything else is a
/// rebuild.
#[must_use]
pub fn index_eq_ignoring_storing(a: &CreateIndex, b: &CreateIndex) -> bool {
    let mut b = b.clone();
    b.storing = a.storing.clone();
    *a == b
}

/// Search indexes have no `ALTER`, so only strict equality exists.
#[must_use]
pub fn search_index_eq(a: &CreateSearchIndex, b: &CreateSearchIndex) -> bool {
    a == b
}

/// Option-list equality, order-insensitive by option name.
#[must_use]
pub fn stream_options_eq(a: &StreamOptions, b: &StreamOptions) -> bool {
    if a.0.len() != b.0.len() {
        return false;
    }
    a.0.iter()
        .all(|(name, value)| b.get(name.as_str()) == Some(value))
}

/// View equality: name, security mode and query text. `OR REPLACE` in
/// the source text is not significant.
#[must_use]
pub fn view_eq(a: &CreateView, b: &CreateView) -> bool {
    a.name == b.name && a.security == b.security && a.query == b.query
}

/// Grant equality is fully structural; resource and role list order is
/// significant, matching the database's grant identity.
#[must_use]
pub fn grant_eq(a: &Grant, b: &Grant) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrench_ddl::ast::Statement;
    use wrench_ddl::parse_ddl;

    fn table_from(sql: &str) -> wrench_ddl::ast::CreateTable {
        match parse_ddl(sql).unwrap().remove(0) {
            Statement::CreateTable(t) => t,
            other => panic!("expected a table, got {other}"),
        }
    }

    fn index_from(sql: &str) -> CreateIndex {
        match parse_ddl(sql).unwrap().remove(0) {
            Statement::CreateIndex(i) => i,
            other => panic!("expected an index, got {other}"),
        }
    }

    #[test]
    fn test_column_def_eq_ignores_case() {
        let a = table_from("CREATE TABLE t (Col STRING(36) NOT NULL) PRIMARY KEY(Col)");
        let b = table_from("CREATE TABLE t (col STRING(36) NOT NULL) PRIMARY KEY(col)");
        assert!(column_def_eq(&a.columns[0], &b.columns[0]));
    }

    #[test]
    fn test_column_def_eq_sees_length() {
        let a = table_from("CREATE TABLE t (c STRING(36)) PRIMARY KEY(c)");
        let b = table_from("CREATE TABLE t (c STRING(50)) PRIMARY KEY(c)");
        assert!(!column_def_eq(&a.columns[0], &b.columns[0]));
        assert!(column_type_eq(&a.columns[0], &b.columns[0]));
    }

    #[test]
    fn test_column_type_eq_sees_arrayness_and_base() {
        let a = table_from("CREATE TABLE t (c INT64) PRIMARY KEY(c)");
        let b = table_from("CREATE TABLE t (c ARRAY<INT64>) PRIMARY KEY(c)");
        let c = table_from("CREATE TABLE t (c STRING(36)) PRIMARY KEY(c)");
        assert!(!column_type_eq(&a.columns[0], &b.columns[0]));
        assert!(!column_type_eq(&a.columns[0], &c.columns[0]));
    }

    #[test]
    fn test_timestamp_default_eq_by_instant() {
        let a = table_from(
            "CREATE TABLE t (c TIMESTAMP DEFAULT (TIMESTAMP '2024-01-01T00:00:00Z')) PRIMARY KEY(c)",
        );
        let b = table_from(
            "CREATE TABLE t (c TIMESTAMP DEFAULT (TIMESTAMP '2024-01-01T02:00:00+02:00')) PRIMARY KEY(c)",
        );
        assert!(column_def_eq(&a.columns[0], &b.columns[0]));
    }

    #[test]
    fn test_hidden_only_difference() {
        let a = table_from("CREATE TABLE t (c INT64) PRIMARY KEY(c)");
        let b = table_from("CREATE TABLE t (c INT64 HIDDEN) PRIMARY KEY(c)");
        assert!(!column_def_eq(&a.columns[0], &b.columns[0]));
        assert!(column_def_eq_ignoring_hidden(&a.columns[0], &b.columns[0]));
    }

    #[test]
    fn test_constraint_eq_normalizes_on_delete() {
        let a = table_from(
            "CREATE TABLE t (a INT64, CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (b)) PRIMARY KEY(a)",
        );
        let b = table_from(
            "CREATE TABLE t (a INT64, CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (b) ON DELETE NO ACTION) PRIMARY KEY(a)",
        );
        let c = table_from(
            "CREATE TABLE t (a INT64, CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (b) ON DELETE CASCADE) PRIMARY KEY(a)",
        );
        assert!(constraint_eq(&a.constraints[0], &b.constraints[0]));
        assert!(!constraint_eq(&a.constraints[0], &c.constraints[0]));
    }

    #[test]
    fn test_index_eq_key_direction_default() {
        let a = index_from("CREATE INDEX i ON t (a ASC)");
        let b = index_from("CREATE INDEX i ON t (a)");
        let c = index_from("CREATE INDEX i ON t (a DESC)");
        assert!(index_eq(&a, &b));
        assert!(!index_eq(&a, &c));
    }

    #[test]
    fn test_index_eq_ignoring_storing() {
        let a = index_from("CREATE INDEX i ON t (a) STORING (b)");
        let b = index_from("CREATE INDEX i ON t (a) STORING (b, c)");
        let c = index_from("CREATE UNIQUE INDEX i ON t (a) STORING (b)");
        assert!(!index_eq(&a, &b));
        assert!(index_eq_ignoring_storing(&a, &b));
        assert!(!index_eq_ignoring_storing(&a, &c));
    }

    #[test]
    fn test_stream_options_eq_order_insensitive() {
        let opts = |sql: &str| match parse_ddl(sql).unwrap().remove(0) {
            Statement::CreateChangeStream(cs) => cs.options,
            other => panic!("expected a change stream, got {other}"),
        };
        let a = opts("CREATE CHANGE STREAM c FOR ALL OPTIONS (retention_period = '1d', value_capture_type = 'NEW_ROW')");
        let b = opts("CREATE CHANGE STREAM c FOR ALL OPTIONS (value_capture_type = 'NEW_ROW', retention_period = '1d')");
        let c = opts("CREATE CHANGE STREAM c FOR ALL OPTIONS (retention_period = '7d', value_capture_type = 'NEW_ROW')");
        assert!(stream_options_eq(&a, &b));
        assert!(!stream_options_eq(&a, &c));
    }

    #[test]
    fn test_interleave_eq() {
        let a = table_from("CREATE TABLE c (a INT64, b INT64) PRIMARY KEY(a, b), INTERLEAVE IN PARENT p");
        let b = table_from(
            "CREATE TABLE c (a INT64, b INT64) PRIMARY KEY(a, b), INTERLEAVE IN PARENT p ON DELETE NO ACTION",
        );
        let c = table_from(
            "CREATE TABLE c (a INT64, b INT64) PRIMARY KEY(a, b), INTERLEAVE IN PARENT p ON DELETE CASCADE",
        );
        assert!(interleave_eq(a.interleave.as_ref(), b.interleave.as_ref()));
        assert!(!interleave_eq(a.interleave.as_ref(), c.interleave.as_ref()));
        assert!(!interleave_eq(a.interleave.as_ref(), None));
    }
}
