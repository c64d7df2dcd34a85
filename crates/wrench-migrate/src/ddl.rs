//! DDL input filtering and the emitted operation list.
//!
//! Input side: [`parse_ddl`] parses a schema text and drops the
//! statement kinds the caller marked as ignored. Output side:
//! [`Operation`] is one emitted migration statement — either a plain
//! DDL statement from the AST crate, or one of the renderings the AST
//! crate has no statement for (`ALTER COLUMN`, `DROP DEFAULT`, and the
//! sentinel backfill `UPDATE`).

use std::fmt;

use wrench_ddl::ast::{ColumnDef, ColumnType, Expr, Ident, Lit, Path, Statement, TypeBase};
use wrench_ddl::lexer::line_col;

use crate::error::{Error, Result};

/// Statement kinds to drop from both sides of a diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlOption {
    pub ignore_alter_database: bool,
    pub ignore_change_streams: bool,
    pub ignore_models: bool,
    pub ignore_sequences: bool,
}

/// A parsed, filtered schema text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ddl {
    pub list: Vec<Statement>,
}

/// Parses `schema` (statements separated by `;`, `--` comments and
/// empty statements tolerated) and applies the ignore options.
///
/// # Errors
///
/// Returns [`Error::Parse`] with `uri` and the parser's position when
/// the text is rejected.
pub fn parse_ddl(uri: &str, schema: &str, option: &DdlOption) -> Result<Ddl> {
    let statements = wrench_ddl::parse_ddl(schema).map_err(|err| {
        let (line, col) = line_col(schema, err.span.start);
        Error::Parse {
            uri: uri.to_string(),
            message: format!("{} (line {line}, column {col})", err.message),
        }
    })?;

    let list = statements
        .into_iter()
        .filter(|stmt| match stmt {
            Statement::AlterDatabase(_) => !option.ignore_alter_database,
            Statement::CreateChangeStream(_)
            | Statement::AlterChangeStream(_)
            | Statement::DropChangeStream(_) => !option.ignore_change_streams,
            Statement::CreateModel(_) => !option.ignore_models,
            Statement::CreateSequence(_) => !option.ignore_sequences,
            _ => true,
        })
        .collect();
    Ok(Ddl { list })
}

/// `ALTER TABLE ... ALTER COLUMN ...`, which the AST crate has no
/// statement variant for.
///
/// Renders either the column-definition form or, with `set_options`,
/// the `SET OPTIONS (allow_commit_timestamp = ...)` form.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterColumn {
    pub table: Path,
    pub def: ColumnDef,
    pub set_options: bool,
}

impl AlterColumn {
    /// Renders the statement to its SQL text.
    #[must_use]
    pub fn sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AlterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} ALTER COLUMN {}", self.table, self.def.name)?;

        if self.set_options {
            if self.def.options.allow_commit_timestamp == Some(true) {
                f.write_str(" SET OPTIONS (allow_commit_timestamp = true)")?;
            } else {
                f.write_str(" SET OPTIONS (allow_commit_timestamp = null)")?;
            }
            return Ok(());
        }

        write!(f, " {}", self.def.ty)?;
        if self.def.not_null {
            f.write_str(" NOT NULL")?;
        }
        if let Some(default) = &self.def.default {
            write!(f, " DEFAULT ({default})")?;
        }
        if self.def.hidden {
            f.write_str(" HIDDEN")?;
        }
        Ok(())
    }
}

/// `ALTER TABLE ... ALTER COLUMN ... DROP DEFAULT`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropDefault {
    pub table: Path,
    pub column: Ident,
}

impl fmt::Display for DropDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            self.table, self.column
        )
    }
}

/// The sentinel backfill statement run as a partitioned update before a
/// column is made `NOT NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Path,
    pub def: ColumnDef,
}

impl Update {
    /// Renders the statement to its SQL text.
    #[must_use]
    pub fn sql(&self) -> String {
        self.to_string()
    }

    fn fill_value(&self) -> Expr {
        match &self.def.default {
            Some(default) => default.clone(),
            None => sentinel(&self.def.ty),
        }
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {} SET {} = {} WHERE {} IS NULL",
            self.table,
            self.def.name,
            self.fill_value(),
            self.def.name
        )
    }
}

/// The type-keyed sentinel table: a neutral literal of each type, used
/// both as the temporary `DEFAULT` of a defaultless `NOT NULL` add and
/// as the backfill value of the sentinel `UPDATE`.
#[must_use]
pub fn sentinel(ty: &ColumnType) -> Expr {
    if ty.array {
        return Expr::Array(Vec::new());
    }
    let lit = match &ty.base {
        TypeBase::Bool => Lit::Bool(false),
        TypeBase::Int64 => Lit::Integer(0),
        TypeBase::Float32 | TypeBase::Float64 => Lit::Float(0.0),
        TypeBase::Numeric => Lit::Numeric("0".into()),
        TypeBase::Date => Lit::Date("0001-01-01".into()),
        TypeBase::Timestamp => Lit::Timestamp("0001-01-01T00:00:00Z".into()),
        TypeBase::Json => Lit::Json("{}".into()),
        TypeBase::Tokenlist | TypeBase::Bytes(_) => Lit::Bytes(String::new()),
        TypeBase::String(_) | TypeBase::Named(_) => Lit::String(String::new()),
    };
    Expr::Lit(lit)
}

/// One emitted migration statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A statement rendered by the AST crate.
    Stmt(Statement),
    AlterColumn(AlterColumn),
    DropDefault(DropDefault),
    Update(Update),
}

impl Operation {
    /// Renders the operation to its SQL text.
    #[must_use]
    pub fn sql(&self) -> String {
        self.to_string()
    }

    /// Returns true if this operation is a data mutation that must run
    /// as a partitioned update rather than in an admin DDL batch.
    #[must_use]
    pub fn is_partitioned_dml(&self) -> bool {
        matches!(self, Self::Update(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stmt(stmt) => write!(f, "{stmt}"),
            Self::AlterColumn(op) => write!(f, "{op}"),
            Self::DropDefault(op) => write!(f, "{op}"),
            Self::Update(op) => write!(f, "{op}"),
        }
    }
}

impl From<Statement> for Operation {
    fn from(stmt: Statement) -> Self {
        Self::Stmt(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrench_ddl::ast::{ColumnOptions, Length};

    fn string_type(len: u64) -> ColumnType {
        ColumnType::scalar(TypeBase::String(Length::Exact(len)))
    }

    fn column(name: &str, ty: ColumnType) -> ColumnDef {
        ColumnDef::new(name, ty)
    }

    #[test]
    fn test_parse_filters_change_streams() {
        let schema = "CREATE TABLE Users (
            UserID STRING(10) NOT NULL, -- comment
            Name   STRING(10) NOT NULL, -- comment
        ) PRIMARY KEY(UserID);

        CREATE CHANGE STREAM LongerDataRetention
          FOR ALL OPTIONS (
          retention_period = '36h'
        );";

        let everything = parse_ddl("test", schema, &DdlOption::default()).unwrap();
        assert_eq!(everything.list.len(), 2);

        let filtered = parse_ddl(
            "test",
            schema,
            &DdlOption {
                ignore_change_streams: true,
                ..DdlOption::default()
            },
        )
        .unwrap();
        assert_eq!(filtered.list.len(), 1);
        assert!(matches!(filtered.list[0], Statement::CreateTable(_)));
    }

    #[test]
    fn test_parse_filters_alter_database() {
        let schema = "ALTER DATABASE db SET OPTIONS (optimizer_version = 4);";
        let filtered = parse_ddl(
            "test",
            schema,
            &DdlOption {
                ignore_alter_database: true,
                ..DdlOption::default()
            },
        )
        .unwrap();
        assert!(filtered.list.is_empty());
    }

    #[test]
    fn test_parse_filters_sequences_and_models() {
        let schema = "CREATE SEQUENCE s OPTIONS (sequence_kind = 'bit_reversed_positive');
                      CREATE MODEL m INPUT (a INT64) OUTPUT (b INT64) REMOTE;";
        let filtered = parse_ddl(
            "test",
            schema,
            &DdlOption {
                ignore_models: true,
                ignore_sequences: true,
                ..DdlOption::default()
            },
        )
        .unwrap();
        assert!(filtered.list.is_empty());
    }

    #[test]
    fn test_parse_error_carries_uri_and_position() {
        let err = parse_ddl("schema.sql", "CREATE BOGUS", &DdlOption::default()).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("schema.sql"), "got: {rendered}");
        assert!(rendered.contains("line 1"), "got: {rendered}");
    }

    #[test]
    fn test_alter_column_sql() {
        let mut def = column("test_column", ColumnType::scalar(TypeBase::Bool));
        def.not_null = true;
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def,
                set_options: false
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column BOOL NOT NULL"
        );

        let def = column("test_column", string_type(36));
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def,
                set_options: false
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column STRING(36)"
        );

        let mut def = column(
            "test_column",
            ColumnType::array(TypeBase::String(Length::Exact(36))),
        );
        def.not_null = true;
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def,
                set_options: false
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column ARRAY<STRING(36)> NOT NULL"
        );

        let mut def = column("test_column", ColumnType::scalar(TypeBase::Int64));
        def.not_null = true;
        def.default = Some(Expr::Lit(Lit::Integer(1)));
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def,
                set_options: false
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column INT64 NOT NULL DEFAULT (1)"
        );
    }

    #[test]
    fn test_alter_column_set_options_sql() {
        let mut def = column("test_column", ColumnType::scalar(TypeBase::Timestamp));
        def.options = ColumnOptions {
            allow_commit_timestamp: Some(true),
        };
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def: def.clone(),
                set_options: true
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column SET OPTIONS (allow_commit_timestamp = true)"
        );

        def.options.allow_commit_timestamp = Some(false);
        assert_eq!(
            AlterColumn {
                table: Path::single("test_table"),
                def,
                set_options: true
            }
            .sql(),
            "ALTER TABLE test_table ALTER COLUMN test_column SET OPTIONS (allow_commit_timestamp = null)"
        );
    }

    #[test]
    fn test_update_sql_sentinels() {
        let cases: Vec<(ColumnType, &str)> = vec![
            (ColumnType::scalar(TypeBase::Bool), "FALSE"),
            (ColumnType::scalar(TypeBase::Int64), "0"),
            (ColumnType::array(TypeBase::Int64), "[]"),
            (ColumnType::scalar(TypeBase::String(Length::Max)), "\"\""),
            (ColumnType::scalar(TypeBase::Bytes(Length::Max)), "B\"\""),
            (ColumnType::scalar(TypeBase::Tokenlist), "B\"\""),
            (ColumnType::scalar(TypeBase::Date), "DATE \"0001-01-01\""),
            (
                ColumnType::scalar(TypeBase::Timestamp),
                "TIMESTAMP \"0001-01-01T00:00:00Z\"",
            ),
            (ColumnType::scalar(TypeBase::Json), "JSON \"{}\""),
            (ColumnType::scalar(TypeBase::Numeric), "NUMERIC \"0\""),
        ];
        for (ty, want) in cases {
            let update = Update {
                table: Path::single("test_table"),
                def: column("test_column", ty),
            };
            assert_eq!(
                update.sql(),
                format!("UPDATE test_table SET test_column = {want} WHERE test_column IS NULL")
            );
        }
    }

    #[test]
    fn test_update_sql_reserved_identifier() {
        let update = Update {
            table: Path::single("test_table"),
            def: column("order", ColumnType::scalar(TypeBase::Int64)),
        };
        assert_eq!(
            update.sql(),
            "UPDATE test_table SET `order` = 0 WHERE `order` IS NULL"
        );
    }

    #[test]
    fn test_update_sql_prefers_declared_default() {
        let mut def = column("default", ColumnType::scalar(TypeBase::Int64));
        def.default = Some(Expr::Lit(Lit::Integer(1)));
        let update = Update {
            table: Path::single("test_table"),
            def,
        };
        assert_eq!(
            update.sql(),
            "UPDATE test_table SET `default` = 1 WHERE `default` IS NULL"
        );
    }

    #[test]
    fn test_operation_partitioned_dml_split() {
        let update = Operation::Update(Update {
            table: Path::single("t"),
            def: column("c", ColumnType::scalar(TypeBase::Int64)),
        });
        assert!(update.is_partitioned_dml());

        let drop_default = Operation::DropDefault(DropDefault {
            table: Path::single("t"),
            column: Ident::new("c"),
        });
        assert!(!drop_default.is_partitioned_dml());
        assert_eq!(drop_default.sql(), "ALTER TABLE t ALTER COLUMN c DROP DEFAULT");
    }
}
