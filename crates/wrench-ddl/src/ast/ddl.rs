//! DDL statement variants and their canonical SQL rendering.

use std::fmt;

use super::{ColumnType, Expr, Ident, Lit, Path};

/// Writes `items` separated by `", "`.
fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// A single DDL statement.
///
/// This is a closed enumeration: every planner stage matches
/// exhaustively, so adding a statement kind is a compile-time event.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    CreateSearchIndex(CreateSearchIndex),
    CreateView(CreateView),
    CreateChangeStream(CreateChangeStream),
    CreateRole(CreateRole),
    Grant(Grant),
    Revoke(Revoke),
    AlterTable(AlterTable),
    AlterDatabase(AlterDatabase),
    AlterChangeStream(AlterChangeStream),
    AlterIndex(AlterIndex),
    DropTable(DropTable),
    DropIndex(DropIndex),
    DropSearchIndex(DropSearchIndex),
    DropView(DropView),
    DropRole(DropRole),
    DropChangeStream(DropChangeStream),
    /// `CREATE SEQUENCE ...`, captured loosely (raw text).
    CreateSequence(RawStatement),
    /// `CREATE MODEL ...`, captured loosely (raw text).
    CreateModel(RawStatement),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(s) => write!(f, "{s}"),
            Self::CreateIndex(s) => write!(f, "{s}"),
            Self::CreateSearchIndex(s) => write!(f, "{s}"),
            Self::CreateView(s) => write!(f, "{s}"),
            Self::CreateChangeStream(s) => write!(f, "{s}"),
            Self::CreateRole(s) => write!(f, "{s}"),
            Self::Grant(s) => write!(f, "{s}"),
            Self::Revoke(s) => write!(f, "{s}"),
            Self::AlterTable(s) => write!(f, "{s}"),
            Self::AlterDatabase(s) => write!(f, "{s}"),
            Self::AlterChangeStream(s) => write!(f, "{s}"),
            Self::AlterIndex(s) => write!(f, "{s}"),
            Self::DropTable(s) => write!(f, "{s}"),
            Self::DropIndex(s) => write!(f, "{s}"),
            Self::DropSearchIndex(s) => write!(f, "{s}"),
            Self::DropView(s) => write!(f, "{s}"),
            Self::DropRole(s) => write!(f, "{s}"),
            Self::DropChangeStream(s) => write!(f, "{s}"),
            Self::CreateSequence(s) | Self::CreateModel(s) => write!(f, "{s}"),
        }
    }
}

/// A statement kept as raw text (sequences and models are only ever
/// filtered out or rejected, never planned).
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatement {
    pub name: Path,
    pub text: String,
}

impl fmt::Display for RawStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim())
    }
}

/// One primary-key or index-key part: column plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub column: Ident,
    /// Descending order. `ASC` and an omitted direction both parse to
    /// `false`, which is what makes them compare equal.
    pub desc: bool,
}

impl KeyPart {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: Ident::new(column),
            desc: false,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column)?;
        if self.desc {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

/// `ON DELETE` action of an interleave or foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAction => f.write_str("ON DELETE NO ACTION"),
            Self::Cascade => f.write_str("ON DELETE CASCADE"),
        }
    }
}

/// `INTERLEAVE IN PARENT` clause of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Interleave {
    pub parent: Path,
    pub on_delete: Option<OnDelete>,
}

impl fmt::Display for Interleave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INTERLEAVE IN PARENT {}", self.parent)?;
        if let Some(action) = self.on_delete {
            write!(f, " {action}")?;
        }
        Ok(())
    }
}

/// `ROW DELETION POLICY (OLDER_THAN(col, INTERVAL n DAY))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDeletionPolicy {
    pub column: Ident,
    pub num_days: i64,
}

impl fmt::Display for RowDeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ROW DELETION POLICY (OLDER_THAN({}, INTERVAL {} DAY))",
            self.column, self.num_days
        )
    }
}

/// Column options. `allow_commit_timestamp` is the only option the
/// database currently accepts on columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnOptions {
    pub allow_commit_timestamp: Option<bool>,
}

impl ColumnOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allow_commit_timestamp.is_none()
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub ty: ColumnType,
    pub not_null: bool,
    pub default: Option<Expr>,
    /// `AS (expr) STORED` generation expression.
    pub generated: Option<Expr>,
    pub hidden: bool,
    pub options: ColumnOptions,
}

impl ColumnDef {
    /// A plain nullable column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: Ident::new(name),
            ty,
            not_null: false,
            default: None,
            generated: None,
            hidden: false,
            options: ColumnOptions::default(),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)?;
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT ({default})")?;
        }
        if let Some(generated) = &self.generated {
            write!(f, " AS ({generated}) STORED")?;
        }
        if self.hidden {
            f.write_str(" HIDDEN")?;
        }
        if let Some(allow) = self.options.allow_commit_timestamp {
            write!(f, " OPTIONS (allow_commit_timestamp = {allow})")?;
        }
        Ok(())
    }
}

/// A foreign-key constraint body.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub columns: Vec<Ident>,
    pub ref_table: Path,
    pub ref_columns: Vec<Ident>,
    pub on_delete: Option<OnDelete>,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FOREIGN KEY (")?;
        comma_list(f, &self.columns)?;
        write!(f, ") REFERENCES {} (", self.ref_table)?;
        comma_list(f, &self.ref_columns)?;
        f.write_str(")")?;
        if let Some(action) = self.on_delete {
            write!(f, " {action}")?;
        }
        Ok(())
    }
}

/// A check-constraint body.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub expr: Expr,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CHECK ({})", self.expr)
    }
}

/// A constraint body.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    ForeignKey(ForeignKey),
    Check(Check),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignKey(fk) => write!(f, "{fk}"),
            Self::Check(check) => write!(f, "{check}"),
        }
    }
}

/// A possibly named table constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub constraint: Constraint,
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "CONSTRAINT {name} ")?;
        }
        write!(f, "{}", self.constraint)
    }
}

/// `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: Path,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub primary_key: Vec<KeyPart>,
    pub interleave: Option<Interleave>,
    pub row_deletion_policy: Option<RowDeletionPolicy>,
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE {} (", self.name)?;
        let mut first = true;
        for col in &self.columns {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{col}")?;
        }
        for constraint in &self.constraints {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{constraint}")?;
        }
        f.write_str(") PRIMARY KEY (")?;
        comma_list(f, &self.primary_key)?;
        f.write_str(")")?;
        if let Some(interleave) = &self.interleave {
            write!(f, ", {interleave}")?;
        }
        if let Some(policy) = &self.row_deletion_policy {
            write!(f, ", {policy}")?;
        }
        Ok(())
    }
}

/// `CREATE INDEX`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: Path,
    pub table: Path,
    pub unique: bool,
    pub null_filtered: bool,
    pub keys: Vec<KeyPart>,
    pub storing: Vec<Ident>,
    pub interleave: Option<Path>,
}

impl fmt::Display for CreateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE ")?;
        if self.unique {
            f.write_str("UNIQUE ")?;
        }
        if self.null_filtered {
            f.write_str("NULL_FILTERED ")?;
        }
        write!(f, "INDEX {} ON {} (", self.name, self.table)?;
        comma_list(f, &self.keys)?;
        f.write_str(")")?;
        if !self.storing.is_empty() {
            f.write_str(" STORING (")?;
            comma_list(f, &self.storing)?;
            f.write_str(")")?;
        }
        if let Some(parent) = &self.interleave {
            write!(f, ", INTERLEAVE IN {parent}")?;
        }
        Ok(())
    }
}

/// `CREATE SEARCH INDEX`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSearchIndex {
    pub name: Path,
    pub table: Path,
    /// The TOKENLIST columns being indexed.
    pub token_columns: Vec<Ident>,
    pub storing: Vec<Ident>,
    pub partition_by: Vec<Ident>,
    pub order_by: Vec<KeyPart>,
    pub interleave: Option<Path>,
    pub options: StreamOptions,
}

impl fmt::Display for CreateSearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE SEARCH INDEX {} ON {} (", self.name, self.table)?;
        comma_list(f, &self.token_columns)?;
        f.write_str(")")?;
        if !self.storing.is_empty() {
            f.write_str(" STORING (")?;
            comma_list(f, &self.storing)?;
            f.write_str(")")?;
        }
        if !self.partition_by.is_empty() {
            f.write_str(" PARTITION BY ")?;
            comma_list(f, &self.partition_by)?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            comma_list(f, &self.order_by)?;
        }
        if let Some(parent) = &self.interleave {
            write!(f, ", INTERLEAVE IN {parent}")?;
        }
        if !self.options.is_empty() {
            write!(f, " {}", self.options)?;
        }
        Ok(())
    }
}

/// `CREATE [OR REPLACE] VIEW`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub name: Path,
    pub or_replace: bool,
    pub security: SqlSecurity,
    /// The query body, kept as raw text.
    pub query: String,
}

/// `SQL SECURITY` mode of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlSecurity {
    Invoker,
    Definer,
}

impl fmt::Display for CreateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE ")?;
        if self.or_replace {
            f.write_str("OR REPLACE ")?;
        }
        let security = match self.security {
            SqlSecurity::Invoker => "INVOKER",
            SqlSecurity::Definer => "DEFINER",
        };
        write!(
            f,
            "VIEW {} SQL SECURITY {} AS {}",
            self.name,
            security,
            self.query.trim()
        )
    }
}

/// What a change stream watches.
#[derive(Debug, Clone, PartialEq)]
pub enum Watch {
    /// No `FOR` clause.
    None,
    /// `FOR ALL`.
    AllTables,
    /// `FOR t1(col, ...), t2, ...`.
    Tables(Vec<WatchDef>),
}

impl Watch {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The watched table list, if this is a table watch.
    #[must_use]
    pub fn tables(&self) -> &[WatchDef] {
        match self {
            Self::Tables(defs) => defs,
            _ => &[],
        }
    }
}

/// One watched table, optionally restricted to a column list.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchDef {
    pub table: Path,
    /// `None` watches all columns.
    pub columns: Option<Vec<Ident>>,
}

impl fmt::Display for WatchDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(columns) = &self.columns {
            f.write_str("(")?;
            comma_list(f, columns)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A generic `OPTIONS (name = value, ...)` list, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamOptions(pub Vec<(Ident, Expr)>);

impl StreamOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks an option up by (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Expr> {
        let key = Ident::new(name);
        self.0.iter().find(|(n, _)| *n == key).map(|(_, v)| v)
    }

    /// Sets or replaces an option.
    pub fn set(&mut self, name: impl Into<String>, value: Expr) {
        let key = Ident::new(name);
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| *n == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }
}

impl fmt::Display for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OPTIONS (")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            // Option values conventionally render lower-case.
            match value {
                Expr::Lit(Lit::Bool(b)) => write!(f, "{name} = {b}")?,
                Expr::Lit(Lit::Null) => write!(f, "{name} = null")?,
                _ => write!(f, "{name} = {value}")?,
            }
        }
        f.write_str(")")
    }
}

/// `CREATE CHANGE STREAM`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateChangeStream {
    pub name: Path,
    pub watch: Watch,
    pub options: StreamOptions,
}

impl fmt::Display for CreateChangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE CHANGE STREAM {}", self.name)?;
        match &self.watch {
            Watch::None => {}
            Watch::AllTables => f.write_str(" FOR ALL")?,
            Watch::Tables(defs) => {
                f.write_str(" FOR ")?;
                comma_list(f, defs)?;
            }
        }
        if !self.options.is_empty() {
            write!(f, " {}", self.options)?;
        }
        Ok(())
    }
}

/// `ALTER CHANGE STREAM` alterations.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamAlteration {
    /// `SET FOR ALL` / `SET FOR t1, t2`.
    SetWatch(Watch),
    /// `DROP FOR ALL`.
    DropForAll,
    /// `SET OPTIONS (...)`.
    SetOptions(StreamOptions),
}

/// `ALTER CHANGE STREAM`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterChangeStream {
    pub name: Path,
    pub alteration: StreamAlteration,
}

impl fmt::Display for AlterChangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER CHANGE STREAM {} ", self.name)?;
        match &self.alteration {
            StreamAlteration::SetWatch(Watch::AllTables) => f.write_str("SET FOR ALL"),
            StreamAlteration::SetWatch(Watch::Tables(defs)) => {
                f.write_str("SET FOR ")?;
                comma_list(f, defs)
            }
            // A watch cannot be set to nothing; the planner never builds this.
            StreamAlteration::SetWatch(Watch::None) => f.write_str("DROP FOR ALL"),
            StreamAlteration::DropForAll => f.write_str("DROP FOR ALL"),
            StreamAlteration::SetOptions(options) => write!(f, "SET {options}"),
        }
    }
}

/// `CREATE ROLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRole {
    pub name: Ident,
}

impl fmt::Display for CreateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ROLE {}", self.name)
    }
}

/// A table privilege, optionally column-scoped (`SELECT(a, b)`).
#[derive(Debug, Clone, PartialEq)]
pub struct TablePrivilege {
    pub kind: PrivilegeKind,
    pub columns: Vec<Ident>,
}

/// A privilege keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for TablePrivilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PrivilegeKind::Select => "SELECT",
            PrivilegeKind::Insert => "INSERT",
            PrivilegeKind::Update => "UPDATE",
            PrivilegeKind::Delete => "DELETE",
        };
        f.write_str(kind)?;
        if !self.columns.is_empty() {
            f.write_str("(")?;
            comma_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// What a grant attaches privileges to.
#[derive(Debug, Clone, PartialEq)]
pub enum GrantTarget {
    /// `... ON TABLE t1, t2` with per-privilege column scoping.
    Table {
        privileges: Vec<TablePrivilege>,
        names: Vec<Path>,
    },
    /// `SELECT ON VIEW v1, v2`.
    View { names: Vec<Path> },
    /// `SELECT ON CHANGE STREAM cs1, cs2`.
    ChangeStream { names: Vec<Path> },
    /// `EXECUTE ON TABLE FUNCTION f1, f2`.
    TableFunction { names: Vec<Path> },
    /// `ROLE a, b` (role membership).
    Role { names: Vec<Ident> },
}

impl GrantTarget {
    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { privileges, names } => {
                comma_list(f, privileges)?;
                f.write_str(" ON TABLE ")?;
                comma_list(f, names)
            }
            Self::View { names } => {
                f.write_str("SELECT ON VIEW ")?;
                comma_list(f, names)
            }
            Self::ChangeStream { names } => {
                f.write_str("SELECT ON CHANGE STREAM ")?;
                comma_list(f, names)
            }
            Self::TableFunction { names } => {
                f.write_str("EXECUTE ON TABLE FUNCTION ")?;
                comma_list(f, names)
            }
            Self::Role { names } => {
                f.write_str("ROLE ")?;
                comma_list(f, names)
            }
        }
    }
}

/// `GRANT ... TO ROLE r1, r2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub target: GrantTarget,
    pub roles: Vec<Ident>,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GRANT ")?;
        self.target.fmt_body(f)?;
        f.write_str(" TO ROLE ")?;
        comma_list(f, &self.roles)
    }
}

/// `REVOKE ... FROM ROLE r1, r2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Revoke {
    pub target: GrantTarget,
    pub roles: Vec<Ident>,
}

impl fmt::Display for Revoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("REVOKE ")?;
        self.target.fmt_body(f)?;
        f.write_str(" FROM ROLE ")?;
        comma_list(f, &self.roles)
    }
}

/// `ALTER TABLE` alterations the database accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAlteration {
    AddColumn(ColumnDef),
    DropColumn(Ident),
    AddConstraint(TableConstraint),
    DropConstraint(Ident),
    AddRowDeletionPolicy(RowDeletionPolicy),
    ReplaceRowDeletionPolicy(RowDeletionPolicy),
    DropRowDeletionPolicy,
}

/// `ALTER TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: Path,
    pub alteration: TableAlteration,
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} ", self.table)?;
        match &self.alteration {
            TableAlteration::AddColumn(def) => write!(f, "ADD COLUMN {def}"),
            TableAlteration::DropColumn(name) => write!(f, "DROP COLUMN {name}"),
            TableAlteration::AddConstraint(constraint) => write!(f, "ADD {constraint}"),
            TableAlteration::DropConstraint(name) => write!(f, "DROP CONSTRAINT {name}"),
            TableAlteration::AddRowDeletionPolicy(policy) => write!(f, "ADD {policy}"),
            TableAlteration::ReplaceRowDeletionPolicy(policy) => write!(f, "REPLACE {policy}"),
            TableAlteration::DropRowDeletionPolicy => f.write_str("DROP ROW DELETION POLICY"),
        }
    }
}

/// `ALTER INDEX` alterations (STORING column maintenance).
#[derive(Debug, Clone, PartialEq)]
pub enum IndexAlteration {
    AddStoredColumn(Ident),
    DropStoredColumn(Ident),
}

/// `ALTER INDEX`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterIndex {
    pub name: Path,
    pub alteration: IndexAlteration,
}

impl fmt::Display for AlterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER INDEX {} ", self.name)?;
        match &self.alteration {
            IndexAlteration::AddStoredColumn(name) => write!(f, "ADD STORED COLUMN {name}"),
            IndexAlteration::DropStoredColumn(name) => write!(f, "DROP STORED COLUMN {name}"),
        }
    }
}

/// Known database-level options. The outer `Option` records whether the
/// statement mentions the option at all; the inner one distinguishes an
/// explicit `null` from a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseOptions {
    pub optimizer_version: Option<Option<i64>>,
    pub version_retention_period: Option<Option<String>>,
    pub enable_key_visualizer: Option<Option<bool>>,
    pub default_leader: Option<Option<String>>,
}

impl DatabaseOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.optimizer_version.is_none()
            && self.version_retention_period.is_none()
            && self.enable_key_visualizer.is_none()
            && self.default_leader.is_none()
    }
}

impl fmt::Display for DatabaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut item = |f: &mut fmt::Formatter<'_>, name: &str, value: String| -> fmt::Result {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name} = {value}")
        };
        if let Some(v) = &self.optimizer_version {
            let rendered = v.map_or_else(|| String::from("null"), |n| n.to_string());
            item(f, "optimizer_version", rendered)?;
        }
        if let Some(v) = &self.version_retention_period {
            let rendered = v
                .as_ref()
                .map_or_else(|| String::from("null"), |s| format!("\"{}\"", escape_opt(s)));
            item(f, "version_retention_period", rendered)?;
        }
        if let Some(v) = &self.enable_key_visualizer {
            let rendered = v.map_or_else(|| String::from("null"), |b| b.to_string());
            item(f, "enable_key_visualizer", rendered)?;
        }
        if let Some(v) = &self.default_leader {
            let rendered = v
                .as_ref()
                .map_or_else(|| String::from("null"), |s| format!("\"{}\"", escape_opt(s)));
            item(f, "default_leader", rendered)?;
        }
        Ok(())
    }
}

fn escape_opt(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `ALTER DATABASE ... SET OPTIONS (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterDatabase {
    pub name: Ident,
    pub options: DatabaseOptions,
}

impl fmt::Display for AlterDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALTER DATABASE {} SET OPTIONS ({})",
            self.name, self.options
        )
    }
}

macro_rules! drop_statement {
    ($(#[$doc:meta])* $name:ident, $sql:literal, $field:ident: $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub $field: $ty,
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($sql, " {}"), self.$field)
            }
        }
    };
}

drop_statement!(
    /// `DROP TABLE`.
    DropTable, "DROP TABLE", name: Path);
drop_statement!(
    /// `DROP INDEX`.
    DropIndex, "DROP INDEX", name: Path);
drop_statement!(
    /// `DROP SEARCH INDEX`.
    DropSearchIndex, "DROP SEARCH INDEX", name: Path);
drop_statement!(
    /// `DROP VIEW`.
    DropView, "DROP VIEW", name: Path);
drop_statement!(
    /// `DROP ROLE`.
    DropRole, "DROP ROLE", name: Ident);
drop_statement!(
    /// `DROP CHANGE STREAM`.
    DropChangeStream, "DROP CHANGE STREAM", name: Path);
