//! Typed schema model built from a flat statement sequence.
//!
//! One pass folds statements into a [`Database`]: tables register
//! themselves, indexes and change streams attach to their owner table,
//! everything else lands in a schema-level collection. A second pass
//! links interleaved children to their parents.

use wrench_ddl::ast::{
    AlterDatabase, CreateChangeStream, CreateIndex, CreateRole, CreateSearchIndex, CreateTable,
    CreateView, Grant, Path, Statement, TableAlteration, TableConstraint, Watch,
};

use crate::ddl::Ddl;
use crate::error::{Error, Result};

/// A change stream definition plus watch-kind helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeStream {
    pub create: CreateChangeStream,
}

impl ChangeStream {
    /// True when the stream has no `FOR` clause.
    #[must_use]
    pub fn watch_none(&self) -> bool {
        matches!(self.create.watch, Watch::None)
    }

    /// True when the stream watches an explicit table list.
    #[must_use]
    pub fn watch_tables(&self) -> bool {
        matches!(self.create.watch, Watch::Tables(_))
    }

    /// True when the stream watches all tables.
    #[must_use]
    pub fn watch_all(&self) -> bool {
        matches!(self.create.watch, Watch::AllTables)
    }
}

/// A table with its attached secondary objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub create: CreateTable,
    pub indexes: Vec<CreateIndex>,
    pub search_indexes: Vec<CreateSearchIndex>,
    /// Change streams whose `FOR` list names this table.
    pub change_streams: Vec<ChangeStream>,
    /// Names of tables interleaved directly under this one.
    pub children: Vec<Path>,
}

impl Table {
    fn new(create: CreateTable) -> Self {
        Self {
            create,
            indexes: Vec::new(),
            search_indexes: Vec::new(),
            change_streams: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The table's name.
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.create.name
    }

    /// All constraints, as written plus those added via `ALTER TABLE`.
    #[must_use]
    pub fn constraints(&self) -> &[TableConstraint] {
        &self.create.constraints
    }
}

/// A complete schema: tables plus schema-level objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    pub tables: Vec<Table>,
    /// Change streams not attached to any table.
    pub change_streams: Vec<ChangeStream>,
    pub views: Vec<CreateView>,
    pub roles: Vec<CreateRole>,
    pub grants: Vec<Grant>,
    pub alter_database: Option<AlterDatabase>,
}

impl Database {
    /// Folds a filtered statement list into a schema.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTable`] when an index or search index names an
    ///   unknown table;
    /// - [`Error::MissingParent`] when an interleave parent is not
    ///   defined;
    /// - [`Error::UnsupportedStatement`] for alterations other than
    ///   `ADD CONSTRAINT` and for statement kinds the planner has no
    ///   semantics for (sequences, models, drops).
    pub fn new(ddl: &Ddl) -> Result<Self> {
        let mut db = Self::default();

        for stmt in &ddl.list {
            match stmt {
                Statement::CreateTable(create) => {
                    db.tables.push(Table::new(create.clone()));
                }
                Statement::CreateIndex(index) => {
                    let name = index.name.to_string();
                    let table = index.table.clone();
                    db.table_mut(&table).ok_or(Error::MissingTable {
                        kind: "index",
                        name,
                        table: table.to_string(),
                    })?
                    .indexes
                    .push(index.clone());
                }
                Statement::CreateSearchIndex(index) => {
                    let name = index.name.to_string();
                    let table = index.table.clone();
                    db.table_mut(&table).ok_or(Error::MissingTable {
                        kind: "search index",
                        name,
                        table: table.to_string(),
                    })?
                    .search_indexes
                    .push(index.clone());
                }
                Statement::AlterTable(alter) => {
                    let table = db.table_mut(&alter.table).ok_or_else(|| {
                        Error::UnsupportedStatement(format!(
                            "ALTER TABLE of unknown table {}",
                            alter.table
                        ))
                    })?;
                    match &alter.alteration {
                        TableAlteration::AddConstraint(constraint) => {
                            table.create.constraints.push(constraint.clone());
                        }
                        _ => {
                            return Err(Error::UnsupportedStatement(format!(
                                "table alteration: {alter}"
                            )));
                        }
                    }
                }
                Statement::AlterDatabase(alter) => {
                    db.alter_database = Some(alter.clone());
                }
                Statement::CreateChangeStream(create) => {
                    let stream = ChangeStream {
                        create: create.clone(),
                    };
                    let watched = create.watch.tables();
                    let all_known = !watched.is_empty()
                        && watched.iter().all(|w| db.table(&w.table).is_some());
                    if all_known {
                        for watch in watched.to_vec() {
                            if let Some(table) = db.table_mut(&watch.table) {
                                table.change_streams.push(stream.clone());
                            }
                        }
                    } else {
                        db.change_streams.push(stream);
                    }
                }
                Statement::CreateView(view) => db.views.push(view.clone()),
                Statement::CreateRole(role) => db.roles.push(role.clone()),
                Statement::Grant(grant) => db.grants.push(grant.clone()),
                other => {
                    return Err(Error::UnsupportedStatement(other.to_string()));
                }
            }
        }

        db.link_children()?;
        Ok(db)
    }

    fn link_children(&mut self) -> Result<()> {
        let links: Vec<(Path, Path)> = self
            .tables
            .iter()
            .filter_map(|t| {
                t.create
                    .interleave
                    .as_ref()
                    .map(|i| (i.parent.clone(), t.name().clone()))
            })
            .collect();
        for (parent, child) in links {
            let Some(parent_table) = self.table_mut(&parent) else {
                return Err(Error::MissingParent {
                    parent: parent.to_string(),
                    table: child.to_string(),
                });
            };
            parent_table.children.push(child);
        }
        Ok(())
    }

    /// Looks a table up by name (case-insensitive).
    #[must_use]
    pub fn table(&self, name: &Path) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    fn table_mut(&mut self, name: &Path) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| *t.name() == *name)
    }

    /// Looks a change stream up by name across the schema-level list
    /// and every table's attached list.
    #[must_use]
    pub fn change_stream(&self, name: &Path) -> Option<&ChangeStream> {
        self.change_streams
            .iter()
            .find(|cs| cs.create.name == *name)
            .or_else(|| {
                self.tables
                    .iter()
                    .flat_map(|t| t.change_streams.iter())
                    .find(|cs| cs.create.name == *name)
            })
    }

    /// All change streams in deterministic order: schema-level first,
    /// then per table in table order, deduplicated by name.
    #[must_use]
    pub fn all_change_streams(&self) -> Vec<&ChangeStream> {
        let mut seen: Vec<&Path> = Vec::new();
        let mut streams = Vec::new();
        for cs in self
            .change_streams
            .iter()
            .chain(self.tables.iter().flat_map(|t| t.change_streams.iter()))
        {
            if !seen.contains(&&cs.create.name) {
                seen.push(&cs.create.name);
                streams.push(cs);
            }
        }
        streams
    }

    /// Looks a view up by name.
    #[must_use]
    pub fn view(&self, name: &Path) -> Option<&CreateView> {
        self.views.iter().find(|v| v.name == *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::{parse_ddl, DdlOption};

    fn build(schema: &str) -> Result<Database> {
        Database::new(&parse_ddl("test", schema, &DdlOption::default())?)
    }

    #[test]
    fn test_tables_and_indexes_attach() {
        let db = build(
            "CREATE TABLE t1 (a INT64 NOT NULL, b STRING(36)) PRIMARY KEY(a);
             CREATE INDEX idx_b ON t1(b);
             CREATE TABLE t2 (c INT64) PRIMARY KEY(c);",
        )
        .unwrap();
        assert_eq!(db.tables.len(), 2);
        assert_eq!(db.tables[0].indexes.len(), 1);
        assert!(db.table(&Path::single("T1")).is_some(), "lookup is case-insensitive");
    }

    #[test]
    fn test_index_on_unknown_table() {
        let err = build("CREATE INDEX idx ON missing(a);").unwrap_err();
        assert!(matches!(err, Error::MissingTable { kind: "index", .. }));
    }

    #[test]
    fn test_search_index_attaches() {
        let db = build(
            "CREATE TABLE Docs (
               Id INT64 NOT NULL,
               Body STRING(MAX),
               Tokens TOKENLIST AS (TOKENIZE_FULLTEXT(Body)) STORED HIDDEN,
             ) PRIMARY KEY(Id);
             CREATE SEARCH INDEX DocsIdx ON Docs(Tokens);",
        )
        .unwrap();
        assert_eq!(db.tables[0].search_indexes.len(), 1);
    }

    #[test]
    fn test_add_constraint_appends() {
        let db = build(
            "CREATE TABLE t1 (a INT64) PRIMARY KEY(a);
             CREATE TABLE t2 (a INT64, b INT64) PRIMARY KEY(a);
             ALTER TABLE t2 ADD CONSTRAINT fk FOREIGN KEY (b) REFERENCES t1 (a);",
        )
        .unwrap();
        assert_eq!(db.table(&Path::single("t2")).unwrap().constraints().len(), 1);
    }

    #[test]
    fn test_other_alterations_rejected() {
        let err = build(
            "CREATE TABLE t1 (a INT64) PRIMARY KEY(a);
             ALTER TABLE t1 DROP COLUMN a;",
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedStatement(_)));
    }

    #[test]
    fn test_change_stream_attachment() {
        let db = build(
            "CREATE TABLE t1 (a INT64) PRIMARY KEY(a);
             CREATE TABLE t2 (a INT64) PRIMARY KEY(a);
             CREATE CHANGE STREAM both FOR t1, t2;
             CREATE CHANGE STREAM everything FOR ALL;
             CREATE CHANGE STREAM dangling FOR t3;",
        )
        .unwrap();
        // `both` attaches to each watched table.
        assert_eq!(db.tables[0].change_streams.len(), 1);
        assert_eq!(db.tables[1].change_streams.len(), 1);
        // `everything` and `dangling` are tracked at schema level.
        assert_eq!(db.change_streams.len(), 2);
        assert_eq!(db.all_change_streams().len(), 3);
        assert!(db.change_stream(&Path::single("both")).is_some());
    }

    #[test]
    fn test_interleave_children_linked() {
        let db = build(
            "CREATE TABLE p (a INT64) PRIMARY KEY(a);
             CREATE TABLE c1 (a INT64, b INT64) PRIMARY KEY(a, b), INTERLEAVE IN PARENT p;
             CREATE TABLE c2 (a INT64, b INT64, d INT64) PRIMARY KEY(a, b, d), INTERLEAVE IN PARENT c1;",
        )
        .unwrap();
        assert_eq!(db.table(&Path::single("p")).unwrap().children, vec![Path::single("c1")]);
        assert_eq!(db.table(&Path::single("c1")).unwrap().children, vec![Path::single("c2")]);
    }

    #[test]
    fn test_missing_parent() {
        let err = build(
            "CREATE TABLE c (a INT64, b INT64) PRIMARY KEY(a, b), INTERLEAVE IN PARENT ghost;",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingParent { .. }));
    }

    #[test]
    fn test_unfiltered_sequence_rejected() {
        let err = build("CREATE SEQUENCE s OPTIONS (sequence_kind = 'bit_reversed_positive');")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedStatement(_)));
    }

    #[test]
    fn test_roles_views_grants_collected() {
        let db = build(
            "CREATE TABLE t (a INT64) PRIMARY KEY(a);
             CREATE VIEW v SQL SECURITY INVOKER AS SELECT a FROM t;
             CREATE ROLE analyst;
             GRANT SELECT ON TABLE t TO ROLE analyst;",
        )
        .unwrap();
        assert_eq!(db.views.len(), 1);
        assert_eq!(db.roles.len(), 1);
        assert_eq!(db.grants.len(), 1);
    }
}
