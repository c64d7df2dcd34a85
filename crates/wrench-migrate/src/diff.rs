//! The diff planner.
//!
//! Walks the source and target schemas in a fixed order and emits the
//! ordered operation list that transforms one into the other:
//!
//! 1. database-options delta;
//! 2. each target table — create, recreate (interleave/primary-key
//!    change, with recursive child drop), or reconcile in place
//!    (indexes, columns, constraints, row-deletion policy);
//! 3. change streams;
//! 4. source tables absent from the target (recursive drop);
//! 5. views; 6. roles; 7. grants.
//!
//! Scratch state (dropped tables/indexes/constraints/streams/grants and
//! watch-list narrowings) is owned by one planner run and lets the
//! cascade rules stay local: every drop records itself, every later
//! step consults the record before emitting.

use std::collections::{HashMap, HashSet};

use wrench_ddl::ast::{
    AlterChangeStream, AlterDatabase, AlterIndex, AlterTable, ColumnDef, Constraint, CreateIndex,
    CreateSearchIndex, DatabaseOptions, DropChangeStream, DropIndex, DropRole, DropSearchIndex,
    DropTable, DropView, Expr, Grant, GrantTarget, Ident, IndexAlteration, Lit, Path, Revoke,
    Statement, StreamAlteration, StreamOptions, TableAlteration, TableConstraint, TypeBase, Watch,
    WatchDef,
};

use crate::compare::{
    column_def_eq, column_def_eq_ignoring_hidden, column_type_eq, constraint_eq, default_eq,
    grant_eq, index_eq_ignoring_storing, interleave_eq, search_index_eq, stream_options_eq,
    view_eq,
};
use crate::ddl::{sentinel, AlterColumn, DropDefault, Operation, Update};
use crate::schema::{ChangeStream, Database, Table};

/// Planner policy knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffConfig {
    /// Compatibility with schemas managed by the legacy tool: when a
    /// change-stream option is removed, substitute the explicit
    /// defaults (`"1d"`, `"OLD_AND_NEW_VALUES"`) instead of `NULL`.
    pub legacy_stream_option_defaults: bool,
}

/// Computes the ordered operation list transforming `from` into `to`.
#[must_use]
pub fn diff(from: &Database, to: &Database) -> Vec<Operation> {
    diff_with_config(from, to, DiffConfig::default())
}

/// [`diff`] with explicit policy.
#[must_use]
pub fn diff_with_config(from: &Database, to: &Database, config: DiffConfig) -> Vec<Operation> {
    Planner {
        from,
        to,
        config,
        ops: Vec::new(),
        dropped_tables: HashSet::new(),
        dropped_indexes: HashSet::new(),
        dropped_streams: HashSet::new(),
        dropped_constraints: Vec::new(),
        dropped_grants: Vec::new(),
        narrowed_streams: HashMap::new(),
        streams_reconciled: false,
    }
    .plan()
}

struct Planner<'a> {
    from: &'a Database,
    to: &'a Database,
    config: DiffConfig,
    ops: Vec<Operation>,

    dropped_tables: HashSet<String>,
    dropped_indexes: HashSet<String>,
    dropped_streams: HashSet<String>,
    dropped_constraints: Vec<TableConstraint>,
    /// Grants whose target resource is being dropped; the drop revokes
    /// them implicitly, so no `REVOKE` is emitted.
    dropped_grants: Vec<Grant>,
    /// Streams already narrowed ahead of a table drop, by canonical
    /// name, with the watch list they were narrowed to.
    narrowed_streams: HashMap<String, Vec<WatchDef>>,
    /// Set once the change-stream pass has run; later table drops then
    /// rely on the pass having repointed surviving streams already.
    streams_reconciled: bool,
}

impl<'a> Planner<'a> {
    fn plan(mut self) -> Vec<Operation> {
        self.plan_database_options();

        let to = self.to;
        for to_table in &to.tables {
            self.plan_table(to_table);
        }

        self.plan_change_streams();
        self.streams_reconciled = true;

        let from = self.from;
        for from_table in &from.tables {
            if self.to.table(from_table.name()).is_none() {
                self.drop_table_cascade(from_table);
            }
        }

        self.plan_views();
        self.plan_roles();
        self.plan_grants();
        self.ops
    }

    fn push(&mut self, op: impl Into<Operation>) {
        self.ops.push(op.into());
    }

    // --- scratch state ----------------------------------------------------

    fn is_dropped_table(&self, name: &Path) -> bool {
        self.dropped_tables.contains(&name.canonical())
    }

    fn is_dropped_index(&self, name: &Path) -> bool {
        self.dropped_indexes.contains(&name.canonical())
    }

    fn is_dropped_stream(&self, name: &Path) -> bool {
        self.dropped_streams.contains(&name.canonical())
    }

    fn is_dropped_constraint(&self, constraint: &TableConstraint) -> bool {
        self.dropped_constraints
            .iter()
            .any(|c| constraint_eq(c, constraint))
    }

    fn is_dropped_grant(&self, grant: &Grant) -> bool {
        self.dropped_grants.iter().any(|g| grant_eq(g, grant))
    }

    fn record_dropped_grant(&mut self, grant: &Grant) {
        if !self.is_dropped_grant(grant) {
            self.dropped_grants.push(grant.clone());
        }
    }

    // --- step 1: database options ----------------------------------------

    fn plan_database_options(&mut self) {
        let from = self.from;
        let to = self.to;
        let from_options = from
            .alter_database
            .as_ref()
            .map(|a| a.options.clone())
            .unwrap_or_default();
        let to_options = to
            .alter_database
            .as_ref()
            .map(|a| a.options.clone())
            .unwrap_or_default();
        if from_options == to_options {
            return;
        }

        match &to.alter_database {
            None => {
                // Target dropped the statement: null out everything the
                // source set.
                let Some(from_alter) = &from.alter_database else {
                    return;
                };
                let options = DatabaseOptions {
                    optimizer_version: from_options.optimizer_version.map(|_| None),
                    version_retention_period: from_options.version_retention_period.map(|_| None),
                    enable_key_visualizer: from_options.enable_key_visualizer.map(|_| None),
                    default_leader: from_options.default_leader.map(|_| None),
                };
                self.push(Statement::AlterDatabase(AlterDatabase {
                    name: from_alter.name.clone(),
                    options,
                }));
            }
            Some(to_alter) => {
                fn merge<T: Clone>(from: &Option<Option<T>>, to: &Option<Option<T>>) -> Option<Option<T>> {
                    match (from, to) {
                        (_, Some(v)) => Some(v.clone()),
                        (Some(_), None) => Some(None),
                        (None, None) => None,
                    }
                }
                let options = DatabaseOptions {
                    optimizer_version: merge(
                        &from_options.optimizer_version,
                        &to_options.optimizer_version,
                    ),
                    version_retention_period: merge(
                        &from_options.version_retention_period,
                        &to_options.version_retention_period,
                    ),
                    enable_key_visualizer: merge(
                        &from_options.enable_key_visualizer,
                        &to_options.enable_key_visualizer,
                    ),
                    default_leader: merge(&from_options.default_leader, &to_options.default_leader),
                };
                self.push(Statement::AlterDatabase(AlterDatabase {
                    name: to_alter.name.clone(),
                    options,
                }));
            }
        }
    }

    // --- step 2: tables ---------------------------------------------------

    fn plan_table(&mut self, to_table: &'a Table) {
        let Some(from_table) = self.from.table(to_table.name()) else {
            self.create_table_and_indexes(to_table);
            return;
        };

        // Dropped earlier as the child of a recreated parent.
        if self.is_dropped_table(to_table.name()) {
            self.create_table_and_indexes(to_table);
            return;
        }

        if !interleave_eq(
            from_table.create.interleave.as_ref(),
            to_table.create.interleave.as_ref(),
        ) || !self.primary_key_eq(from_table, to_table)
        {
            self.drop_table_cascade(from_table);
            self.create_table_and_indexes(to_table);
            return;
        }

        self.plan_index_drops(from_table, to_table);
        self.plan_columns(from_table, to_table);
        self.plan_index_creates(from_table, to_table);
        self.plan_index_storing(from_table, to_table);
        self.plan_constraints(from_table, to_table);
        self.plan_row_deletion_policy(from_table, to_table);
        // Attached change streams are reconciled in the stream pass.
    }

    fn primary_key_eq(&self, a: &Table, b: &Table) -> bool {
        if a.create.primary_key != b.create.primary_key {
            return false;
        }
        for part in &b.create.primary_key {
            let Some(x) = find_column(&a.create.columns, &part.column) else {
                return false;
            };
            let Some(y) = find_column(&b.create.columns, &part.column) else {
                return false;
            };
            if !column_def_eq(x, y) {
                return false;
            }
        }
        true
    }

    fn create_table_and_indexes(&mut self, table: &Table) {
        self.push(Statement::CreateTable(table.create.clone()));
        for index in &table.indexes {
            self.push(Statement::CreateIndex(index.clone()));
        }
        for index in &table.search_indexes {
            self.push(Statement::CreateSearchIndex(index.clone()));
        }
        // Attached change streams are created or repointed by the
        // stream pass, which runs after every target table exists.
    }

    fn drop_table_cascade(&mut self, table: &'a Table) {
        if self.is_dropped_table(table.name()) {
            return;
        }

        for child in table.children.clone() {
            if let Some(child_table) = self.from.table(&child) {
                self.drop_table_cascade(child_table);
            }
        }

        for index in &table.indexes {
            if !self.is_dropped_index(&index.name) {
                self.dropped_indexes.insert(index.name.canonical());
                self.push(Statement::DropIndex(DropIndex {
                    name: index.name.clone(),
                }));
            }
        }
        for index in &table.search_indexes {
            if !self.is_dropped_index(&index.name) {
                self.dropped_indexes.insert(index.name.canonical());
                self.push(Statement::DropSearchIndex(DropSearchIndex {
                    name: index.name.clone(),
                }));
            }
        }

        for stream in &table.change_streams {
            self.cascade_change_stream(stream, table.name());
        }

        // Foreign keys elsewhere that reference the dropping table.
        let referencing = self.constraints_matching(|_owner, constraint| {
            let Constraint::ForeignKey(fk) = &constraint.constraint else {
                return false;
            };
            fk.ref_table == *table.name()
        });
        for (owner, constraint) in referencing {
            self.drop_named_constraint(&owner, &constraint);
        }

        // Grants on the table die with it.
        let grants: Vec<Grant> = self
            .from
            .grants
            .iter()
            .filter(|g| grant_targets_table(g, table.name()))
            .cloned()
            .collect();
        for grant in &grants {
            self.record_dropped_grant(grant);
        }

        self.dropped_tables.insert(table.name().canonical());
        self.push(Statement::DropTable(DropTable {
            name: table.name().clone(),
        }));
    }

    /// A change stream attached to a table that is about to be dropped:
    /// either repoint it at its surviving watch targets (ahead of the
    /// `DROP TABLE`) or drop it.
    fn cascade_change_stream(&mut self, stream: &ChangeStream, dropping: &Path) {
        let name = &stream.create.name;
        if self.is_dropped_stream(name) {
            return;
        }

        let target_exists = self.to.change_stream(name).is_some();
        if target_exists && self.streams_reconciled {
            // The stream pass already repointed it, before this drop.
            return;
        }

        let surviving: Vec<WatchDef> = stream
            .create
            .watch
            .tables()
            .iter()
            .filter(|w| {
                w.table != *dropping
                    && !self.is_dropped_table(&w.table)
                    && self.to.table(&w.table).is_some()
            })
            .cloned()
            .collect();

        if target_exists && !surviving.is_empty() {
            if self.narrowed_streams.get(&name.canonical()) != Some(&surviving) {
                self.push(Statement::AlterChangeStream(AlterChangeStream {
                    name: name.clone(),
                    alteration: StreamAlteration::SetWatch(Watch::Tables(surviving.clone())),
                }));
                self.narrowed_streams.insert(name.canonical(), surviving);
            }
        } else {
            for grant in self.grants_on_change_stream(name) {
                self.record_dropped_grant(&grant);
            }
            self.dropped_streams.insert(name.canonical());
            self.push(Statement::DropChangeStream(DropChangeStream {
                name: name.clone(),
            }));
        }
    }

    fn grants_on_change_stream(&self, name: &Path) -> Vec<Grant> {
        self.from
            .grants
            .iter()
            .filter(|g| matches!(&g.target, GrantTarget::ChangeStream { names } if names.contains(name)))
            .cloned()
            .collect()
    }

    fn constraints_matching<F>(&self, predicate: F) -> Vec<(Path, TableConstraint)>
    where
        F: Fn(&Path, &TableConstraint) -> bool,
    {
        let mut found = Vec::new();
        for table in &self.from.tables {
            if self.is_dropped_table(table.name()) {
                continue;
            }
            for constraint in table.constraints() {
                if predicate(table.name(), constraint) {
                    found.push((table.name().clone(), constraint.clone()));
                }
            }
        }
        found
    }

    fn drop_named_constraint(&mut self, table: &Path, constraint: &TableConstraint) {
        let Some(name) = &constraint.name else {
            return;
        };
        if self.is_dropped_constraint(constraint) {
            return;
        }
        self.dropped_constraints.push(constraint.clone());
        self.push(Statement::AlterTable(AlterTable {
            table: table.clone(),
            alteration: TableAlteration::DropConstraint(name.clone()),
        }));
    }

    // --- step 2a/2c/2d: indexes -------------------------------------------

    fn plan_index_drops(&mut self, from_table: &Table, to_table: &Table) {
        for to_index in &to_table.indexes {
            if let Some(from_index) = find_index(&from_table.indexes, &to_index.name) {
                if !index_eq_ignoring_storing(from_index, to_index) {
                    self.dropped_indexes.insert(from_index.name.canonical());
                    self.push(Statement::DropIndex(DropIndex {
                        name: from_index.name.clone(),
                    }));
                }
            }
        }
        for from_index in &from_table.indexes {
            if find_index(&to_table.indexes, &from_index.name).is_none() {
                self.dropped_indexes.insert(from_index.name.canonical());
                self.push(Statement::DropIndex(DropIndex {
                    name: from_index.name.clone(),
                }));
            }
        }

        for to_index in &to_table.search_indexes {
            if let Some(from_index) = find_search_index(&from_table.search_indexes, &to_index.name)
            {
                if !search_index_eq(from_index, to_index) {
                    self.dropped_indexes.insert(from_index.name.canonical());
                    self.push(Statement::DropSearchIndex(DropSearchIndex {
                        name: from_index.name.clone(),
                    }));
                }
            }
        }
        for from_index in &from_table.search_indexes {
            if find_search_index(&to_table.search_indexes, &from_index.name).is_none() {
                self.dropped_indexes.insert(from_index.name.canonical());
                self.push(Statement::DropSearchIndex(DropSearchIndex {
                    name: from_index.name.clone(),
                }));
            }
        }
    }

    fn plan_index_creates(&mut self, from_table: &Table, to_table: &Table) {
        for to_index in &to_table.indexes {
            let unchanged = find_index(&from_table.indexes, &to_index.name)
                .is_some_and(|from_index| index_eq_ignoring_storing(from_index, to_index));
            if !unchanged {
                self.push(Statement::CreateIndex(to_index.clone()));
            }
        }
        for to_index in &to_table.search_indexes {
            let unchanged = find_search_index(&from_table.search_indexes, &to_index.name)
                .is_some_and(|from_index| search_index_eq(from_index, to_index));
            if !unchanged {
                self.push(Statement::CreateSearchIndex(to_index.clone()));
            }
        }
    }

    fn plan_index_storing(&mut self, from_table: &Table, to_table: &Table) {
        for to_index in &to_table.indexes {
            let Some(from_index) = find_index(&from_table.indexes, &to_index.name) else {
                continue;
            };
            // A structurally changed index was rebuilt with the target
            // definition already; only same-shape survivors take
            // STORING maintenance.
            if !index_eq_ignoring_storing(from_index, to_index) {
                continue;
            }
            for column in &to_index.storing {
                if !from_index.storing.contains(column) {
                    self.push(Statement::AlterIndex(AlterIndex {
                        name: to_index.name.clone(),
                        alteration: IndexAlteration::AddStoredColumn(column.clone()),
                    }));
                }
            }
            for column in &from_index.storing {
                if !to_index.storing.contains(column) {
                    self.push(Statement::AlterIndex(AlterIndex {
                        name: to_index.name.clone(),
                        alteration: IndexAlteration::DropStoredColumn(column.clone()),
                    }));
                }
            }
        }
    }

    // --- step 2b: columns -------------------------------------------------

    fn plan_columns(&mut self, from_table: &'a Table, to_table: &'a Table) {
        for to_col in &to_table.create.columns {
            let Some(from_col) = find_column(&from_table.create.columns, &to_col.name) else {
                self.add_column(to_table.name(), to_col);
                continue;
            };

            if column_def_eq(from_col, to_col) {
                continue;
            }

            if column_def_eq_ignoring_hidden(from_col, to_col) {
                self.push(Operation::AlterColumn(AlterColumn {
                    table: to_table.name().clone(),
                    def: to_col.clone(),
                    set_options: false,
                }));
                continue;
            }

            if column_type_eq(from_col, to_col)
                && from_col.generated.is_none()
                && to_col.generated.is_none()
            {
                if matches!(from_col.ty.base, TypeBase::Timestamp) {
                    if from_col.not_null != to_col.not_null
                        || !default_eq(from_col.default.as_ref(), to_col.default.as_ref())
                    {
                        if !from_col.not_null && to_col.not_null {
                            self.push(Operation::Update(Update {
                                table: to_table.name().clone(),
                                def: to_col.clone(),
                            }));
                        }
                        self.push(Operation::AlterColumn(AlterColumn {
                            table: to_table.name().clone(),
                            def: to_col.clone(),
                            set_options: false,
                        }));
                    }
                    if from_col.options.allow_commit_timestamp
                        != to_col.options.allow_commit_timestamp
                    {
                        self.push(Operation::AlterColumn(AlterColumn {
                            table: to_table.name().clone(),
                            def: to_col.clone(),
                            set_options: true,
                        }));
                    }
                } else {
                    if !from_col.not_null && to_col.not_null {
                        self.push(Operation::Update(Update {
                            table: to_table.name().clone(),
                            def: to_col.clone(),
                        }));
                    }
                    self.push(Operation::AlterColumn(AlterColumn {
                        table: to_table.name().clone(),
                        def: to_col.clone(),
                        set_options: false,
                    }));
                }
            } else {
                self.drop_and_create_column(from_table, to_table, from_col, to_col);
            }
        }

        for from_col in &from_table.create.columns {
            if find_column(&to_table.create.columns, &from_col.name).is_none() {
                self.drop_column(from_table.name(), &from_col.name);
            }
        }
    }

    fn add_column(&mut self, table: &Path, def: &ColumnDef) {
        if def.not_null && def.default.is_none() && def.generated.is_none() {
            let mut with_default = def.clone();
            with_default.default = Some(sentinel(&def.ty));
            self.push(Statement::AlterTable(AlterTable {
                table: table.clone(),
                alteration: TableAlteration::AddColumn(with_default),
            }));
            self.push(Operation::DropDefault(DropDefault {
                table: table.clone(),
                column: def.name.clone(),
            }));
        } else {
            self.push(Statement::AlterTable(AlterTable {
                table: table.clone(),
                alteration: TableAlteration::AddColumn(def.clone()),
            }));
        }
    }

    fn drop_column(&mut self, table: &Path, column: &Ident) {
        // Foreign keys naming the column, on either side.
        let referencing = self.constraints_matching(|owner, constraint| {
            let Constraint::ForeignKey(fk) = &constraint.constraint else {
                return false;
            };
            (owner == table && fk.columns.contains(column))
                || (fk.ref_table == *table && fk.ref_columns.contains(column))
        });
        for (owner, constraint) in referencing {
            self.drop_named_constraint(&owner, &constraint);
        }

        // Column-scoped grants die with the column.
        let grants: Vec<Grant> = self
            .from
            .grants
            .iter()
            .filter(|g| grant_targets_column(g, table, column))
            .cloned()
            .collect();
        for grant in &grants {
            self.record_dropped_grant(grant);
        }

        self.push(Statement::AlterTable(AlterTable {
            table: table.clone(),
            alteration: TableAlteration::DropColumn(column.clone()),
        }));
    }

    fn drop_and_create_column(
        &mut self,
        from_table: &Table,
        to_table: &Table,
        from_col: &ColumnDef,
        to_col: &ColumnDef,
    ) {
        let indexes: Vec<CreateIndex> = from_table
            .indexes
            .iter()
            .filter(|i| index_references_column(i, &from_col.name) && !self.is_dropped_index(&i.name))
            .cloned()
            .collect();
        let search_indexes: Vec<CreateSearchIndex> = from_table
            .search_indexes
            .iter()
            .filter(|i| {
                search_index_references_column(i, &from_col.name) && !self.is_dropped_index(&i.name)
            })
            .cloned()
            .collect();

        for index in &indexes {
            self.dropped_indexes.insert(index.name.canonical());
            self.push(Statement::DropIndex(DropIndex {
                name: index.name.clone(),
            }));
        }
        for index in &search_indexes {
            self.dropped_indexes.insert(index.name.canonical());
            self.push(Statement::DropSearchIndex(DropSearchIndex {
                name: index.name.clone(),
            }));
        }

        self.drop_column(from_table.name(), &from_col.name);
        self.add_column(to_table.name(), to_col);

        for index in indexes {
            self.push(Statement::CreateIndex(index));
        }
        for index in search_indexes {
            self.push(Statement::CreateSearchIndex(index));
        }
    }

    // --- step 2e: constraints ---------------------------------------------

    fn plan_constraints(&mut self, from_table: &'a Table, to_table: &'a Table) {
        for to_constraint in to_table.constraints() {
            let Some(name) = &to_constraint.name else {
                let present = from_table
                    .constraints()
                    .iter()
                    .any(|c| constraint_eq(c, to_constraint));
                if !present {
                    self.add_constraint(to_table.name(), to_constraint);
                }
                continue;
            };

            let from_constraint = find_named_constraint(from_table.constraints(), name);
            match from_constraint {
                None => self.add_constraint(to_table.name(), to_constraint),
                Some(_) if self.is_dropped_constraint(to_constraint) => {
                    self.add_constraint(to_table.name(), to_constraint);
                }
                Some(from_constraint) => {
                    if constraint_eq(from_constraint, to_constraint) {
                        continue;
                    }
                    let from_constraint = from_constraint.clone();
                    self.drop_named_constraint(from_table.name(), &from_constraint);
                    self.add_constraint(to_table.name(), to_constraint);
                }
            }
        }

        for from_constraint in from_table.constraints() {
            let Some(name) = &from_constraint.name else {
                continue;
            };
            if find_named_constraint(to_table.constraints(), name).is_none() {
                let from_constraint = from_constraint.clone();
                self.drop_named_constraint(from_table.name(), &from_constraint);
            }
        }
    }

    fn add_constraint(&mut self, table: &Path, constraint: &TableConstraint) {
        self.push(Statement::AlterTable(AlterTable {
            table: table.clone(),
            alteration: TableAlteration::AddConstraint(constraint.clone()),
        }));
    }

    // --- step 2f: row deletion policy --------------------------------------

    fn plan_row_deletion_policy(&mut self, from_table: &Table, to_table: &Table) {
        let from_policy = from_table.create.row_deletion_policy.as_ref();
        let to_policy = to_table.create.row_deletion_policy.as_ref();
        let alteration = match (from_policy, to_policy) {
            (Some(a), Some(b)) if a == b => return,
            (Some(_), Some(b)) => TableAlteration::ReplaceRowDeletionPolicy(b.clone()),
            (Some(_), None) => TableAlteration::DropRowDeletionPolicy,
            (None, Some(b)) => TableAlteration::AddRowDeletionPolicy(b.clone()),
            (None, None) => return,
        };
        self.push(Statement::AlterTable(AlterTable {
            table: to_table.name().clone(),
            alteration,
        }));
    }

    // --- step 3: change streams -------------------------------------------

    fn plan_change_streams(&mut self) {
        let to = self.to;
        let from = self.from;

        for to_stream in to.all_change_streams() {
            let name = &to_stream.create.name;
            match from.change_stream(name) {
                None => {
                    self.push(Statement::CreateChangeStream(to_stream.create.clone()));
                }
                Some(_) if self.is_dropped_stream(name) => {
                    self.push(Statement::CreateChangeStream(to_stream.create.clone()));
                }
                Some(from_stream) => {
                    let narrowed = self.narrowed_streams.get(&name.canonical()).cloned();
                    let effective_watch = narrowed
                        .map(Watch::Tables)
                        .unwrap_or_else(|| from_stream.create.watch.clone());
                    let from_options = from_stream.create.options.clone();
                    self.alter_change_stream(&effective_watch, &from_options, to_stream);
                }
            }
        }

        let absent: Vec<&ChangeStream> = from
            .all_change_streams()
            .into_iter()
            .filter(|cs| {
                to.change_stream(&cs.create.name).is_none()
                    && !self.is_dropped_stream(&cs.create.name)
            })
            .collect();
        for stream in absent {
            for grant in self.grants_on_change_stream(&stream.create.name) {
                self.record_dropped_grant(&grant);
            }
            self.dropped_streams.insert(stream.create.name.canonical());
            self.push(Statement::DropChangeStream(DropChangeStream {
                name: stream.create.name.clone(),
            }));
        }
    }

    fn alter_change_stream(
        &mut self,
        from_watch: &Watch,
        from_options: &StreamOptions,
        to_stream: &ChangeStream,
    ) {
        let name = to_stream.create.name.clone();
        let to_watch = &to_stream.create.watch;

        match (from_watch, to_watch) {
            (Watch::None, Watch::None) | (Watch::AllTables, Watch::AllTables) => {}
            (Watch::Tables(a), Watch::Tables(b)) => {
                if a != b {
                    self.push(Statement::AlterChangeStream(AlterChangeStream {
                        name: name.clone(),
                        alteration: StreamAlteration::SetWatch(Watch::Tables(b.clone())),
                    }));
                }
            }
            (Watch::None | Watch::Tables(_), Watch::AllTables) => {
                self.push(Statement::AlterChangeStream(AlterChangeStream {
                    name: name.clone(),
                    alteration: StreamAlteration::SetWatch(Watch::AllTables),
                }));
            }
            (Watch::None | Watch::AllTables, Watch::Tables(b)) => {
                self.push(Statement::AlterChangeStream(AlterChangeStream {
                    name: name.clone(),
                    alteration: StreamAlteration::SetWatch(Watch::Tables(b.clone())),
                }));
            }
            (Watch::AllTables, Watch::None) => {
                self.push(Statement::AlterChangeStream(AlterChangeStream {
                    name: name.clone(),
                    alteration: StreamAlteration::DropForAll,
                }));
            }
            (Watch::Tables(_), Watch::None) => {
                // There is no DROP FOR <tables> form; recreate with the
                // target definition.
                self.push(Statement::DropChangeStream(DropChangeStream {
                    name: name.clone(),
                }));
                self.push(Statement::CreateChangeStream(to_stream.create.clone()));
                return;
            }
        }

        if !stream_options_eq(from_options, &to_stream.create.options) {
            let mut merged = to_stream.create.options.clone();
            for (option, _) in &from_options.0 {
                if to_stream.create.options.get(option.as_str()).is_none() {
                    merged.0.push((option.clone(), self.removed_option_value(option)));
                }
            }
            self.push(Statement::AlterChangeStream(AlterChangeStream {
                name,
                alteration: StreamAlteration::SetOptions(merged),
            }));
        }
    }

    /// The value written for an option the target no longer sets.
    fn removed_option_value(&self, option: &Ident) -> Expr {
        if self.config.legacy_stream_option_defaults {
            if *option == Ident::new("retention_period") {
                return Expr::Lit(Lit::String("1d".into()));
            }
            if *option == Ident::new("value_capture_type") {
                return Expr::Lit(Lit::String("OLD_AND_NEW_VALUES".into()));
            }
        }
        Expr::Lit(Lit::Null)
    }

    // --- step 5: views ----------------------------------------------------

    fn plan_views(&mut self) {
        let to = self.to;
        let from = self.from;

        for to_view in &to.views {
            match from.view(&to_view.name) {
                None => self.push(Statement::CreateView(to_view.clone())),
                Some(from_view) => {
                    if !view_eq(from_view, to_view) {
                        let mut replace = to_view.clone();
                        replace.or_replace = true;
                        self.push(Statement::CreateView(replace));
                    }
                }
            }
        }

        for from_view in &from.views {
            if to.view(&from_view.name).is_none() {
                let grants: Vec<Grant> = from
                    .grants
                    .iter()
                    .filter(|g| {
                        matches!(&g.target, GrantTarget::View { names } if names.contains(&from_view.name))
                    })
                    .cloned()
                    .collect();
                for grant in &grants {
                    self.record_dropped_grant(grant);
                }
                self.push(Statement::DropView(DropView {
                    name: from_view.name.clone(),
                }));
            }
        }
    }

    // --- step 6: roles ----------------------------------------------------

    fn plan_roles(&mut self) {
        let to = self.to;
        let from = self.from;

        for to_role in &to.roles {
            if !from.roles.iter().any(|r| r.name == to_role.name) {
                self.push(Statement::CreateRole(to_role.clone()));
            }
        }

        for from_role in &from.roles {
            if to.roles.iter().any(|r| r.name == from_role.name) {
                continue;
            }
            // Revoke the role's grants first where the target resource
            // survives; grants on dropped resources are revoked by the
            // drop itself.
            let involved: Vec<Grant> = from
                .grants
                .iter()
                .filter(|g| grant_involves_role(g, &from_role.name))
                .cloned()
                .collect();
            for grant in &involved {
                if self.is_dropped_grant(grant) {
                    continue;
                }
                if self.grant_target_survives(&grant.target) {
                    self.push(Statement::Revoke(Revoke {
                        target: grant.target.clone(),
                        roles: grant.roles.clone(),
                    }));
                }
                self.record_dropped_grant(grant);
            }
            self.push(Statement::DropRole(DropRole {
                name: from_role.name.clone(),
            }));
        }
    }

    fn grant_target_survives(&self, target: &GrantTarget) -> bool {
        match target {
            GrantTarget::Table { names, .. } => names.iter().all(|n| self.to.table(n).is_some()),
            GrantTarget::View { names } => names.iter().all(|n| self.to.view(n).is_some()),
            GrantTarget::ChangeStream { names } => {
                names.iter().all(|n| self.to.change_stream(n).is_some())
            }
            // Table functions are not modeled in the schema; assume
            // they survive so the revoke is explicit.
            GrantTarget::TableFunction { .. } => true,
            GrantTarget::Role { names } => names
                .iter()
                .all(|n| self.to.roles.iter().any(|r| r.name == *n)),
        }
    }

    // --- step 7: grants ---------------------------------------------------

    fn plan_grants(&mut self) {
        let to = self.to;
        let from = self.from;

        for from_grant in &from.grants {
            let in_target = to.grants.iter().any(|g| grant_eq(g, from_grant));
            if !in_target && !self.is_dropped_grant(from_grant) {
                self.push(Statement::Revoke(Revoke {
                    target: from_grant.target.clone(),
                    roles: from_grant.roles.clone(),
                }));
            }
        }

        for to_grant in &to.grants {
            let in_source = from.grants.iter().any(|g| grant_eq(g, to_grant));
            // A grant recorded as dropped lost its resource to a
            // recreate; it has to be granted again.
            if !in_source || self.is_dropped_grant(to_grant) {
                self.push(Statement::Grant(to_grant.clone()));
            }
        }
    }
}

// --- lookups ---------------------------------------------------------------

fn find_column<'c>(columns: &'c [ColumnDef], name: &Ident) -> Option<&'c ColumnDef> {
    columns.iter().find(|c| c.name == *name)
}

fn find_index<'c>(indexes: &'c [CreateIndex], name: &Path) -> Option<&'c CreateIndex> {
    indexes.iter().find(|i| i.name == *name)
}

fn find_search_index<'c>(
    indexes: &'c [CreateSearchIndex],
    name: &Path,
) -> Option<&'c CreateSearchIndex> {
    indexes.iter().find(|i| i.name == *name)
}

fn find_named_constraint<'c>(
    constraints: &'c [TableConstraint],
    name: &Ident,
) -> Option<&'c TableConstraint> {
    constraints
        .iter()
        .find(|c| c.name.as_ref() == Some(name))
}

fn index_references_column(index: &CreateIndex, column: &Ident) -> bool {
    index.keys.iter().any(|k| k.column == *column) || index.storing.contains(column)
}

fn search_index_references_column(index: &CreateSearchIndex, column: &Ident) -> bool {
    index.token_columns.contains(column)
        || index.storing.contains(column)
        || index.partition_by.contains(column)
        || index.order_by.iter().any(|k| k.column == *column)
}

fn grant_targets_table(grant: &Grant, table: &Path) -> bool {
    matches!(&grant.target, GrantTarget::Table { names, .. } if names.contains(table))
}

fn grant_targets_column(grant: &Grant, table: &Path, column: &Ident) -> bool {
    match &grant.target {
        GrantTarget::Table { privileges, names } => {
            names.contains(table) && privileges.iter().any(|p| p.columns.contains(column))
        }
        _ => false,
    }
}

fn grant_involves_role(grant: &Grant, role: &Ident) -> bool {
    grant.roles.contains(role)
        || matches!(&grant.target, GrantTarget::Role { names } if names.contains(role))
}
