//! Recursive-descent parser for Cloud Spanner DDL statements.

use crate::ast::{
    AlterChangeStream, AlterDatabase, AlterIndex, AlterTable, Check, ColumnDef, ColumnOptions,
    ColumnType, Constraint, CreateChangeStream, CreateIndex, CreateRole, CreateSearchIndex,
    CreateTable, CreateView, DatabaseOptions, DropChangeStream, DropIndex, DropRole,
    DropSearchIndex, DropTable, DropView, ForeignKey, Grant, GrantTarget, Ident, IndexAlteration,
    Interleave, KeyPart, Length, OnDelete, Path, PrivilegeKind, RawStatement, Revoke,
    RowDeletionPolicy, SqlSecurity, Statement, StreamAlteration, StreamOptions, TableAlteration,
    TableConstraint, TablePrivilege, TypeBase, Watch, WatchDef,
};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

use super::error::ParseError;

/// DDL parser over a single input text.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    pub(crate) current: Token,
    next: Token,
}

impl<'a> Parser<'a> {
    /// Creates a parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let next = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            next,
        }
    }

    /// Parses a complete DDL text: statements separated by `;`, with
    /// empty statements tolerated.
    pub fn parse_ddl(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance()?;
            }
            if self.current.is_eof() {
                break;
            }
            statements.push(self.parse_statement()?);
            if !self.current.is_eof() && !self.check(&TokenKind::Semicolon) {
                return Err(ParseError::unexpected(
                    "`;` between statements",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        }
        Ok(statements)
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current.span.start;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Create) => self.parse_create(start),
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter(),
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop(),
            TokenKind::Keyword(Keyword::Grant) => self.parse_grant(),
            TokenKind::Keyword(Keyword::Revoke) => self.parse_revoke(),
            kind => Err(ParseError::unexpected(
                "CREATE, ALTER, DROP, GRANT or REVOKE",
                kind.clone(),
                self.current.span,
            )),
        }
    }

    // --- token plumbing ---------------------------------------------------

    pub(crate) fn advance(&mut self) -> Result<(), ParseError> {
        if let TokenKind::Error(message) = &self.current.kind {
            return Err(ParseError::new(message.clone(), self.current.span));
        }
        self.current = std::mem::replace(&mut self.next, self.lexer.next_token());
        Ok(())
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current.kind, TokenKind::Keyword(k) if k == keyword)
    }

    pub(crate) fn peek_is(&self, kind: &TokenKind) -> bool {
        self.next.kind == *kind
    }

    pub(crate) fn peek_is_string(&self) -> bool {
        matches!(self.next.kind, TokenKind::Str(_))
    }

    fn peek_is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.next.kind, TokenKind::Keyword(k) if k == keyword)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn eat_keyword(&mut self, keyword: Keyword) -> Result<bool, ParseError> {
        if self.check_keyword(keyword) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance()
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects an identifier, accepting keyword tokens as names.
    pub(crate) fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let ident = match &self.current.kind {
            TokenKind::Ident(name) => Ident::new(name.clone()),
            TokenKind::Keyword(keyword) => Ident::new(keyword.as_str()),
            kind => {
                return Err(ParseError::unexpected(
                    "an identifier",
                    kind.clone(),
                    self.current.span,
                ));
            }
        };
        self.advance()?;
        Ok(ident)
    }

    /// Parses a dotted identifier path.
    pub(crate) fn parse_path(&mut self) -> Result<Path, ParseError> {
        let mut segments = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Dot)? {
            segments.push(self.expect_ident()?);
        }
        Ok(Path(segments))
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma)? {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_path_list(&mut self) -> Result<Vec<Path>, ParseError> {
        let mut names = vec![self.parse_path()?];
        while self.eat(&TokenKind::Comma)? {
            names.push(self.parse_path()?);
        }
        Ok(names)
    }

    fn expect_integer(&mut self) -> Result<i64, ParseError> {
        if let TokenKind::Integer(v) = self.current.kind {
            self.advance()?;
            Ok(v)
        } else {
            Err(ParseError::unexpected(
                "an integer",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Str(s) = self.current.kind.clone() {
            self.advance()?;
            Ok(s)
        } else {
            Err(ParseError::unexpected(
                "a string literal",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Skips tokens up to (not including) the next top-level `;` and
    /// returns the raw source text from `start`.
    fn skim_raw(&mut self, start: usize) -> Result<String, ParseError> {
        while !self.current.is_eof() && !self.check(&TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(String::from(&self.input[start..self.current.span.start]))
    }

    // --- CREATE -----------------------------------------------------------

    fn parse_create(&mut self, start: usize) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Create)?;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => self.parse_create_table().map(Statement::CreateTable),
            TokenKind::Keyword(Keyword::Unique | Keyword::NullFiltered | Keyword::Index) => {
                self.parse_create_index().map(Statement::CreateIndex)
            }
            TokenKind::Keyword(Keyword::Search) => {
                self.parse_create_search_index().map(Statement::CreateSearchIndex)
            }
            TokenKind::Keyword(Keyword::View | Keyword::Or) => {
                self.parse_create_view().map(Statement::CreateView)
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.parse_create_change_stream().map(Statement::CreateChangeStream)
            }
            TokenKind::Keyword(Keyword::Role) => {
                self.advance()?;
                let name = self.expect_ident()?;
                Ok(Statement::CreateRole(CreateRole { name }))
            }
            TokenKind::Keyword(Keyword::Sequence) => {
                self.advance()?;
                let name = self.parse_path()?;
                let text = self.skim_raw(start)?;
                Ok(Statement::CreateSequence(RawStatement { name, text }))
            }
            TokenKind::Keyword(Keyword::Model) => {
                self.advance()?;
                let name = self.parse_path()?;
                let text = self.skim_raw(start)?;
                Ok(Statement::CreateModel(RawStatement { name, text }))
            }
            kind => Err(ParseError::unexpected(
                "TABLE, INDEX, SEARCH INDEX, VIEW, CHANGE STREAM, ROLE, SEQUENCE or MODEL",
                kind.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_create_table(&mut self) -> Result<CreateTable, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let name = self.parse_path()?;
        self.expect(&TokenKind::LeftParen)?;

        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        loop {
            if self.check(&TokenKind::RightParen) {
                break;
            }
            if self.check_keyword(Keyword::Constraint)
                || self.check_keyword(Keyword::Foreign)
                || self.check_keyword(Keyword::Check)
            {
                constraints.push(self.parse_table_constraint()?);
            } else {
                columns.push(self.parse_column_def()?);
            }
            // Trailing commas before the closing paren are accepted.
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        self.expect_keyword(Keyword::Primary)?;
        self.expect_keyword(Keyword::Key)?;
        self.expect(&TokenKind::LeftParen)?;
        let primary_key = if self.check(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_key_parts()?
        };
        self.expect(&TokenKind::RightParen)?;

        let mut interleave = None;
        let mut row_deletion_policy = None;
        while self.eat(&TokenKind::Comma)? {
            if self.check_keyword(Keyword::Interleave) {
                interleave = Some(self.parse_interleave()?);
            } else if self.check_keyword(Keyword::Row) {
                row_deletion_policy = Some(self.parse_row_deletion_policy()?);
            } else {
                return Err(ParseError::unexpected(
                    "INTERLEAVE or ROW DELETION POLICY",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        }

        Ok(CreateTable {
            name,
            columns,
            constraints,
            primary_key,
            interleave,
            row_deletion_policy,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.expect_ident()?;
        let ty = self.parse_type()?;
        let mut def = ColumnDef::new(name.0, ty);

        loop {
            if self.check_keyword(Keyword::Not) {
                self.advance()?;
                self.expect_keyword(Keyword::Null)?;
                def.not_null = true;
            } else if self.check_keyword(Keyword::Default) {
                self.advance()?;
                self.expect(&TokenKind::LeftParen)?;
                def.default = Some(self.parse_expression(0)?);
                self.expect(&TokenKind::RightParen)?;
            } else if self.check_keyword(Keyword::As) {
                self.advance()?;
                self.expect(&TokenKind::LeftParen)?;
                def.generated = Some(self.parse_expression(0)?);
                self.expect(&TokenKind::RightParen)?;
                self.expect_keyword(Keyword::Stored)?;
            } else if self.check_keyword(Keyword::Hidden) {
                self.advance()?;
                def.hidden = true;
            } else if self.check_keyword(Keyword::Options) {
                self.advance()?;
                def.options = self.parse_column_options()?;
            } else {
                break;
            }
        }
        Ok(def)
    }

    fn parse_column_options(&mut self) -> Result<ColumnOptions, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut options = ColumnOptions::default();
        loop {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            if name == Ident::new("allow_commit_timestamp") {
                options.allow_commit_timestamp = if self.eat_keyword(Keyword::Null)? {
                    None
                } else if self.eat_keyword(Keyword::True)? {
                    Some(true)
                } else if self.eat_keyword(Keyword::False)? {
                    Some(false)
                } else {
                    return Err(ParseError::unexpected(
                        "true, false or null",
                        self.current.kind.clone(),
                        self.current.span,
                    ));
                };
            } else {
                return Err(ParseError::new(
                    format!("unknown column option {}", name.as_str()),
                    self.current.span,
                ));
            }
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(options)
    }

    fn parse_type(&mut self) -> Result<ColumnType, ParseError> {
        if self.check_keyword(Keyword::Array) && self.peek_is(&TokenKind::Lt) {
            self.advance()?;
            self.expect(&TokenKind::Lt)?;
            let base = self.parse_type_base()?;
            self.expect(&TokenKind::Gt)?;
            return Ok(ColumnType::array(base));
        }
        Ok(ColumnType::scalar(self.parse_type_base()?))
    }

    fn parse_type_base(&mut self) -> Result<TypeBase, ParseError> {
        let base = match &self.current.kind {
            TokenKind::Keyword(Keyword::Bool) => {
                self.advance()?;
                TypeBase::Bool
            }
            TokenKind::Keyword(Keyword::Int64) => {
                self.advance()?;
                TypeBase::Int64
            }
            TokenKind::Keyword(Keyword::Float32) => {
                self.advance()?;
                TypeBase::Float32
            }
            TokenKind::Keyword(Keyword::Float64) => {
                self.advance()?;
                TypeBase::Float64
            }
            TokenKind::Keyword(Keyword::Numeric) => {
                self.advance()?;
                TypeBase::Numeric
            }
            TokenKind::Keyword(Keyword::Date) => {
                self.advance()?;
                TypeBase::Date
            }
            TokenKind::Keyword(Keyword::Timestamp) => {
                self.advance()?;
                TypeBase::Timestamp
            }
            TokenKind::Keyword(Keyword::Json) => {
                self.advance()?;
                TypeBase::Json
            }
            TokenKind::Keyword(Keyword::Tokenlist) => {
                self.advance()?;
                TypeBase::Tokenlist
            }
            TokenKind::Keyword(Keyword::String) => {
                self.advance()?;
                TypeBase::String(self.parse_length()?)
            }
            TokenKind::Keyword(Keyword::Bytes) => {
                self.advance()?;
                TypeBase::Bytes(self.parse_length()?)
            }
            TokenKind::Ident(_) => TypeBase::Named(self.parse_path()?),
            kind => {
                return Err(ParseError::unexpected(
                    "a column type",
                    kind.clone(),
                    self.current.span,
                ));
            }
        };
        Ok(base)
    }

    fn parse_length(&mut self) -> Result<Length, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let length = if self.eat_keyword(Keyword::Max)? {
            Length::Max
        } else {
            let value = self.expect_integer()?;
            Length::Exact(value.max(0) as u64)
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(length)
    }

    fn parse_key_parts(&mut self) -> Result<Vec<KeyPart>, ParseError> {
        let mut parts = Vec::new();
        loop {
            let column = self.expect_ident()?;
            let desc = if self.eat_keyword(Keyword::Desc)? {
                true
            } else {
                self.eat_keyword(Keyword::Asc)?;
                false
            };
            parts.push(KeyPart { column, desc });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(parts)
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let name = if self.eat_keyword(Keyword::Constraint)? {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let constraint = if self.check_keyword(Keyword::Foreign) {
            Constraint::ForeignKey(self.parse_foreign_key()?)
        } else if self.check_keyword(Keyword::Check) {
            self.advance()?;
            self.expect(&TokenKind::LeftParen)?;
            let expr = self.parse_expression(0)?;
            self.expect(&TokenKind::RightParen)?;
            Constraint::Check(Check { expr })
        } else {
            return Err(ParseError::unexpected(
                "FOREIGN KEY or CHECK",
                self.current.kind.clone(),
                self.current.span,
            ));
        };
        Ok(TableConstraint { name, constraint })
    }

    fn parse_foreign_key(&mut self) -> Result<ForeignKey, ParseError> {
        self.expect_keyword(Keyword::Foreign)?;
        self.expect_keyword(Keyword::Key)?;
        self.expect(&TokenKind::LeftParen)?;
        let columns = self.parse_ident_list()?;
        self.expect(&TokenKind::RightParen)?;
        self.expect_keyword(Keyword::References)?;
        let ref_table = self.parse_path()?;
        self.expect(&TokenKind::LeftParen)?;
        let ref_columns = self.parse_ident_list()?;
        self.expect(&TokenKind::RightParen)?;
        let on_delete = self.parse_on_delete()?;
        Ok(ForeignKey {
            columns,
            ref_table,
            ref_columns,
            on_delete,
        })
    }

    fn parse_on_delete(&mut self) -> Result<Option<OnDelete>, ParseError> {
        if !self.check_keyword(Keyword::On) {
            return Ok(None);
        }
        self.advance()?;
        self.expect_keyword(Keyword::Delete)?;
        if self.eat_keyword(Keyword::Cascade)? {
            Ok(Some(OnDelete::Cascade))
        } else {
            self.expect_keyword(Keyword::No)?;
            self.expect_keyword(Keyword::Action)?;
            Ok(Some(OnDelete::NoAction))
        }
    }

    fn parse_interleave(&mut self) -> Result<Interleave, ParseError> {
        self.expect_keyword(Keyword::Interleave)?;
        self.expect_keyword(Keyword::In)?;
        self.expect_keyword(Keyword::Parent)?;
        let parent = self.parse_path()?;
        let on_delete = self.parse_on_delete()?;
        Ok(Interleave { parent, on_delete })
    }

    fn parse_row_deletion_policy(&mut self) -> Result<RowDeletionPolicy, ParseError> {
        self.expect_keyword(Keyword::Row)?;
        self.expect_keyword(Keyword::Deletion)?;
        self.expect_keyword(Keyword::Policy)?;
        self.expect(&TokenKind::LeftParen)?;
        let func = self.expect_ident()?;
        if func != Ident::new("OLDER_THAN") {
            return Err(ParseError::new(
                format!("expected OLDER_THAN, found {}", func.as_str()),
                self.current.span,
            ));
        }
        self.expect(&TokenKind::LeftParen)?;
        let column = self.expect_ident()?;
        self.expect(&TokenKind::Comma)?;
        self.expect_keyword(Keyword::Interval)?;
        let num_days = self.expect_integer()?;
        self.expect_keyword(Keyword::Day)?;
        self.expect(&TokenKind::RightParen)?;
        self.expect(&TokenKind::RightParen)?;
        Ok(RowDeletionPolicy { column, num_days })
    }

    fn parse_create_index(&mut self) -> Result<CreateIndex, ParseError> {
        let unique = self.eat_keyword(Keyword::Unique)?;
        let null_filtered = self.eat_keyword(Keyword::NullFiltered)?;
        self.expect_keyword(Keyword::Index)?;
        let name = self.parse_path()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.parse_path()?;
        self.expect(&TokenKind::LeftParen)?;
        let keys = self.parse_key_parts()?;
        self.expect(&TokenKind::RightParen)?;

        let mut storing = Vec::new();
        if self.eat_keyword(Keyword::Storing)? {
            self.expect(&TokenKind::LeftParen)?;
            storing = self.parse_ident_list()?;
            self.expect(&TokenKind::RightParen)?;
        }
        let mut interleave = None;
        if self.eat(&TokenKind::Comma)? {
            self.expect_keyword(Keyword::Interleave)?;
            self.expect_keyword(Keyword::In)?;
            interleave = Some(self.parse_path()?);
        }

        Ok(CreateIndex {
            name,
            table,
            unique,
            null_filtered,
            keys,
            storing,
            interleave,
        })
    }

    fn parse_create_search_index(&mut self) -> Result<CreateSearchIndex, ParseError> {
        self.expect_keyword(Keyword::Search)?;
        self.expect_keyword(Keyword::Index)?;
        let name = self.parse_path()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.parse_path()?;
        self.expect(&TokenKind::LeftParen)?;
        let token_columns = self.parse_ident_list()?;
        self.expect(&TokenKind::RightParen)?;

        let mut index = CreateSearchIndex {
            name,
            table,
            token_columns,
            storing: Vec::new(),
            partition_by: Vec::new(),
            order_by: Vec::new(),
            interleave: None,
            options: StreamOptions::default(),
        };
        if self.eat_keyword(Keyword::Storing)? {
            self.expect(&TokenKind::LeftParen)?;
            index.storing = self.parse_ident_list()?;
            self.expect(&TokenKind::RightParen)?;
        }
        if self.eat_keyword(Keyword::Partition)? {
            self.expect_keyword(Keyword::By)?;
            index.partition_by = self.parse_ident_list()?;
        }
        if self.eat_keyword(Keyword::Order)? {
            self.expect_keyword(Keyword::By)?;
            index.order_by = self.parse_key_parts()?;
        }
        if self.eat(&TokenKind::Comma)? {
            self.expect_keyword(Keyword::Interleave)?;
            self.expect_keyword(Keyword::In)?;
            index.interleave = Some(self.parse_path()?);
        }
        if self.check_keyword(Keyword::Options) {
            index.options = self.parse_options_list()?;
        }
        Ok(index)
    }

    fn parse_create_view(&mut self) -> Result<CreateView, ParseError> {
        let or_replace = if self.eat_keyword(Keyword::Or)? {
            self.expect_keyword(Keyword::Replace)?;
            true
        } else {
            false
        };
        self.expect_keyword(Keyword::View)?;
        let name = self.parse_path()?;
        let security = if self.eat_keyword(Keyword::Sql)? {
            self.expect_keyword(Keyword::Security)?;
            if self.eat_keyword(Keyword::Definer)? {
                SqlSecurity::Definer
            } else {
                self.expect_keyword(Keyword::Invoker)?;
                SqlSecurity::Invoker
            }
        } else {
            SqlSecurity::Invoker
        };
        self.expect_keyword(Keyword::As)?;
        let start = self.current.span.start;
        let query = self.skim_raw(start)?;
        Ok(CreateView {
            name,
            or_replace,
            security,
            query: query.trim().to_string(),
        })
    }

    fn parse_create_change_stream(&mut self) -> Result<CreateChangeStream, ParseError> {
        self.expect_keyword(Keyword::Change)?;
        self.expect_keyword(Keyword::Stream)?;
        let name = self.parse_path()?;
        let watch = if self.eat_keyword(Keyword::For)? {
            if self.eat_keyword(Keyword::All)? {
                Watch::AllTables
            } else {
                Watch::Tables(self.parse_watch_defs()?)
            }
        } else {
            Watch::None
        };
        let options = if self.check_keyword(Keyword::Options) {
            self.parse_options_list()?
        } else {
            StreamOptions::default()
        };
        Ok(CreateChangeStream {
            name,
            watch,
            options,
        })
    }

    fn parse_watch_defs(&mut self) -> Result<Vec<WatchDef>, ParseError> {
        let mut defs = Vec::new();
        loop {
            let table = self.parse_path()?;
            let columns = if self.eat(&TokenKind::LeftParen)? {
                let columns = if self.check(&TokenKind::RightParen) {
                    Vec::new()
                } else {
                    self.parse_ident_list()?
                };
                self.expect(&TokenKind::RightParen)?;
                Some(columns)
            } else {
                None
            };
            defs.push(WatchDef { table, columns });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(defs)
    }

    /// Parses a generic `OPTIONS (name = value, ...)` list.
    fn parse_options_list(&mut self) -> Result<StreamOptions, ParseError> {
        self.expect_keyword(Keyword::Options)?;
        self.expect(&TokenKind::LeftParen)?;
        let mut options = StreamOptions::default();
        loop {
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            options.0.push((name, value));
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(options)
    }

    // --- ALTER ------------------------------------------------------------

    fn parse_alter(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Alter)?;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => self.parse_alter_table().map(Statement::AlterTable),
            TokenKind::Keyword(Keyword::Database) => {
                self.parse_alter_database().map(Statement::AlterDatabase)
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.parse_alter_change_stream().map(Statement::AlterChangeStream)
            }
            TokenKind::Keyword(Keyword::Index) => self.parse_alter_index().map(Statement::AlterIndex),
            kind => Err(ParseError::unexpected(
                "TABLE, DATABASE, CHANGE STREAM or INDEX",
                kind.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_alter_table(&mut self) -> Result<AlterTable, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let table = self.parse_path()?;
        let alteration = if self.eat_keyword(Keyword::Add)? {
            if self.eat_keyword(Keyword::Column)? {
                TableAlteration::AddColumn(self.parse_column_def()?)
            } else if self.check_keyword(Keyword::Row) {
                TableAlteration::AddRowDeletionPolicy(self.parse_row_deletion_policy()?)
            } else {
                TableAlteration::AddConstraint(self.parse_table_constraint()?)
            }
        } else if self.eat_keyword(Keyword::Drop)? {
            if self.eat_keyword(Keyword::Column)? {
                TableAlteration::DropColumn(self.expect_ident()?)
            } else if self.eat_keyword(Keyword::Constraint)? {
                TableAlteration::DropConstraint(self.expect_ident()?)
            } else {
                self.expect_keyword(Keyword::Row)?;
                self.expect_keyword(Keyword::Deletion)?;
                self.expect_keyword(Keyword::Policy)?;
                TableAlteration::DropRowDeletionPolicy
            }
        } else if self.eat_keyword(Keyword::Replace)? {
            TableAlteration::ReplaceRowDeletionPolicy(self.parse_row_deletion_policy()?)
        } else {
            return Err(ParseError::unexpected(
                "ADD, DROP or REPLACE",
                self.current.kind.clone(),
                self.current.span,
            ));
        };
        Ok(AlterTable { table, alteration })
    }

    fn parse_alter_database(&mut self) -> Result<AlterDatabase, ParseError> {
        self.expect_keyword(Keyword::Database)?;
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::Set)?;
        self.expect_keyword(Keyword::Options)?;
        self.expect(&TokenKind::LeftParen)?;

        let mut options = DatabaseOptions::default();
        loop {
            let option = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let key = option.as_str().to_ascii_lowercase();
            match key.as_str() {
                "optimizer_version" => {
                    options.optimizer_version = Some(if self.eat_keyword(Keyword::Null)? {
                        None
                    } else {
                        Some(self.expect_integer()?)
                    });
                }
                "version_retention_period" => {
                    options.version_retention_period = Some(if self.eat_keyword(Keyword::Null)? {
                        None
                    } else {
                        Some(self.expect_string()?)
                    });
                }
                "enable_key_visualizer" => {
                    options.enable_key_visualizer = Some(if self.eat_keyword(Keyword::Null)? {
                        None
                    } else if self.eat_keyword(Keyword::True)? {
                        Some(true)
                    } else {
                        self.expect_keyword(Keyword::False)?;
                        Some(false)
                    });
                }
                "default_leader" => {
                    options.default_leader = Some(if self.eat_keyword(Keyword::Null)? {
                        None
                    } else {
                        Some(self.expect_string()?)
                    });
                }
                _ => {
                    return Err(ParseError::new(
                        format!("unknown database option {key}"),
                        self.current.span,
                    ));
                }
            }
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(AlterDatabase { name, options })
    }

    fn parse_alter_change_stream(&mut self) -> Result<AlterChangeStream, ParseError> {
        self.expect_keyword(Keyword::Change)?;
        self.expect_keyword(Keyword::Stream)?;
        let name = self.parse_path()?;
        let alteration = if self.eat_keyword(Keyword::Set)? {
            if self.check_keyword(Keyword::Options) {
                StreamAlteration::SetOptions(self.parse_options_list()?)
            } else {
                self.expect_keyword(Keyword::For)?;
                if self.eat_keyword(Keyword::All)? {
                    StreamAlteration::SetWatch(Watch::AllTables)
                } else {
                    StreamAlteration::SetWatch(Watch::Tables(self.parse_watch_defs()?))
                }
            }
        } else {
            self.expect_keyword(Keyword::Drop)?;
            self.expect_keyword(Keyword::For)?;
            self.expect_keyword(Keyword::All)?;
            StreamAlteration::DropForAll
        };
        Ok(AlterChangeStream { name, alteration })
    }

    fn parse_alter_index(&mut self) -> Result<AlterIndex, ParseError> {
        self.expect_keyword(Keyword::Index)?;
        let name = self.parse_path()?;
        let alteration = if self.eat_keyword(Keyword::Add)? {
            self.expect_keyword(Keyword::Stored)?;
            self.expect_keyword(Keyword::Column)?;
            IndexAlteration::AddStoredColumn(self.expect_ident()?)
        } else {
            self.expect_keyword(Keyword::Drop)?;
            self.expect_keyword(Keyword::Stored)?;
            self.expect_keyword(Keyword::Column)?;
            IndexAlteration::DropStoredColumn(self.expect_ident()?)
        };
        Ok(AlterIndex { name, alteration })
    }

    // --- DROP -------------------------------------------------------------

    fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Drop)?;
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => {
                self.advance()?;
                Ok(Statement::DropTable(DropTable {
                    name: self.parse_path()?,
                }))
            }
            TokenKind::Keyword(Keyword::Index) => {
                self.advance()?;
                Ok(Statement::DropIndex(DropIndex {
                    name: self.parse_path()?,
                }))
            }
            TokenKind::Keyword(Keyword::Search) => {
                self.advance()?;
                self.expect_keyword(Keyword::Index)?;
                Ok(Statement::DropSearchIndex(DropSearchIndex {
                    name: self.parse_path()?,
                }))
            }
            TokenKind::Keyword(Keyword::View) => {
                self.advance()?;
                Ok(Statement::DropView(DropView {
                    name: self.parse_path()?,
                }))
            }
            TokenKind::Keyword(Keyword::Role) => {
                self.advance()?;
                Ok(Statement::DropRole(DropRole {
                    name: self.expect_ident()?,
                }))
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.advance()?;
                self.expect_keyword(Keyword::Stream)?;
                Ok(Statement::DropChangeStream(DropChangeStream {
                    name: self.parse_path()?,
                }))
            }
            kind => Err(ParseError::unexpected(
                "TABLE, INDEX, SEARCH INDEX, VIEW, ROLE or CHANGE STREAM",
                kind.clone(),
                self.current.span,
            )),
        }
    }

    // --- GRANT / REVOKE ---------------------------------------------------

    fn parse_grant(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Grant)?;
        let target = self.parse_grant_target()?;
        self.expect_keyword(Keyword::To)?;
        self.expect_keyword(Keyword::Role)?;
        let roles = self.parse_ident_list()?;
        Ok(Statement::Grant(Grant { target, roles }))
    }

    fn parse_revoke(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Revoke)?;
        let target = self.parse_grant_target()?;
        self.expect_keyword(Keyword::From)?;
        self.expect_keyword(Keyword::Role)?;
        let roles = self.parse_ident_list()?;
        Ok(Statement::Revoke(Revoke { target, roles }))
    }

    fn parse_grant_target(&mut self) -> Result<GrantTarget, ParseError> {
        if self.check_keyword(Keyword::Role) && !self.peek_is_keyword(Keyword::To) {
            // GRANT ROLE a, b TO ROLE c — role membership.
            self.advance()?;
            let names = self.parse_ident_list()?;
            return Ok(GrantTarget::Role { names });
        }

        if self.eat_keyword(Keyword::Execute)? {
            self.expect_keyword(Keyword::On)?;
            self.expect_keyword(Keyword::Table)?;
            self.expect_keyword(Keyword::Function)?;
            let names = self.parse_path_list()?;
            return Ok(GrantTarget::TableFunction { names });
        }

        let privileges = self.parse_privileges()?;
        self.expect_keyword(Keyword::On)?;
        if self.eat_keyword(Keyword::Table)? {
            let names = self.parse_path_list()?;
            Ok(GrantTarget::Table { privileges, names })
        } else if self.eat_keyword(Keyword::View)? {
            let names = self.parse_path_list()?;
            Ok(GrantTarget::View { names })
        } else if self.eat_keyword(Keyword::Change)? {
            self.expect_keyword(Keyword::Stream)?;
            let names = self.parse_path_list()?;
            Ok(GrantTarget::ChangeStream { names })
        } else {
            Err(ParseError::unexpected(
                "TABLE, VIEW, CHANGE STREAM or TABLE FUNCTION",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn parse_privileges(&mut self) -> Result<Vec<TablePrivilege>, ParseError> {
        let mut privileges = Vec::new();
        loop {
            let kind = if self.eat_keyword(Keyword::Select)? {
                PrivilegeKind::Select
            } else if self.eat_keyword(Keyword::Insert)? {
                PrivilegeKind::Insert
            } else if self.eat_keyword(Keyword::Update)? {
                PrivilegeKind::Update
            } else if self.eat_keyword(Keyword::Delete)? {
                PrivilegeKind::Delete
            } else {
                return Err(ParseError::unexpected(
                    "SELECT, INSERT, UPDATE or DELETE",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            };
            let columns = if self.eat(&TokenKind::LeftParen)? {
                let columns = self.parse_ident_list()?;
                self.expect(&TokenKind::RightParen)?;
                columns
            } else {
                Vec::new()
            };
            privileges.push(TablePrivilege { kind, columns });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(privileges)
    }
}

impl std::fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
