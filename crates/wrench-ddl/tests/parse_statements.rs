//! Parse-and-print coverage for every statement kind.

use wrench_ddl::ast::{Statement, Watch};
use wrench_ddl::parse_ddl;

/// Parses a single statement and returns its canonical SQL.
fn canonical(input: &str) -> String {
    let statements = parse_ddl(input).expect("input parses");
    assert_eq!(statements.len(), 1, "expected a single statement");
    statements[0].to_string()
}

#[test]
fn create_table_basic() {
    assert_eq!(
        canonical(
            "CREATE TABLE Users (
               UserId STRING(36) NOT NULL,
               Name   STRING(MAX),   -- display name
               Age    INT64,
             ) PRIMARY KEY(UserId);"
        ),
        "CREATE TABLE Users (UserId STRING(36) NOT NULL, Name STRING(MAX), Age INT64) \
         PRIMARY KEY (UserId)"
    );
}

#[test]
fn create_table_interleaved_with_policy() {
    assert_eq!(
        canonical(
            "CREATE TABLE Albums (
               UserId  STRING(36) NOT NULL,
               AlbumId INT64 NOT NULL,
               Created TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp = true),
             ) PRIMARY KEY(UserId, AlbumId DESC),
               INTERLEAVE IN PARENT Users ON DELETE CASCADE,
               ROW DELETION POLICY (OLDER_THAN(Created, INTERVAL 30 DAY))"
        ),
        "CREATE TABLE Albums (UserId STRING(36) NOT NULL, AlbumId INT64 NOT NULL, \
         Created TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp = true)) \
         PRIMARY KEY (UserId, AlbumId DESC), INTERLEAVE IN PARENT Users ON DELETE CASCADE, \
         ROW DELETION POLICY (OLDER_THAN(Created, INTERVAL 30 DAY))"
    );
}

#[test]
fn create_table_with_constraints() {
    assert_eq!(
        canonical(
            "CREATE TABLE Orders (
               OrderId INT64 NOT NULL,
               UserId  STRING(36),
               Total   INT64,
               CONSTRAINT FK_OrderUser FOREIGN KEY (UserId) REFERENCES Users (UserId) ON DELETE CASCADE,
               CHECK (Total >= 0),
             ) PRIMARY KEY(OrderId)"
        ),
        "CREATE TABLE Orders (OrderId INT64 NOT NULL, UserId STRING(36), Total INT64, \
         CONSTRAINT FK_OrderUser FOREIGN KEY (UserId) REFERENCES Users (UserId) ON DELETE CASCADE, \
         CHECK (Total >= 0)) PRIMARY KEY (OrderId)"
    );
}

#[test]
fn create_table_generated_and_default() {
    assert_eq!(
        canonical(
            "CREATE TABLE Docs (
               Id    INT64 NOT NULL DEFAULT (0),
               Body  STRING(MAX),
               Body_Tokens TOKENLIST AS (TOKENIZE_FULLTEXT(Body)) STORED HIDDEN,
             ) PRIMARY KEY(Id)"
        ),
        "CREATE TABLE Docs (Id INT64 NOT NULL DEFAULT (0), Body STRING(MAX), \
         Body_Tokens TOKENLIST AS (TOKENIZE_FULLTEXT(Body)) STORED HIDDEN) PRIMARY KEY (Id)"
    );
}

#[test]
fn create_table_array_and_reserved_name() {
    assert_eq!(
        canonical(
            "CREATE TABLE t (
               id INT64 NOT NULL,
               tags ARRAY<STRING(50)>,
               `order` INT64,
             ) PRIMARY KEY(id)"
        ),
        "CREATE TABLE t (id INT64 NOT NULL, tags ARRAY<STRING(50)>, `order` INT64) \
         PRIMARY KEY (id)"
    );
}

#[test]
fn create_index_variants() {
    assert_eq!(
        canonical("CREATE INDEX idx ON t(a)"),
        "CREATE INDEX idx ON t (a)"
    );
    assert_eq!(
        canonical("CREATE UNIQUE NULL_FILTERED INDEX idx ON t(a DESC, b) STORING (c), INTERLEAVE IN p"),
        "CREATE UNIQUE NULL_FILTERED INDEX idx ON t (a DESC, b) STORING (c), INTERLEAVE IN p"
    );
}

#[test]
fn create_search_index() {
    assert_eq!(
        canonical(
            "CREATE SEARCH INDEX DocsIndex ON Docs(Body_Tokens) \
             STORING (Title) PARTITION BY Tenant ORDER BY Created DESC \
             OPTIONS (sort_order_sharding = true)"
        ),
        "CREATE SEARCH INDEX DocsIndex ON Docs (Body_Tokens) STORING (Title) \
         PARTITION BY Tenant ORDER BY Created DESC OPTIONS (sort_order_sharding = true)"
    );
}

#[test]
fn create_view() {
    assert_eq!(
        canonical("CREATE VIEW v SQL SECURITY INVOKER AS SELECT t.a, t.b FROM t"),
        "CREATE VIEW v SQL SECURITY INVOKER AS SELECT t.a, t.b FROM t"
    );
    assert_eq!(
        canonical("CREATE OR REPLACE VIEW v SQL SECURITY DEFINER AS SELECT 1"),
        "CREATE OR REPLACE VIEW v SQL SECURITY DEFINER AS SELECT 1"
    );
}

#[test]
fn create_change_stream() {
    assert_eq!(canonical("CREATE CHANGE STREAM cs"), "CREATE CHANGE STREAM cs");
    assert_eq!(
        canonical("CREATE CHANGE STREAM cs FOR ALL OPTIONS (retention_period = '36h')"),
        "CREATE CHANGE STREAM cs FOR ALL OPTIONS (retention_period = \"36h\")"
    );
    assert_eq!(
        canonical("create change stream cs for t1, t2(a, b)"),
        "CREATE CHANGE STREAM cs FOR t1, t2(a, b)"
    );
}

#[test]
fn alter_change_stream() {
    assert_eq!(
        canonical("ALTER CHANGE STREAM cs SET FOR t1"),
        "ALTER CHANGE STREAM cs SET FOR t1"
    );
    assert_eq!(
        canonical("ALTER CHANGE STREAM cs DROP FOR ALL"),
        "ALTER CHANGE STREAM cs DROP FOR ALL"
    );
    assert_eq!(
        canonical("ALTER CHANGE STREAM cs SET OPTIONS (retention_period = NULL)"),
        "ALTER CHANGE STREAM cs SET OPTIONS (retention_period = null)"
    );
}

#[test]
fn alter_table_forms() {
    assert_eq!(
        canonical("ALTER TABLE t ADD COLUMN c INT64 NOT NULL"),
        "ALTER TABLE t ADD COLUMN c INT64 NOT NULL"
    );
    assert_eq!(
        canonical("ALTER TABLE t DROP COLUMN c"),
        "ALTER TABLE t DROP COLUMN c"
    );
    assert_eq!(
        canonical("ALTER TABLE t ADD CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (b)"),
        "ALTER TABLE t ADD CONSTRAINT fk FOREIGN KEY (a) REFERENCES o (b)"
    );
    assert_eq!(
        canonical("ALTER TABLE t DROP CONSTRAINT fk"),
        "ALTER TABLE t DROP CONSTRAINT fk"
    );
    assert_eq!(
        canonical("ALTER TABLE t REPLACE ROW DELETION POLICY (OLDER_THAN(c, INTERVAL 7 DAY))"),
        "ALTER TABLE t REPLACE ROW DELETION POLICY (OLDER_THAN(c, INTERVAL 7 DAY))"
    );
    assert_eq!(
        canonical("ALTER TABLE t DROP ROW DELETION POLICY"),
        "ALTER TABLE t DROP ROW DELETION POLICY"
    );
}

#[test]
fn alter_index() {
    assert_eq!(
        canonical("ALTER INDEX idx ADD STORED COLUMN c"),
        "ALTER INDEX idx ADD STORED COLUMN c"
    );
    assert_eq!(
        canonical("ALTER INDEX idx DROP STORED COLUMN c"),
        "ALTER INDEX idx DROP STORED COLUMN c"
    );
}

#[test]
fn alter_database_options() {
    assert_eq!(
        canonical(
            "ALTER DATABASE db SET OPTIONS (optimizer_version = 4, \
             version_retention_period = '7d', enable_key_visualizer = true)"
        ),
        "ALTER DATABASE db SET OPTIONS (optimizer_version = 4, \
         version_retention_period = \"7d\", enable_key_visualizer = true)"
    );
    assert_eq!(
        canonical("ALTER DATABASE db SET OPTIONS (optimizer_version = null)"),
        "ALTER DATABASE db SET OPTIONS (optimizer_version = null)"
    );
}

#[test]
fn roles_and_grants() {
    assert_eq!(canonical("CREATE ROLE hr_rep"), "CREATE ROLE hr_rep");
    assert_eq!(canonical("DROP ROLE hr_rep"), "DROP ROLE hr_rep");
    assert_eq!(
        canonical("GRANT SELECT, UPDATE(a, b) ON TABLE t1, t2 TO ROLE r1, r2"),
        "GRANT SELECT, UPDATE(a, b) ON TABLE t1, t2 TO ROLE r1, r2"
    );
    assert_eq!(
        canonical("GRANT SELECT ON VIEW v TO ROLE r"),
        "GRANT SELECT ON VIEW v TO ROLE r"
    );
    assert_eq!(
        canonical("GRANT SELECT ON CHANGE STREAM cs TO ROLE r"),
        "GRANT SELECT ON CHANGE STREAM cs TO ROLE r"
    );
    assert_eq!(
        canonical("GRANT EXECUTE ON TABLE FUNCTION f TO ROLE r"),
        "GRANT EXECUTE ON TABLE FUNCTION f TO ROLE r"
    );
    assert_eq!(
        canonical("GRANT ROLE pii_access TO ROLE hr_manager"),
        "GRANT ROLE pii_access TO ROLE hr_manager"
    );
    assert_eq!(
        canonical("REVOKE SELECT ON TABLE t FROM ROLE r"),
        "REVOKE SELECT ON TABLE t FROM ROLE r"
    );
}

#[test]
fn drop_statements() {
    assert_eq!(canonical("DROP TABLE t"), "DROP TABLE t");
    assert_eq!(canonical("DROP INDEX i"), "DROP INDEX i");
    assert_eq!(canonical("DROP SEARCH INDEX i"), "DROP SEARCH INDEX i");
    assert_eq!(canonical("DROP VIEW v"), "DROP VIEW v");
    assert_eq!(canonical("DROP CHANGE STREAM cs"), "DROP CHANGE STREAM cs");
}

#[test]
fn sequences_and_models_are_captured_raw() {
    let statements = parse_ddl(
        "CREATE SEQUENCE seq OPTIONS (sequence_kind = 'bit_reversed_positive');\n\
         CREATE MODEL m INPUT (a INT64) OUTPUT (b INT64) REMOTE",
    )
    .expect("parses");
    assert!(matches!(statements[0], Statement::CreateSequence(_)));
    assert!(matches!(statements[1], Statement::CreateModel(_)));
    assert!(statements[0].to_string().starts_with("CREATE SEQUENCE seq"));
}

#[test]
fn multi_statement_text_with_empty_statements() {
    let statements = parse_ddl(
        ";;\nCREATE TABLE a (x INT64) PRIMARY KEY(x);\n\n
         CREATE TABLE b (y INT64) PRIMARY KEY(y);;",
    )
    .expect("parses");
    assert_eq!(statements.len(), 2);
}

#[test]
fn schema_qualified_names() {
    assert_eq!(
        canonical("CREATE TABLE billing.Invoices (id INT64) PRIMARY KEY(id)"),
        "CREATE TABLE billing.Invoices (id INT64) PRIMARY KEY (id)"
    );
}

#[test]
fn watch_type_inspection() {
    let statements = parse_ddl("CREATE CHANGE STREAM cs FOR t1(a), t2").expect("parses");
    let Statement::CreateChangeStream(cs) = &statements[0] else {
        panic!("expected change stream");
    };
    let Watch::Tables(defs) = &cs.watch else {
        panic!("expected table watch");
    };
    assert_eq!(defs.len(), 2);
    assert_eq!(defs[0].columns.as_deref().map(<[_]>::len), Some(1));
    assert!(defs[1].columns.is_none());
}

#[test]
fn parse_errors() {
    assert!(parse_ddl("CREATE CHANGE STREAM cs INVALID SCHEMA ()").is_err());
    assert!(parse_ddl("CREATE TABLE t (a INT64) -- missing primary key").is_err());
    assert!(parse_ddl("SELECT 1").is_err());
}
