//! Thin client for the Spanner admin and data APIs.
//!
//! Talks REST (`spanner.googleapis.com/v1`) via `reqwest`: fetch the
//! current DDL, apply DDL batches (long-running operations are polled
//! to completion), create databases, and run partitioned updates for
//! the sentinel backfills. `SPANNER_EMULATOR_HOST`, when set, redirects
//! every call to a plain-HTTP emulator endpoint with no authentication.

use std::sync::Arc;
use std::time::Duration;

use gcp_auth::TokenProvider;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::ddl::Operation;
use crate::error::{Error, Result};

const ADMIN_SCOPE: &str = "https://www.googleapis.com/auth/spanner.admin";
const DATA_SCOPE: &str = "https://www.googleapis.com/auth/spanner.data";

/// Connection parameters extracted from a `spanner://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseId {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl DatabaseId {
    /// `projects/<p>/instances/<i>/databases/<d>`.
    #[must_use]
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }

    /// `projects/<p>/instances/<i>`.
    #[must_use]
    pub fn instance_name(&self) -> String {
        format!("projects/{}/instances/{}", self.project, self.instance)
    }
}

/// Spanner API client bound to one database.
pub struct Client {
    http: reqwest::Client,
    base: String,
    id: DatabaseId,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

#[derive(Debug, Deserialize)]
struct GetDdlResponse {
    #[serde(default)]
    statements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LongRunningOperation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Session {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Transaction {
    id: String,
}

impl Client {
    /// Creates a client for the database.
    ///
    /// `credentials` points at a service-account JSON file; without it,
    /// application-default credentials are used. When
    /// `SPANNER_EMULATOR_HOST` is set, the client talks plain HTTP to
    /// the emulator and skips authentication entirely.
    pub async fn new(id: DatabaseId, credentials: Option<&str>) -> Result<Self> {
        let (base, token_provider) = match std::env::var("SPANNER_EMULATOR_HOST") {
            Ok(host) => (format!("http://{host}"), None),
            Err(_) => {
                let provider: Arc<dyn TokenProvider> = match credentials {
                    Some(path) => Arc::new(gcp_auth::CustomServiceAccount::from_file(path)?),
                    None => gcp_auth::provider().await?,
                };
                (String::from("https://spanner.googleapis.com"), Some(provider))
            }
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            id,
            token_provider,
        })
    }

    async fn bearer(&self, scope: &'static str) -> Result<Option<String>> {
        match &self.token_provider {
            None => Ok(None),
            Some(provider) => {
                let token = provider.token(&[scope]).await?;
                Ok(Some(token.as_str().to_string()))
            }
        }
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        scope: &'static str,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}/v1/{path}", self.base);
        debug!(%method, %url, "spanner api request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = self.bearer(scope).await? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::Rpc(format!("{status}: {message}")));
        }
        Ok(payload)
    }

    /// Fetches the database's current DDL as a single `;`-joined text.
    pub async fn get_database_ddl(&self) -> Result<String> {
        let path = format!("{}/ddl", self.id.resource_name());
        let payload = self
            .request(reqwest::Method::GET, &path, ADMIN_SCOPE, None)
            .await?;
        let response: GetDdlResponse =
            serde_json::from_value(payload).map_err(|e| Error::Rpc(e.to_string()))?;
        Ok(response.statements.join(";\n"))
    }

    /// Creates the database, running `extra_statements` after creation.
    pub async fn create_database(&self, extra_statements: &[String]) -> Result<()> {
        let body = json!({
            "createStatement": format!("CREATE DATABASE `{}`", self.id.database),
            "extraStatements": extra_statements,
        });
        let path = format!("{}/databases", self.id.instance_name());
        let payload = self
            .request(reqwest::Method::POST, &path, ADMIN_SCOPE, Some(body))
            .await?;
        self.wait_operation(payload).await
    }

    /// Submits one admin DDL batch and waits for it to complete.
    pub async fn update_database_ddl(&self, statements: &[String]) -> Result<()> {
        info!(count = statements.len(), "updating database ddl");
        let body = json!({ "statements": statements });
        let path = format!("{}/ddl", self.id.resource_name());
        let payload = self
            .request(reqwest::Method::PATCH, &path, ADMIN_SCOPE, Some(body))
            .await?;
        self.wait_operation(payload).await
    }

    async fn wait_operation(&self, payload: Value) -> Result<()> {
        let mut operation: LongRunningOperation =
            serde_json::from_value(payload).map_err(|e| Error::Rpc(e.to_string()))?;
        while !operation.done {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let name = operation.name.clone();
            let payload = self
                .request(reqwest::Method::GET, &name, ADMIN_SCOPE, None)
                .await?;
            operation = serde_json::from_value(payload).map_err(|e| Error::Rpc(e.to_string()))?;
        }
        match operation.error {
            Some(error) => Err(Error::Rpc(error.to_string())),
            None => Ok(()),
        }
    }

    /// Runs one statement as a partitioned update and returns the lower
    /// bound on updated rows.
    pub async fn partitioned_update(&self, sql: &str) -> Result<i64> {
        info!(%sql, "running partitioned update");
        let sessions_path = format!("{}/sessions", self.id.resource_name());
        let session: Session = serde_json::from_value(
            self.request(reqwest::Method::POST, &sessions_path, DATA_SCOPE, Some(json!({})))
                .await?,
        )
        .map_err(|e| Error::Rpc(e.to_string()))?;

        let result = self.partitioned_update_in(&session, sql).await;

        // Best-effort session cleanup; the result of the update wins.
        let _ = self
            .request(reqwest::Method::DELETE, &session.name, DATA_SCOPE, None)
            .await;
        result
    }

    async fn partitioned_update_in(&self, session: &Session, sql: &str) -> Result<i64> {
        let begin_path = format!("{}:beginTransaction", session.name);
        let transaction: Transaction = serde_json::from_value(
            self.request(
                reqwest::Method::POST,
                &begin_path,
                DATA_SCOPE,
                Some(json!({ "options": { "partitionedDml": {} } })),
            )
            .await?,
        )
        .map_err(|e| Error::Rpc(e.to_string()))?;

        let execute_path = format!("{}:executeSql", session.name);
        let payload = self
            .request(
                reqwest::Method::POST,
                &execute_path,
                DATA_SCOPE,
                Some(json!({
                    "transaction": { "id": transaction.id },
                    "sql": sql,
                    "seqno": "1",
                })),
            )
            .await?;
        let rows = payload
            .pointer("/stats/rowCountLowerBound")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Ok(rows)
    }

    /// Applies the emitted operation list: consecutive admin DDL
    /// statements are grouped into one `UpdateDatabaseDdl` batch, and
    /// each sentinel `UPDATE` runs as its own partitioned update. The
    /// first error aborts the remainder; prior batches stay applied.
    pub async fn apply(&self, operations: &[Operation]) -> Result<()> {
        let mut batch: Vec<String> = Vec::new();
        for operation in operations {
            if operation.is_partitioned_dml() {
                if !batch.is_empty() {
                    self.update_database_ddl(&batch).await?;
                    batch.clear();
                }
                self.partitioned_update(&operation.sql()).await?;
            } else {
                batch.push(operation.sql());
            }
        }
        if !batch.is_empty() {
            self.update_database_ddl(&batch).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base)
            .field("database", &self.id.resource_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        let id = DatabaseId {
            project: "p".into(),
            instance: "i".into(),
            database: "d".into(),
        };
        assert_eq!(id.resource_name(), "projects/p/instances/i/databases/d");
        assert_eq!(id.instance_name(), "projects/p/instances/i");
    }
}
