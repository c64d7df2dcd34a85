//! Schema sources: where DDL text comes from.
//!
//! A source is either a local file (`file://` or a bare path) or a
//! remote database (`spanner://projects/<p>/instances/<i>/databases/<d>
//! [?credentials=<path>]`).

use url::Url;

use crate::client::{Client, DatabaseId};
use crate::ddl::{parse_ddl, Ddl, DdlOption};
use crate::error::{Error, Result};

/// Returns the scheme of a source URI, or `""` for bare paths.
#[must_use]
pub fn scheme(uri: &str) -> &str {
    match uri.split_once("://") {
        Some((scheme, _)) => scheme,
        None => "",
    }
}

/// A resolved schema source.
pub enum Source {
    File(FileSource),
    Spanner(SpannerSource),
}

impl Source {
    /// Resolves a URI into a source. Spanner sources connect eagerly.
    pub async fn new(uri: &str) -> Result<Self> {
        match scheme(uri) {
            "spanner" => Ok(Self::Spanner(SpannerSource::new(uri).await?)),
            "file" | "" => Ok(Self::File(FileSource::new(uri)?)),
            _ => Err(Error::InvalidSource(uri.to_string())),
        }
    }

    /// The URI this source was created from.
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::File(source) => &source.uri,
            Self::Spanner(source) => &source.uri,
        }
    }

    /// Reads and parses the source's DDL.
    pub async fn ddl(&self, option: &DdlOption) -> Result<Ddl> {
        match self {
            Self::File(source) => source.ddl(option),
            Self::Spanner(source) => source.ddl(option).await,
        }
    }

    /// The spanner source, when this is one.
    #[must_use]
    pub fn as_spanner(&self) -> Option<&SpannerSource> {
        match self {
            Self::Spanner(source) => Some(source),
            Self::File(_) => None,
        }
    }
}

/// A schema file on disk.
pub struct FileSource {
    uri: String,
    path: String,
}

impl FileSource {
    fn new(uri: &str) -> Result<Self> {
        let path = match uri.strip_prefix("file://") {
            Some(path) => path.to_string(),
            None => uri.to_string(),
        };
        Ok(Self {
            uri: uri.to_string(),
            path,
        })
    }

    fn ddl(&self, option: &DdlOption) -> Result<Ddl> {
        let schema = std::fs::read_to_string(&self.path)?;
        parse_ddl(&self.uri, &schema, option)
    }
}

/// A remote database reached through the admin API.
pub struct SpannerSource {
    uri: String,
    client: Client,
}

impl SpannerSource {
    async fn new(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|_| Error::InvalidSource(uri.to_string()))?;
        let mut segments = parsed
            .host_str()
            .into_iter()
            .chain(parsed.path().split('/'))
            .filter(|s| !s.is_empty());

        let mut expect = |keyword: &str| -> Result<String> {
            if segments.next() != Some(keyword) {
                return Err(Error::InvalidSource(uri.to_string()));
            }
            segments
                .next()
                .map(String::from)
                .ok_or_else(|| Error::InvalidSource(uri.to_string()))
        };
        let project = expect("projects")?;
        let instance = expect("instances")?;
        let database = expect("databases")?;

        let credentials = parsed
            .query_pairs()
            .find(|(k, _)| k == "credentials")
            .map(|(_, v)| v.into_owned());

        let client = Client::new(
            DatabaseId {
                project,
                instance,
                database,
            },
            credentials.as_deref(),
        )
        .await?;
        Ok(Self {
            uri: uri.to_string(),
            client,
        })
    }

    async fn ddl(&self, option: &DdlOption) -> Result<Ddl> {
        let schema = self.client.get_database_ddl().await?;
        parse_ddl(&self.uri, &schema, option)
    }

    /// The underlying API client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme() {
        assert_eq!(scheme("spanner://projects/p/instances/i/databases/d"), "spanner");
        assert_eq!(scheme("file:///tmp/schema.sql"), "file");
        assert_eq!(scheme("/tmp/schema.sql"), "");
    }

    #[test]
    fn test_file_source_path() {
        let source = FileSource::new("file:///tmp/schema.sql").unwrap();
        assert_eq!(source.path, "/tmp/schema.sql");
        let source = FileSource::new("schema.sql").unwrap();
        assert_eq!(source.path, "schema.sql");
    }
}
