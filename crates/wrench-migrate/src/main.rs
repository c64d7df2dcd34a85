//! wrench CLI
//!
//! Command-line schema management for Cloud Spanner.

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wrench_migrate::prelude::*;

/// Schema migrations for Cloud Spanner.
#[derive(Parser)]
#[command(name = "wrench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ignore ALTER DATABASE ... SET OPTIONS statements on both sides.
    #[arg(long, global = true)]
    ignore_alter_database: bool,

    /// Ignore change stream statements on both sides.
    #[arg(long, global = true)]
    ignore_change_streams: bool,

    /// Ignore CREATE MODEL statements on both sides.
    #[arg(long, global = true)]
    ignore_models: bool,

    /// Ignore CREATE SEQUENCE statements on both sides.
    #[arg(long, global = true)]
    ignore_sequences: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DDL that transforms SOURCE1 into SOURCE2.
    Diff {
        /// Schema to migrate from (file path or spanner:// URI).
        source1: String,
        /// Schema to migrate to.
        source2: String,
    },

    /// Apply the diff between DATABASE and SOURCE to DATABASE.
    Apply {
        /// Target database (spanner:// URI).
        database: String,
        /// Desired schema.
        source: String,
    },

    /// Create DATABASE with SOURCE's statements.
    Create {
        /// Database to create (spanner:// URI).
        database: String,
        /// Schema to create it with.
        source: String,
    },

    /// Print SOURCE's current DDL.
    Export {
        /// Schema to export.
        source: String,
    },

    /// Print the version.
    Version,
}

impl Cli {
    fn ddl_option(&self) -> DdlOption {
        DdlOption {
            ignore_alter_database: self.ignore_alter_database,
            ignore_change_streams: self.ignore_change_streams,
            ignore_models: self.ignore_models,
            ignore_sequences: self.ignore_sequences,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let option = cli.ddl_option();
    match &cli.command {
        Commands::Diff { source1, source2 } => {
            let source1 = Source::new(source1).await?;
            let source2 = Source::new(source2).await?;
            let from = Database::new(&source1.ddl(&option).await?)?;
            let to = Database::new(&source2.ddl(&option).await?)?;

            for operation in diff(&from, &to) {
                println!("{};", operation.sql());
            }
        }

        Commands::Apply { database, source } => {
            let database = Source::new(database).await?;
            let Some(spanner) = database.as_spanner() else {
                anyhow::bail!("DATABASE must be a spanner:// URI");
            };
            let source = Source::new(source).await?;

            let from = Database::new(&database.ddl(&option).await?)?;
            let to = Database::new(&source.ddl(&option).await?)?;
            let operations = diff(&from, &to);
            if operations.is_empty() {
                info!("schema is up to date");
                return Ok(());
            }
            spanner.client().apply(&operations).await?;
        }

        Commands::Create { database, source } => {
            let database = Source::new(database).await?;
            let Some(spanner) = database.as_spanner() else {
                anyhow::bail!("DATABASE must be a spanner:// URI");
            };
            let source = Source::new(source).await?;

            let ddl = source.ddl(&option).await?;
            let statements: Vec<String> = ddl.list.iter().map(ToString::to_string).collect();
            spanner.client().create_database(&statements).await?;
        }

        Commands::Export { source } => {
            let source = Source::new(source).await?;
            for statement in source.ddl(&option).await?.list {
                println!("{statement};");
            }
        }

        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
