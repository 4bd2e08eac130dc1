//! metaserv-admin CLI
//!
//! Command-line tool for administering the metadata catalog.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use metaserv_admin::config::{log_level, DEFAULT_AUTH_FILE};
use metaserv_admin::prelude::*;
use metaserv_schema::parse_file;

/// Metadata catalog administration.
#[derive(Parser)]
#[command(name = "metaserv-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity threshold: 10 debug, 20 info, 30 warning, 40 error, 50 critical.
    #[arg(short, long, default_value_t = 10)]
    verbosity: u8,

    /// Log file (stderr if not set).
    #[arg(short = 'f', long)]
    log_file: Option<PathBuf>,

    /// Connection file of the catalog database.
    #[arg(short, long, env = "METASERV_AUTH", default_value = DEFAULT_AUTH_FILE)]
    auth: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog tables.
    Init,

    /// Read admin statements interactively (the default).
    Shell,

    /// Execute admin statements, stopping at the first error.
    Exec {
        /// Statements, each terminated by ';'.
        statements: String,
    },

    /// Parse an annotated schema file and print it as JSON.
    Parse {
        /// Schema file.
        schema_file: PathBuf,
    },

    /// Look up registered metadata.
    Query {
        #[command(subcommand)]
        query: Query,
    },
}

#[derive(Subcommand)]
enum Query {
    /// Levels with registered databases.
    Levels,
    /// Databases registered at a level.
    Dbs {
        /// Level.
        level: String,
    },
    /// One database.
    Db {
        /// Database name.
        db: String,
    },
    /// Tables of a database.
    Tables {
        /// Database name.
        db: String,
    },
    /// One table.
    Table {
        /// Database name.
        db: String,
        /// Table name.
        table: String,
    },
    /// Columns of a table.
    Columns {
        /// Database name.
        db: String,
        /// Table name.
        table: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_catalog(auth: &Path) -> anyhow::Result<(Catalog, ConnectionConfig)> {
    let config = ConnectionConfig::from_file(auth)?;
    let catalog = Catalog::connect(&config).await?;
    Ok((catalog, config))
}

async fn run_query(catalog: &Catalog, query: Query) -> anyhow::Result<()> {
    let queries = CatalogQueries::new(catalog);
    match query {
        Query::Levels => print_json(&queries.levels().await?),
        Query::Dbs { level } => print_json(&queries.databases(&level).await?),
        Query::Db { db } => print_json(&queries.database(&db).await?),
        Query::Tables { db } => print_json(&queries.tables(&db).await?),
        Query::Table { db, table } => print_json(&queries.table(&db, &table).await?),
        Query::Columns { db, table } => print_json(&queries.columns(&db, &table).await?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbosity))
        .with_target(false);
    match &cli.log_file {
        Some(path) => {
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(File::create(path)?))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = builder
                .without_time()
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Parse { schema_file } => {
            let model = parse_file(&schema_file)?;
            print_json(&model)?;
        }

        Commands::Init => {
            let (catalog, _) = open_catalog(&cli.auth).await?;
            catalog.ensure_schema().await?;
            info!("Catalog tables created.");
            catalog.close().await;
        }

        Commands::Query { query } => {
            let (catalog, _) = open_catalog(&cli.auth).await?;
            run_query(&catalog, query).await?;
            catalog.close().await;
        }

        Commands::Exec { statements } => {
            let (catalog, config) = open_catalog(&cli.auth).await?;
            let admin = MetaAdmin::new(catalog, config);
            for message in CommandShell::new(&admin).execute_script(&statements).await? {
                println!("{message}");
            }
        }

        Commands::Shell => {
            let (catalog, config) = open_catalog(&cli.auth).await?;
            let admin = MetaAdmin::new(catalog, config);
            let mut stdout = io::stdout();
            CommandShell::new(&admin)
                .run(BufReader::new(io::stdin()), &mut stdout)
                .await?;
        }
    }

    Ok(())
}
