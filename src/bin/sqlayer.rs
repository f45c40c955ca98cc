use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use sqlayer::{ConnectionRegistry, QueryLayer, SpatialiteConn};
use tracing::Level;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Settings file path, by default $HOME/.sqlayer/sqlayer.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Open this database file directly
    #[clap(short, long)]
    db: Option<String>,

    /// Use a named connection profile from the settings file
    #[clap(short = 'n', long)]
    connection: Option<String>,

    /// Output machine-readable JSON
    #[clap(long)]
    json: bool,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured connection profiles
    Connections,

    /// Show engine and spatial library versions
    Info,

    /// List tables and views with their geometry registration
    Tables {
        /// Include system tables (spatial-index helpers, statistics)
        #[clap(long)]
        all: bool,
    },

    /// Show the column definitions of a table
    Fields { table: String },

    /// Show the indexes of a table
    Indexes { table: String },

    /// Show the triggers of a table
    Triggers { table: String },

    /// Count the rows of a table
    Count { table: String },

    /// Show the defining SQL of a view
    View { name: String },

    /// Run an ad-hoc query: preview its rows, or print its map-layer source
    Sql {
        query: String,

        /// Print the map-layer data-source URI instead of rows
        #[clap(long)]
        layer: bool,

        /// Geometry column of the result set
        #[clap(long, default_value = "the_geom")]
        geometry_column: String,

        /// Column uniquely identifying each result row
        #[clap(long, default_value = "id")]
        key_column: String,

        /// Maximum number of rows to preview
        #[clap(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Rebuild the database file
    Vacuum,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Connections => {
            let registry = ConnectionRegistry::load(cli.config.as_deref())?;
            let names = registry.names();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{name}");
                }
            }
            return Ok(());
        }
        Commands::Sql {
            query,
            layer: true,
            geometry_column,
            key_column,
            ..
        } => {
            let db = open_database(&cli)?;
            let path = db
                .path()
                .ok_or_else(|| anyhow!("layer sources need a file-based database"))?;
            let layer = QueryLayer::new(query.clone())
                .with_geometry_column(geometry_column.clone())
                .with_key_column(key_column.clone());
            println!("{}", layer.source(path));
            return Ok(());
        }
        _ => {}
    }

    let db = open_database(&cli)?;
    match cli.command {
        Commands::Connections => unreachable!("handled above"),
        Commands::Info => {
            let mut info = json!({ "sqlite_version": db.get_info()?, "spatial": db.has_spatial() });
            if db.has_spatial() {
                if let Ok(spatial) = db.get_spatial_info() {
                    info["spatialite"] = serde_json::to_value(&spatial)?;
                }
            }
            print_json(&info, cli.json)?;
        }
        Commands::Tables { all } => {
            let tables: Vec<_> = db
                .list_geo_tables()?
                .into_iter()
                .filter(|t| all || !t.is_system)
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for t in tables {
                    let geom = match (&t.geometry_column, &t.geometry_type) {
                        (Some(col), Some(kind)) => format!(" [{col}: {kind}]"),
                        (Some(col), None) => format!(" [{col}]"),
                        _ => String::new(),
                    };
                    let system = if t.is_system { " (system)" } else { "" };
                    println!("{} ({}){geom}{system}", t.name, t.kind);
                }
            }
        }
        Commands::Fields { table } => {
            print_json(&serde_json::to_value(db.get_table_fields(&table)?)?, cli.json)?;
        }
        Commands::Indexes { table } => {
            print_json(
                &serde_json::to_value(db.get_table_indexes(&table)?)?,
                cli.json,
            )?;
        }
        Commands::Triggers { table } => {
            print_json(
                &serde_json::to_value(db.get_table_triggers(&table)?)?,
                cli.json,
            )?;
        }
        Commands::Count { table } => {
            println!("{}", db.get_table_row_count(&table)?);
        }
        Commands::View { name } => {
            println!("{}", db.get_view_definition(&name)?);
        }
        Commands::Sql { query, limit, .. } => {
            let rows = preview_rows(&db, &query, limit)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Vacuum => {
            db.vacuum()?;
        }
    }

    Ok(())
}

fn open_database(cli: &Cli) -> Result<SpatialiteConn> {
    if let Some(path) = &cli.db {
        return Ok(SpatialiteConn::open(path)?);
    }
    if let Some(name) = &cli.connection {
        let registry = ConnectionRegistry::load(cli.config.as_deref())?;
        return Ok(registry.connect(name)?);
    }
    Err(anyhow!(
        "no database given: pass --db PATH or --connection NAME"
    ))
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

/// Run an arbitrary query and collect up to `limit` rows as JSON objects.
fn preview_rows(db: &SpatialiteConn, query: &str, limit: usize) -> Result<Vec<serde_json::Value>> {
    let conn = db.connection();
    let mut stmt = conn.prepare(query)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        if out.len() >= limit {
            break;
        }
        let mut object = serde_json::Map::new();
        for (i, column) in columns.iter().enumerate() {
            object.insert(column.clone(), value_to_json(row.get_ref(i)?));
        }
        out.push(serde_json::Value::Object(object));
    }
    Ok(out)
}

fn value_to_json(value: rusqlite::types::ValueRef<'_>) -> serde_json::Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => json!(String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => json!(format!("<blob, {} bytes>", b.len())),
    }
}
