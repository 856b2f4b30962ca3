//! WoWDB - World of Warcraft character database
//!
//! Serves the web UI by default; `--insert Name-Realm` imports one character,
//! prints the SQL it executed and exits.

use clap::Parser;
use rusqlite::Connection;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wowdb::armory::DEFAULT_ARMORY_URL;
use wowdb::{init_schema, insert_character, ArmoryClient};

/// WoWDB server - imports armory characters into SQLite and browses them
#[derive(Parser, Debug)]
#[command(name = "wowdb")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Keep the database in memory (contents are lost on exit)
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Address to bind the web server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port for the web server
    #[arg(short, long, default_value_t = 4567)]
    port: u16,

    /// Base URL of the armory API
    #[arg(long, env = "WOWDB_ARMORY_URL", default_value = DEFAULT_ARMORY_URL)]
    armory_url: String,

    /// Armory request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Import one character (Name-Realm), print the SQL and exit
    #[arg(long, value_name = "NAME-REALM")]
    insert: Option<String>,
}

/// Returns the default database path: ~/.local/share/wowdb/wowdb.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wowdb")
        .join("wowdb.db")
        .to_string_lossy()
        .to_string()
}

fn open_database(args: &Args) -> Result<Connection, Box<dyn std::error::Error>> {
    if args.in_memory {
        log::info!("Using in-memory database");
        return Ok(Connection::open_in_memory()?);
    }

    let db_path = PathBuf::from(&args.database);
    log::info!("Database path: {}", db_path.display());

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    Ok(Connection::open(&db_path)?)
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("Starting wowdb...");

    let mut conn = match open_database(&args) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    let armory =
        match ArmoryClient::with_timeout(&args.armory_url, Duration::from_secs(args.timeout_secs)) {
            Ok(client) => client,
            Err(e) => {
                log::error!("Failed to create armory client: {}", e);
                std::process::exit(1);
            }
        };

    if let Some(character) = &args.insert {
        if let Err(e) = run_insert(&mut conn, &armory, character).await {
            log::error!("Insert of {} failed: {}", character, e);
            std::process::exit(1);
        }
        return;
    }

    let addr = SocketAddr::new(args.bind, args.port);
    let db = Arc::new(Mutex::new(conn));
    if let Err(e) = wowdb::web::serve(db, Arc::new(armory), addr).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

/// Import one character and print the generated SQL to stdout
async fn run_insert(
    conn: &mut Connection,
    armory: &ArmoryClient,
    character: &str,
) -> wowdb::Result<()> {
    let (name, realm) = wowdb::web::split_slug(character)?;
    let snapshot = armory.fetch_snapshot(&name, &realm).await?;
    let script = insert_character(conn, &snapshot)?;
    println!("{}", script);
    Ok(())
}
