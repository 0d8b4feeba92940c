//! Marquee server binary.
//!
//! Serves the movie catalog HTTP API. If the record store cannot be opened
//! at startup the process still comes up, serving seeded data from the
//! in-memory fallback ledger.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use marquee_core::tracing_init::init_tracing;
use marquee_server::auth::TokenIssuer;
use marquee_server::queue::InsertQueue;
use marquee_server::server::{AppState, serve};
use marquee_server::storage::CatalogDatabase;

#[derive(Parser, Debug)]
#[command(name = "marquee-server")]
#[command(version, about = "Marquee movie catalog server")]
struct Args {
    /// TCP bind address
    #[arg(long, default_value = "0.0.0.0:5000", env = "MARQUEE_ADDR")]
    addr: SocketAddr,

    /// Catalog database file path
    #[arg(long, default_value = "data/marquee.db", env = "MARQUEE_DB_PATH")]
    db_path: PathBuf,

    /// Secret used to sign session tokens
    #[arg(long, default_value = "dev-secret-change-me", env = "MARQUEE_JWT_SECRET")]
    jwt_secret: String,

    /// Session token lifetime in seconds (default 7 days)
    #[arg(long, default_value_t = 604_800, env = "MARQUEE_TOKEN_TTL")]
    token_ttl: i64,

    /// Skip the record store entirely and serve from the fallback ledger
    #[arg(long, env = "MARQUEE_OFFLINE")]
    offline: bool,

    /// Disable the insert queue; creates write to the store synchronously
    #[arg(long, env = "MARQUEE_NO_QUEUE")]
    no_queue: bool,

    /// Log level filter (e.g. "info", "debug", "warn")
    #[arg(long, default_value = "info", env = "MARQUEE_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "MARQUEE_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "marquee_server={level},marquee_core={level}",
        level = args.log_level
    );
    init_tracing(&log_filter, args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting marquee-server"
    );

    let tokens = TokenIssuer::new(args.jwt_secret.as_bytes(), args.token_ttl);

    let db = if args.offline {
        info!("Offline mode requested, skipping record store");
        None
    } else {
        match CatalogDatabase::open(&args.db_path).await {
            Ok(db) => Some(db),
            Err(err) => {
                error!(error = %err, path = %args.db_path.display(), "Failed to open record store");
                error!("Running in OFFLINE MODE: serving seeded data from the fallback ledger");
                None
            }
        }
    };

    let state = match db {
        Some(db) if args.no_queue => AppState::store_only(db, tokens),
        Some(db) => {
            let queue = InsertQueue::start(db.clone());
            AppState::new(db, queue, tokens)
        }
        None => AppState::offline(tokens),
    };

    serve(state, args.addr).await
}
