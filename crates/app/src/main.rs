use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use seaside_config::Config;
use sqlx::SqlitePool;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::OffsetTime;

mod seed;

// --- CLI definition ---

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "seaside")]
#[command(about = "Seaside Tours booking and catalog API")]
#[command(version = seaside_server::VERSION)]
struct Cli {
    /// Log level (default: from config, else info)
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,

    /// Display log timestamps in UTC (default: local time)
    #[arg(long, global = true)]
    utc: bool,

    /// Database URL (default: from config, else sqlite:seaside.db)
    #[arg(long, global = true)]
    db_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Replace all data with the starter catalog and provision the admin
    Seed {
        /// Directory holding tours.json and reviews.json
        #[arg(long, default_value = "data")]
        data: PathBuf,
        /// Admin username
        #[arg(long, default_value = "admin")]
        admin_username: String,
        /// Admin password
        #[arg(long, default_value = "admin")]
        admin_password: String,
    },
    /// Delete all tours, bookings and the admin credential
    Destroy,
    /// Create or replace the admin credential
    SetAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

/// Layers CLI flags over the loaded config.
fn merge_cli(mut config: Config, cli: &Cli) -> Config {
    if let Some(level) = &cli.log_level { config.log_level = level.to_string(); }
    if cli.utc { config.utc = true; }
    if let Some(url) = &cli.db_url { config.db_url = url.clone(); }
    if let Commands::Serve { port: Some(port) } = cli.command { config.port = port; }
    config
}

// --- Logging ---

fn init_logging(config: &Config) {
    let filter = EnvFilter::new(&config.log_level);

    if config.utc {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(OffsetTime::new(
                time::UtcOffset::UTC,
                time::macros::format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                ),
            ))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(LocalTimer)
            .init();
    }
}

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

// --- Server ---

async fn run_server(config: &Config, pool: SqlitePool) -> anyhow::Result<()> {
    info!("Seaside Tours API v{}", seaside_server::VERSION);

    let secret = config
        .jwt_secret
        .as_deref()
        .context("JWT secret not configured; set JWT_SECRET or jwt_secret in the config file")?;
    let state = seaside_server::AppState::new(pool, secret);

    let index = config.static_dir.join("index.html");
    let app = seaside_server::router(state, config.body_limit())
        .fallback_service(ServeDir::new(&config.static_dir).fallback(ServeFile::new(index)));

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = merge_cli(Config::load(), &cli);
    init_logging(&config);

    let pool = seaside_db::connect(&config.db_url).await?;
    seaside_db::migrate(&pool).await?;

    match cli.command {
        Commands::Serve { .. } => {
            run_server(&config, pool).await?;
        }
        Commands::Seed { data, admin_username, admin_password } => {
            seed::run(&pool, &data, &admin_username, &admin_password).await?;
            println!("Data imported.");
        }
        Commands::Destroy => {
            seaside_db::clear_all(&pool).await?;
            println!("Data destroyed.");
        }
        Commands::SetAdmin { username, password } => {
            let hash = seaside_server::auth::hash_password(&password)?;
            let admin = seaside_db::set_admin(&pool, &username, &hash).await?;
            println!("Admin set: {} (id={})", admin.username, admin.key);
        }
    }

    Ok(())
}
