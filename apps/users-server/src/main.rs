use anyhow::{anyhow, bail, Context, Result};
use api_ingress::ApiIngressConfig;
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliOverrides, DatabaseConfig, ServerConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use users_info::config::UsersInfoConfig;
use users_info::UsersInfo;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNS: u32 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create database dir {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Users Server - CRUD backend for the user resource
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - CRUD backend for the user resource")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database instead of the configured one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
    });

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");
    tracing::debug!(server = ?config.server, "Effective server configuration");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, cli.mock).await,
        Commands::Check => check_config(config, cli.mock),
    }
}

/// Detect DB backend from URL scheme. Only SQLite is compiled in.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Final DSN to connect to: in-memory under `--mock`, otherwise the
/// configured SQLite file resolved against `base_dir`.
fn resolve_dsn(config: &AppConfig, mock: bool, create_dirs: bool) -> Result<String> {
    if mock {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configured (set `database.url` or pass --mock)"))?;
    detect_from_dsn(db_config)?;
    absolutize_sqlite_dsn(
        db_config.url.trim(),
        Path::new(&config.server.home_dir),
        create_dirs,
    )
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr> {
    let raw = format!("{}:{}", server.host, server.port);
    raw.to_socket_addrs()
        .with_context(|| format!("Invalid bind address '{}'", raw))?
        .next()
        .ok_or_else(|| anyhow!("Invalid bind address '{}': no usable address", raw))
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    config.module_config(api_ingress::NAME)
}

async fn connect_database(
    dsn: &str,
    db_config: Option<&DatabaseConfig>,
) -> Result<DatabaseConnection> {
    let in_memory = dsn == MEMORY_DSN;
    // Each in-memory connection is its own database.
    let max_conns = if in_memory {
        1
    } else {
        db_config
            .and_then(|c| c.max_conns)
            .unwrap_or(DEFAULT_MAX_CONNS)
    };
    let busy_timeout = Duration::from_millis(
        db_config
            .and_then(|c| c.busy_timeout_ms)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS) as u64,
    );

    let mut opts = ConnectOptions::new(dsn.to_owned());
    opts.max_connections(max_conns)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy_timeout).create_if_missing(true));

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", dsn))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, stopping"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

async fn run_server(config: AppConfig, mock: bool) -> Result<()> {
    tracing::info!("Initializing modules...");

    let ingress_cfg = ingress_config(&config)?;
    let users_cfg: UsersInfoConfig = config.module_config(UsersInfo::NAME)?;
    let addr = bind_addr(&config.server)?;

    let dsn = resolve_dsn(&config, mock, true)?;
    let db = connect_database(&dsn, config.database.as_ref()).await?;

    UsersInfo::migrate(&db).await?;
    let users = UsersInfo::init(db, &users_cfg)?;

    let router = api_ingress::build_router(users.register_rest(Router::new()), &ingress_cfg);
    api_ingress::serve(router, addr, shutdown_signal()).await
}

fn check_config(config: AppConfig, mock: bool) -> Result<()> {
    tracing::info!("Checking configuration...");

    bind_addr(&config.server)?;
    ingress_config(&config)?;
    let _: UsersInfoConfig = config.module_config(UsersInfo::NAME)?;
    resolve_dsn(&config, mock, false)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
