//! CLI command implementations
//!
//! Startup order for `serve`: load config, open the student store, open the
//! user directory, build the services, serve. Any failure before serving
//! halts startup. Stores are closed after the server stops.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{AuthService, JwtConfig, JwtManager, UserDirectory, UserRepository};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::store::{DocumentStore, RecordStore};
use crate::student::{StudentService, SummaryAggregator};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Environment variables that override the config file
pub const ENV_PORT: &str = "PORT";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_DATA_DIR: &str = "ROSTER_DATA_DIR";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// HS256 signing secret. Required by `serve`.
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

impl Config {
    /// Loads the file, applies environment overrides and validates.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CliResult<()> {
        if let Some(data_dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = data_dir;
        }
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.jwt_secret = Some(secret);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| CliError::config_error(format!("Invalid {}: '{}'", ENV_PORT, port)))?;
        }
        Ok(())
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if matches!(&self.jwt_secret, Some(secret) if secret.is_empty()) {
            return Err(CliError::config_error("jwt_secret must not be empty"));
        }

        self.http
            .bind_addr()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    fn require_jwt_secret(&self) -> CliResult<&str> {
        self.jwt_secret.as_deref().ok_or_else(|| {
            CliError::config_error(format!(
                "jwt_secret is required (config file or {})",
                ENV_JWT_SECRET
            ))
        })
    }
}

/// Main CLI entry point. The only function main.rs calls.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Summary { config } => summary(&config),
    }
}

/// Creates `<data_dir>/data`. Refuses an existing data directory.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let dir = logs_dir(data_dir);
    fs::create_dir_all(&dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
    })?;

    write_response(json!({"initialized": true, "data_dir": config.data_dir}))
}

/// Opens both stores and serves HTTP until Ctrl+C or SIGTERM.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event(Event::StartupBegin);

    let config = Config::load(config_path)?;
    let data_dir = config.data_path();
    log_event_with_fields(Event::ConfigLoaded, &[("data_dir", config.data_dir.as_str())]);

    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let secret = config.require_jwt_secret()?;
    let (store, users) = open_stores(data_dir).map_err(|e| {
        let message = e.to_string();
        log_event_with_fields(Event::StartupFailed, &[("error", message.as_str())]);
        e
    })?;

    let metrics = Arc::new(MetricsRegistry::new());
    let students = StudentService::new(store.clone(), metrics.clone());
    let auth = AuthService::new(
        users.clone(),
        JwtManager::new(JwtConfig::with_secret(secret)),
        metrics,
    );

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }
    let server = HttpServer::new(http_config, students, auth);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let served = rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    });

    let closed = close_stores(store.as_ref(), users.as_ref());
    log_event(Event::ShutdownComplete);

    served.and(closed)
}

/// Prints `{total, status, classes}` for the on-disk store.
pub fn summary(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let store = DocumentStore::open(data_dir)
        .map_err(|e| CliError::boot_failed(format!("Failed to open student store: {}", e)))?;

    let summary = SummaryAggregator::summarize(&store)?;
    store.close()?;

    write_response(serde_json::to_value(summary)?)
}

fn logs_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("data")
}

fn is_initialized(data_dir: &Path) -> bool {
    logs_dir(data_dir).is_dir()
}

fn open_stores(data_dir: &Path) -> CliResult<(Arc<dyn RecordStore>, Arc<dyn UserRepository>)> {
    let store = DocumentStore::open(data_dir)
        .map_err(|e| CliError::boot_failed(format!("Failed to open student store: {}", e)))?;
    let count = store.count()?.to_string();
    log_event_with_fields(
        Event::StoreOpened,
        &[("collection", "students"), ("records", count.as_str())],
    );

    let users = UserDirectory::open(data_dir)
        .map_err(|e| CliError::boot_failed(format!("Failed to open user directory: {}", e)))?;
    let count = users
        .count()
        .map_err(|e| CliError::boot_failed(e.to_string()))?
        .to_string();
    log_event_with_fields(
        Event::StoreOpened,
        &[("collection", "users"), ("records", count.as_str())],
    );

    let store: Arc<dyn RecordStore> = Arc::new(store);
    let users: Arc<dyn UserRepository> = Arc::new(users);
    Ok((store, users))
}

fn close_stores(store: &dyn RecordStore, users: &dyn UserRepository) -> CliResult<()> {
    let students = store.close().map_err(|e| CliError::io_error(e.to_string()));
    let accounts = users.close().map_err(|e| CliError::io_error(e.to_string()));
    log_event(Event::StoreClosed);
    students.and(accounts)
}
