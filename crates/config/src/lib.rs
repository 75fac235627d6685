use std::path::PathBuf;
use serde::Deserialize;

/// All configuration for the Seaside Tours API.
///
/// Precedence (lowest to highest): defaults → config file → env var → CLI arg.
/// CLI arg merging is done by the caller after `Config::load()`.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub db_url: String,

    // Server
    pub port: u16,
    pub max_body_mb: usize,
    pub static_dir: PathBuf,

    // Logging
    pub log_level: String,
    pub utc: bool,

    // Auth
    pub jwt_secret: Option<String>,
}

/// Config file layout (~/.seaside/config.toml). All fields optional; they
/// layer on top of compiled-in defaults.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    db_url: Option<String>,
    port: Option<u16>,
    max_body_mb: Option<usize>,
    static_dir: Option<PathBuf>,
    log_level: Option<String>,
    utc: Option<bool>,
    jwt_secret: Option<String>,
}

impl Config {
    /// Config directory: ~/.seaside/
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".seaside")
    }

    /// Config file path: ~/.seaside/config.toml
    pub fn file_path() -> PathBuf {
        Self::dir().join("config.toml")
    }

    /// Load config: defaults → config file → env vars.
    /// CLI args should be merged by the caller afterward.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        // Layer 2: config file
        if let Ok(contents) = std::fs::read_to_string(Self::file_path()) {
            if let Ok(file) = toml::from_str::<FileConfig>(&contents) {
                config.apply_file(file);
            }
        }

        // Layer 3: environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Request body ceiling in bytes. Tour payloads carry base64 images.
    pub fn body_limit(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }

    // --- Private helpers ---

    fn defaults() -> Self {
        Self {
            db_url: "sqlite:seaside.db".to_string(),
            port: 5000,
            max_body_mb: 50,
            static_dir: PathBuf::from("frontend/dist"),
            log_level: "info".to_string(),
            utc: false,
            jwt_secret: None,
        }
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.db_url { self.db_url = v; }
        if let Some(v) = file.port { self.port = v; }
        if let Some(v) = file.max_body_mb { self.max_body_mb = v; }
        if let Some(v) = file.static_dir { self.static_dir = v; }
        if let Some(v) = file.log_level { self.log_level = v; }
        if let Some(v) = file.utc { self.utc = v; }
        if let Some(v) = file.jwt_secret { self.jwt_secret = Some(v); }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("SEASIDE_DB_URL") { self.db_url = v; }
        if let Some(v) = var("SEASIDE_PORT") {
            if let Ok(p) = v.parse() { self.port = p; }
        }
        if let Some(v) = var("SEASIDE_MAX_BODY_MB") {
            if let Ok(mb) = v.parse() { self.max_body_mb = mb; }
        }
        if let Some(v) = var("SEASIDE_STATIC_DIR") { self.static_dir = PathBuf::from(v); }
        if let Some(v) = var("SEASIDE_LOG_LEVEL") { self.log_level = v; }
        if let Some(v) = var("SEASIDE_UTC") {
            self.utc = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = var("JWT_SECRET") {
            if !v.is_empty() { self.jwt_secret = Some(v); }
        }
    }
}
