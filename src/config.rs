use crate::adapters::outbound::{DEFAULT_IP_API_URL, DEFAULT_PUBLIC_IP_URL};

/// Where cached locations are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// SQLite database file
    Sqlite,
    /// In-process map, lost on exit
    Memory,
}

impl StorageKind {
    /// Parse a storage kind; anything unrecognized falls back to SQLite.
    pub fn parse_kind(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::Sqlite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub storage: StorageKind,
    pub db_path: String,
    pub geo_api_url: String,
    pub public_ip_url: String,
    pub http_timeout_secs: u64,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            storage: StorageKind::Sqlite,
            db_path: "locations.db".to_string(),
            geo_api_url: DEFAULT_IP_API_URL.to_string(),
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            http_timeout_secs: 10,
            cors_origins: Vec::new(),
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let listen_addr = std::env::var("LOCFINDER_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let storage = std::env::var("LOCFINDER_STORAGE")
        .map(|v| StorageKind::parse_kind(&v))
        .unwrap_or(defaults.storage);

    let db_path = std::env::var("LOCFINDER_DB_PATH").unwrap_or(defaults.db_path);

    let geo_api_url = std::env::var("LOCFINDER_GEO_API_URL").unwrap_or(defaults.geo_api_url);

    let public_ip_url =
        std::env::var("LOCFINDER_PUBLIC_IP_URL").unwrap_or(defaults.public_ip_url);

    let http_timeout_secs = std::env::var("LOCFINDER_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults.http_timeout_secs);

    let cors_origins = std::env::var("LOCFINDER_CORS_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        listen_addr,
        storage,
        db_path,
        geo_api_url,
        public_ip_url,
        http_timeout_secs,
        cors_origins,
        debug,
    })
}
