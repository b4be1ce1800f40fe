use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medilog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dose logs are materialized this many days ahead at schedule creation,
/// unless overridden by `MEDILOG_HORIZON_DAYS`.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Default bind address for the local API server.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8321";

/// Get the application data directory
/// ~/Medilog/ on all platforms (user-visible), or `MEDILOG_DATA_DIR`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDILOG_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medilog")
}

/// Get the database file path
pub fn database_path() -> PathBuf {
    app_data_dir().join("medilog.db")
}

/// Bind address for the API server (`MEDILOG_ADDR` or the default)
pub fn bind_addr() -> SocketAddr {
    parse_addr(std::env::var("MEDILOG_ADDR").ok().as_deref())
}

fn parse_addr(value: Option<&str>) -> SocketAddr {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(addr = raw, "Invalid MEDILOG_ADDR, using default");
            DEFAULT_ADDR.parse().expect("default addr is valid")
        }),
        None => DEFAULT_ADDR.parse().expect("default addr is valid"),
    }
}

/// Generation horizon in days (`MEDILOG_HORIZON_DAYS` or the default)
pub fn horizon_days() -> u32 {
    parse_horizon(std::env::var("MEDILOG_HORIZON_DAYS").ok().as_deref())
}

fn parse_horizon(value: Option<&str>) -> u32 {
    match value {
        Some(raw) => match raw.parse::<u32>() {
            Ok(days) if (1..=crate::dosing::MAX_HORIZON_DAYS).contains(&days) => days,
            _ => {
                tracing::warn!(
                    horizon = raw,
                    "Invalid MEDILOG_HORIZON_DAYS, using default"
                );
                DEFAULT_HORIZON_DAYS
            }
        },
        None => DEFAULT_HORIZON_DAYS,
    }
}

/// Fallback tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    format!("{}=debug,info", env!("CARGO_PKG_NAME"))
}
