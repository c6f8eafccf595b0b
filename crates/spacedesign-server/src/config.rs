use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::info;

use spacedesign_db::MEMORY_PATH;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(|key| env::var(key).ok())
    }

    fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = try_load(&lookup, "SPACEDESIGN_HOST", "0.0.0.0")?;
        let port = try_load(&lookup, "SPACEDESIGN_PORT", "5000")?;
        let db_path: PathBuf = try_load(&lookup, "SPACEDESIGN_DB_PATH", MEMORY_PATH)?;

        // Demo data only goes into the throwaway store unless asked for.
        let in_memory = db_path.as_path() == Path::new(MEMORY_PATH);
        let seed_default = if in_memory { "true" } else { "false" };
        let seed_demo = try_load(&lookup, "SPACEDESIGN_SEED_DEMO", seed_default)?;

        Ok(Self {
            host,
            port,
            db_path,
            seed_demo,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}"))
}
