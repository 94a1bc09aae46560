use std::str::FromStr;

use anyhow::{Context, Result};

use crate::layout::GridConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; unparsable values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default grid for panel layout requests.
    pub grid: GridConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GridConfig::default();

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            grid: GridConfig {
                tile_size: parse_or(&lookup, "LAYOUT_TILE_SIZE", defaults.tile_size)?,
                canvas_ceiling: parse_or(&lookup, "LAYOUT_CANVAS_CEILING", defaults.canvas_ceiling)?,
                width: parse_or(&lookup, "LAYOUT_WIDTH", defaults.width)?,
                width_offset: parse_or(&lookup, "LAYOUT_WIDTH_OFFSET", defaults.width_offset)?,
                height: parse_or(&lookup, "LAYOUT_HEIGHT", defaults.height)?,
                height_offset: parse_or(&lookup, "LAYOUT_HEIGHT_OFFSET", defaults.height_offset)?,
                dump_reservations: parse_or(
                    &lookup,
                    "LAYOUT_DUMP_RESERVATIONS",
                    defaults.dump_reservations,
                )?,
            },
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
