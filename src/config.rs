use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Result};
use tracing::info;

pub const PORT_VAR: &str = "FOODGRAM_PORT";
pub const DATABASE_VAR: &str = "FOODGRAM_DATABASE";
pub const FONT_DIR_VAR: &str = "FOODGRAM_FONT_DIR";
pub const FONT_VAR: &str = "FOODGRAM_FONT";
pub const FONT_SIZE_VAR: &str = "FOODGRAM_FONT_SIZE";
pub const LIST_TITLE_VAR: &str = "FOODGRAM_LIST_TITLE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub font_dir: PathBuf,
    pub font: String,
    pub font_size: f32,
    pub list_title: String,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env` is loaded).
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let font_size: f32 = try_load(&lookup, FONT_SIZE_VAR, "12")?;
        if !font_size.is_finite() || font_size <= 0.0 {
            bail!("Invalid {FONT_SIZE_VAR} value '{font_size}': must be a positive number");
        }

        Ok(Self {
            port: try_load(&lookup, PORT_VAR, "8000")?,
            database_path: try_load(&lookup, DATABASE_VAR, "foodgram.db")?,
            font_dir: try_load(&lookup, FONT_DIR_VAR, "fonts")?,
            font: try_load(&lookup, FONT_VAR, "DejaVuSans")?,
            font_size,
            list_title: try_load(&lookup, LIST_TITLE_VAR, "Shopping list")?,
        })
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
    raw.parse()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}
