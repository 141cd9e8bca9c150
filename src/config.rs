use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "https://api.collegefootballdata.com";

/// Resolved process configuration. Built once in each ingest binary and
/// passed by reference from there on.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub db_path: PathBuf,
    pub base_url: String,
}

/// Load `.env.local` then `.env` if present. Missing files are fine.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = non_empty_env("CFBD_API_KEY")
            .ok_or_else(|| anyhow!("CFBD_API_KEY environment variable not set"))?;
        let db_path = non_empty_env("CFB_DB_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("CFB_DB_PATH environment variable not set"))?;
        let base_url = non_empty_env("CFBD_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            api_key,
            db_path,
            base_url,
        })
    }
}

/// For read-only consumers that never talk to the API.
pub fn db_path_from_env() -> Result<PathBuf> {
    non_empty_env("CFB_DB_PATH")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("CFB_DB_PATH environment variable not set"))
}

fn non_empty_env(key: &str) -> Option<String> {
    let val = std::env::var(key).ok()?;
    let trimmed = val.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key).unwrap_or_else(|| default.to_string())
}

pub fn env_year_or(key: &str, default: i32) -> i32 {
    non_empty_env(key)
        .and_then(|raw| raw.parse::<i32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_fatal() {
        // SAFETY: tests in this module are the only ones touching these vars.
        unsafe {
            std::env::remove_var("CFBD_API_KEY");
            std::env::set_var("CFB_DB_PATH", "/tmp/cfb-test.sqlite");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("CFBD_API_KEY"));
    }
}
