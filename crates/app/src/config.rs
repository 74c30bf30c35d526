use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, bail};

pub const DATA_FILE_VAR: &str = "READTRACK_DATA_FILE";
pub const LOG_FILE_VAR: &str = "READTRACK_LOG_FILE";
pub const API_URL_VAR: &str = "READTRACK_API_URL";
pub const LOOKUP_TIMEOUT_VAR: &str = "READTRACK_LOOKUP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub api_url: String,
    pub lookup_timeout: Duration,
}

impl Config {
    pub fn from_env(data_dir: &Path) -> anyhow::Result<Self> {
        Self::from_vars(data_dir, |name| std::env::var(name).ok())
    }

    /// Resolves the configuration from `lookup`, falling back to files under
    /// `data_dir`. Empty values count as unset.
    pub fn from_vars(
        data_dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_file = var(DATA_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("books.json"));
        let log_file = var(LOG_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("readtrack.log"));
        let api_url = var(API_URL_VAR)
            .map(|url| url.trim().to_string())
            .unwrap_or_else(|| readtrack_engine::DEFAULT_BASE_URL.to_string());

        let lookup_timeout = match var(LOOKUP_TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("parse {LOOKUP_TIMEOUT_VAR}={raw:?}"))?;
                if secs == 0 {
                    bail!("{LOOKUP_TIMEOUT_VAR} must be positive");
                }
                Duration::from_secs(secs)
            }
            None => readtrack_engine::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            data_file,
            log_file,
            api_url,
            lookup_timeout,
        })
    }
}
