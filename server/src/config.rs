use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use platform_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, StoreConfig};

const APP_DIR: &str = "staff-console";
const STORAGE_FILE: &str = "storage.json";

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub store: StoreConfig,
    pub storage_path: PathBuf,
}

impl ConsoleConfig {
    /// Flags win over the environment; clap has already folded `RECORD_STORE_URL`
    /// and `CONSOLE_STORAGE_PATH` into the flag values.
    pub fn load(store_url: Option<String>, storage_path: Option<PathBuf>) -> Result<Self> {
        let timeout_ms = std::env::var("RECORD_STORE_TIMEOUT_MS").ok();
        Self::from_parts(store_url, timeout_ms, storage_path, dirs::data_local_dir())
    }

    fn from_parts(
        store_url: Option<String>,
        timeout_ms: Option<String>,
        storage_path: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let base_url = store_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let timeout = match timeout_ms.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TIMEOUT,
            Some(raw) => {
                let millis: u64 = raw
                    .parse()
                    .context("invalid RECORD_STORE_TIMEOUT_MS")?;
                if millis == 0 {
                    return Err(anyhow!("RECORD_STORE_TIMEOUT_MS must be greater than zero"));
                }
                Duration::from_millis(millis)
            }
        };

        let storage_path = match storage_path {
            Some(path) => path,
            None => data_dir
                .context("no data directory on this platform; pass --storage")?
                .join(APP_DIR)
                .join(STORAGE_FILE),
        };

        Ok(Self {
            store: StoreConfig::new(base_url).with_timeout(timeout),
            storage_path,
        })
    }
}
