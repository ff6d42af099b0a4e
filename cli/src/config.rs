// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use davsync_core::SyncSettings;
use tokio::fs;

/// Environment variable naming the configuration file.
pub const DAVSYNC_CONFIG_ENV: &str = "DAVSYNC_CONFIG";

/// Name of the project configuration file looked up in the first root.
pub const CONFIG_FILE_NAME: &str = "davsync.toml";

/// Loads the `[webdavsync]` settings.
///
/// The file is taken from `path`, then from `DAVSYNC_CONFIG`, then from
/// `davsync.toml` in the first workspace root. Returns `Ok(None)` when no
/// file is found by discovery or the file has no `[webdavsync]` table, so
/// an unconfigured project is not an error.
#[tracing::instrument]
pub async fn parse_config(
    path: Option<PathBuf>,
    roots: &[PathBuf],
) -> Result<Option<SyncSettings>, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(DAVSYNC_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        match roots.first().map(|root| root.join(CONFIG_FILE_NAME)) {
            Some(config) if config.exists() => config,
            _ => {
                tracing::debug!("no configuration file found");
                return Ok(None);
            }
        }
    };

    fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()
        .map(|a| a.webdavsync)
}

#[derive(Debug, serde::Deserialize)]
struct ConfigRaw {
    webdavsync: Option<SyncSettings>,
}

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
