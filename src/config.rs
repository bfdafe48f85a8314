// Copyright 2026 Scenehunt Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search_url: String,
    pub cut_borders: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_timeout_secs: Option<u64>,
    pub metadata_url: String,
    pub metadata_timeout_secs: u64,
    pub metadata_ttl_secs: u64,
    pub metadata_miss_ttl_secs: u64,
    pub allow_adult: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_url: "https://api.trace.moe/search".to_string(),
            cut_borders: true,
            search_timeout_secs: None,
            metadata_url: "https://graphql.anilist.co".to_string(),
            metadata_timeout_secs: DEFAULT_METADATA_TIMEOUT_SECS,
            metadata_ttl_secs: 3600,
            metadata_miss_ttl_secs: 60,
            allow_adult: false,
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("scenehunt").join("scenehunt.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut config: Config = toml::from_str(&text).context("parse scenehunt.toml")?;
    if config.metadata_timeout_secs == 0 {
        config.metadata_timeout_secs = DEFAULT_METADATA_TIMEOUT_SECS;
    }
    if config.metadata_miss_ttl_secs > config.metadata_ttl_secs {
        config.metadata_miss_ttl_secs = config.metadata_ttl_secs;
    }
    Ok(config)
}

pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {parent:?}"))?;
    }
    let text = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
