// Copyright 2025 Fernando Borretti
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

use std::env::var_os;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// The configuration file read from the working directory.
pub const CONFIG_FILE: &str = "pairdraw.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "PAIRDRAW_CONFIG";

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the history table lives.
    pub history_file: PathBuf,
    pub reveal: RevealConfig,
}

/// Settings for the animation shown before a draw is printed.
#[derive(Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Number of frames to show. Zero disables the animation.
    pub frames: u32,
    /// Delay between frames.
    pub frame_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from("data").join("history.csv"),
            reveal: RevealConfig::default(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            frames: 12,
            frame_millis: 60,
        }
    }
}

impl Config {
    /// Load the configuration named by `PAIRDRAW_CONFIG`, or `pairdraw.toml`
    /// in the working directory. Without either, use the defaults.
    pub fn load() -> Fallible<Self> {
        match var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return fail(format!(
                        "configuration file {} does not exist.",
                        path.display()
                    ));
                }
                Self::from_path(&path)
            }
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    log::debug!("No {CONFIG_FILE}, using defaults.");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Fallible<Self> {
        log::debug!("Reading configuration from {}.", path.display());
        let text = read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    /// The history file to use, preferring a path given on the command line.
    pub fn history_file(&self, flag: Option<String>) -> PathBuf {
        match flag {
            Some(path) => PathBuf::from(path),
            None => self.history_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_empty_config_is_default() -> Fallible<()> {
        assert_eq!(Config::parse("")?, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_config() -> Fallible<()> {
        let config = Config::parse("[reveal]\nframes = 0\n")?;
        assert_eq!(config.history_file, PathBuf::from("data/history.csv"));
        assert_eq!(config.reveal.frames, 0);
        assert_eq!(config.reveal.frame_millis, 60);
        Ok(())
    }

    #[test]
    fn test_unknown_key() {
        assert!(Config::parse("histroy_file = \"x.csv\"").is_err());
    }

    #[test]
    fn test_flag_overrides_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        write(&path, "history_file = \"draws.csv\"\n")?;
        let config = Config::from_path(&path)?;
        assert_eq!(config.history_file(None), PathBuf::from("draws.csv"));
        assert_eq!(
            config.history_file(Some("other.csv".to_string())),
            PathBuf::from("other.csv")
        );
        Ok(())
    }
}
