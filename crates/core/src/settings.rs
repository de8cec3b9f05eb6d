//! User-facing settings persisted next to the model files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storage::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => f.write_str("dark"),
            Theme::Light => f.write_str("light"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => anyhow::bail!("unknown theme {other:?}, expected dark or light"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
}

impl Settings {
    /// Reads the settings file; a missing file yields the defaults.
    pub fn load(store: &Store) -> anyhow::Result<Self> {
        Ok(storage::load_json(&store.settings_path())?.unwrap_or_default())
    }

    pub fn save(&self, store: &Store) -> anyhow::Result<()> {
        storage::save_json(&store.settings_path(), self)
    }
}
