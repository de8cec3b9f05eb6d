use serde::{Deserialize, Serialize};
use storage::StoragePaths;

use crate::organizer::ConflictPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StoragePaths,
    pub learn: LearnConfig,
    pub vectorizer: VectorizerConfig,
    pub classifier: ClassifierConfig,
    pub organize: OrganizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    /// Cap on sampled file names per visited directory.
    pub max_files_per_folder: usize,
    pub min_classes: usize,
    pub min_samples: usize,
    pub exclude: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            max_files_per_folder: 100,
            min_classes: 2,
            min_samples: 10,
            exclude: Vec::new(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub min_n: usize,
    pub max_n: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self { min_n: 2, max_n: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub max_iter: usize,
    pub tol: f64,
    pub alpha: f64,
    pub random_state: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-3,
            alpha: 1e-4,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    pub conflict: ConflictPolicy,
    pub dry_run: bool,
}

/// Layers `config/default` (or `path`) and `FILESORT_*` env vars over the
/// built-in defaults.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("FILESORT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
