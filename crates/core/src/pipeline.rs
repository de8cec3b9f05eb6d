use crate::config::AppConfig;
use crate::default_trainer::train_default_model;
use crate::error::PipelineError;
use crate::learner::analyze_user_patterns;
use crate::model::Model;
use crate::organizer::{organize_items, OrganizeOptions, OrganizeReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use storage::Store;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    Learned,
    Loaded,
    Default,
}

impl ModelSource {
    pub fn describe(&self) -> &'static str {
        match self {
            ModelSource::Learned => "Training model based on selected directories",
            ModelSource::Loaded => "Using existing model",
            ModelSource::Default => "No training data found, using default model",
        }
    }
}

pub fn validate_dir(path: &Path) -> Result<(), PipelineError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::NotADirectory(path.to_path_buf()))
    }
}

/// Picks the model to organize with: learn from `learning_paths` if any are
/// given, else reuse the stored model, else train the default one.
pub fn resolve_model(
    store: &Store,
    cfg: &AppConfig,
    learning_paths: &[PathBuf],
) -> anyhow::Result<(ModelSource, Option<Model>)> {
    if !learning_paths.is_empty() {
        for p in learning_paths {
            validate_dir(p)?;
        }
        let model = analyze_user_patterns(store, cfg, learning_paths)?;
        return Ok((ModelSource::Learned, model));
    }
    if let Some(model) = Model::load(store)? {
        return Ok((ModelSource::Loaded, Some(model)));
    }
    let model = train_default_model(store, cfg)?;
    Ok((ModelSource::Default, Some(model)))
}

#[derive(Debug)]
pub struct PipelineSummary {
    pub source: ModelSource,
    pub report: OrganizeReport,
}

/// Resolves a model and organizes `target` with it.
pub fn run(
    store: &Store,
    cfg: &AppConfig,
    target: &Path,
    learning_paths: &[PathBuf],
    progress: Option<&mut dyn FnMut(f32)>,
) -> anyhow::Result<PipelineSummary> {
    validate_dir(target)?;
    let (source, model) = resolve_model(store, cfg, learning_paths)?;
    info!("{}", source.describe());
    let model = model.ok_or(PipelineError::NoModel)?;

    info!("organizing files in {:?}", target);
    let report = organize_items(
        target,
        &model,
        OrganizeOptions::from(&cfg.organize),
        progress,
    )?;
    Ok(PipelineSummary { source, report })
}
