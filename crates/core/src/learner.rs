//! Learns folder patterns from existing directory trees.
//!
//! Every directory visited during the walk contributes at most
//! `max_files_per_folder` file names, each labelled with that directory's
//! own name. The cap applies per directory, not per learning path.

use crate::config::{AppConfig, LearnConfig};
use crate::model::Model;
use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use storage::{Store, TrainingCorpus};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Walks `paths`, merges the sampled names into the stored corpus, and
/// retrains. Returns `None` when the merged corpus is too thin to train on.
pub fn analyze_user_patterns(
    store: &Store,
    cfg: &AppConfig,
    paths: &[PathBuf],
) -> anyhow::Result<Option<Model>> {
    let mut rng = match cfg.learn.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    analyze_user_patterns_with_rng(store, cfg, paths, &mut rng)
}

pub fn analyze_user_patterns_with_rng<R: Rng + ?Sized>(
    store: &Store,
    cfg: &AppConfig,
    paths: &[PathBuf],
    rng: &mut R,
) -> anyhow::Result<Option<Model>> {
    let mut corpus = store.load_training_data()?;
    let before = corpus.len();
    let excludes = build_globset(&cfg.learn.exclude)?;

    for root in paths {
        collect_samples(root, &cfg.learn, &excludes, rng, &mut corpus);
    }
    info!(
        "collected {} new samples ({} total)",
        corpus.len() - before,
        corpus.len()
    );

    let classes = corpus.distinct_labels();
    if classes < cfg.learn.min_classes || corpus.len() < cfg.learn.min_samples {
        warn!(
            classes,
            samples = corpus.len(),
            "not enough training data, need {} classes and {} samples",
            cfg.learn.min_classes,
            cfg.learn.min_samples
        );
        return Ok(None);
    }

    let model = Model::fit(&corpus, &cfg.vectorizer, &cfg.classifier)
        .context("fit model on learned patterns")?;
    store.save_training_data(&corpus)?;
    model.save(store)?;
    info!("trained on {} samples across {} folders", corpus.len(), classes);
    Ok(Some(model))
}

/// Appends sampled (file name, parent folder name) pairs for every directory
/// under `root`.
pub fn collect_samples<R: Rng + ?Sized>(
    root: &Path,
    cfg: &LearnConfig,
    excludes: &GlobSet,
    rng: &mut R,
    corpus: &mut TrainingCorpus,
) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !excludes.is_match(e.path()));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        let mut names = match file_names_in(dir, excludes) {
            Ok(n) => n,
            Err(e) => {
                warn!("skipping {:?}: {:#}", dir, e);
                continue;
            }
        };
        if names.len() > cfg.max_files_per_folder {
            names = names
                .choose_multiple(rng, cfg.max_files_per_folder)
                .cloned()
                .collect();
        }

        let label = folder_label(dir);
        debug!("{:?}: {} samples as {:?}", dir, names.len(), label);
        for name in names {
            corpus.push(name, label.clone());
        }
    }
}

/// Non-directory entries directly inside `dir`, sorted by name.
fn file_names_in(dir: &Path, excludes: &GlobSet) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {:?}", dir))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() || excludes.is_match(entry.path()) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn folder_label(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}

pub fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("bad exclude pattern {:?}", pat))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
