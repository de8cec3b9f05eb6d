//! Moves the direct file children of a directory into per-label subfolders.

use crate::error::OrganizeError;
use crate::model::Model;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the file where it is and report an error.
    #[default]
    Fail,
    Skip,
    /// Move under a free `name_N.ext`.
    Rename,
}

impl std::str::FromStr for ConflictPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(ConflictPolicy::Fail),
            "skip" => Ok(ConflictPolicy::Skip),
            "rename" => Ok(ConflictPolicy::Rename),
            other => {
                anyhow::bail!("unknown conflict policy {other:?}, expected fail|skip|rename")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    pub conflict: ConflictPolicy,
    pub dry_run: bool,
}

impl From<&crate::config::OrganizeConfig> for OrganizeOptions {
    fn from(cfg: &crate::config::OrganizeConfig) -> Self {
        Self {
            conflict: cfg.conflict,
            dry_run: cfg.dry_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Moved { to: PathBuf },
    Planned { to: PathBuf },
    AlreadyInPlace,
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    pub label: Option<String>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    pub items: Vec<ItemOutcome>,
}

impl OrganizeReport {
    pub fn moved(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Moved { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.status)).count()
    }
}

/// Classifies every regular file directly under `target` and moves it into
/// `target/<label>/`. Per-file problems end up in the report; only failing
/// to list `target` itself is an error.
///
/// `progress` receives `processed / total * 100` after every file, or a
/// single `100.0` when there is nothing to do.
pub fn organize_items(
    target: &Path,
    model: &Model,
    options: OrganizeOptions,
    mut progress: Option<&mut dyn FnMut(f32)>,
) -> anyhow::Result<OrganizeReport> {
    let files = list_files(target)?;
    let total = files.len();
    let mut report = OrganizeReport::default();

    if total == 0 {
        info!("nothing to organize in {:?}", target);
        if let Some(cb) = progress.as_deref_mut() {
            cb(100.0);
        }
        return Ok(report);
    }

    for (processed, path) in files.into_iter().enumerate() {
        let outcome = organize_one(target, &path, model, options);
        if let ItemStatus::Failed { reason } = &outcome.status {
            warn!("error moving item {:?}: {}", path, reason);
        }
        report.items.push(outcome);

        if let Some(cb) = progress.as_deref_mut() {
            cb((processed + 1) as f32 / total as f32 * 100.0);
        }
    }

    info!(
        "organized {:?}: {} moved, {} failed, {} total",
        target,
        report.moved(),
        report.failed(),
        total
    );
    Ok(report)
}

fn list_files(target: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(target).with_context(|| format!("read dir {:?}", target))? {
        let entry = entry.with_context(|| format!("read dir {:?}", target))?;
        match entry.file_type() {
            Ok(ft) if ft.is_file() => files.push(entry.path()),
            Ok(_) => {}
            Err(e) => warn!("skipping {:?}: {}", entry.path(), e),
        }
    }
    files.sort();
    Ok(files)
}

fn organize_one(
    target: &Path,
    path: &Path,
    model: &Model,
    options: OrganizeOptions,
) -> ItemOutcome {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let label = model.predict(&name).to_string();
    debug!("{:?} -> {:?}", name, label);

    let status = match place(target, path, &label, options) {
        Ok(status) => status,
        Err(e) => ItemStatus::Failed {
            reason: e.to_string(),
        },
    };
    ItemOutcome {
        path: path.to_path_buf(),
        label: Some(label),
        status,
    }
}

fn place(
    target: &Path,
    path: &Path,
    label: &str,
    options: OrganizeOptions,
) -> Result<ItemStatus, OrganizeError> {
    let folder = label_folder(target, label)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| OrganizeError::InvalidLabel(label.to_string()))?;
    let dest = folder.join(file_name);

    if options.dry_run {
        return Ok(ItemStatus::Planned { to: dest });
    }

    fs::create_dir_all(&folder).map_err(|e| OrganizeError::io("create", &folder, e))?;
    if is_inside(path, &folder)? {
        return Ok(ItemStatus::AlreadyInPlace);
    }

    let dest = if occupied(&dest) {
        match options.conflict {
            ConflictPolicy::Fail => return Err(OrganizeError::DestinationExists(dest)),
            ConflictPolicy::Skip => {
                return Ok(ItemStatus::Skipped {
                    reason: format!("destination exists: {}", dest.display()),
                })
            }
            ConflictPolicy::Rename => resolve_conflict(&dest),
        }
    } else {
        dest
    };

    fs::rename(path, &dest).map_err(|e| OrganizeError::io("move", path, e))?;
    Ok(ItemStatus::Moved { to: dest })
}

/// `target/label`, provided the label is a single plain path component.
fn label_folder(target: &Path, label: &str) -> Result<PathBuf, OrganizeError> {
    let mut components = Path::new(label).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == label => Ok(target.join(label)),
        _ => Err(OrganizeError::InvalidLabel(label.to_string())),
    }
}

fn is_inside(path: &Path, folder: &Path) -> Result<bool, OrganizeError> {
    let parent = match path.parent() {
        Some(p) => p,
        None => return Ok(false),
    };
    let parent = parent
        .canonicalize()
        .map_err(|e| OrganizeError::io("resolve", parent, e))?;
    let folder = folder
        .canonicalize()
        .map_err(|e| OrganizeError::io("resolve", folder, e))?;
    Ok(parent == folder)
}

/// True for anything at `path`, dangling symlinks included.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn resolve_conflict(dest: &Path) -> PathBuf {
    let stem = dest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut counter = 1;
    loop {
        let name = if ext.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };
        let candidate = parent.join(name);
        if !occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
