//! Storage layer: training corpus and model files on local disk.
//!
//! Every write replaces the whole file through a temp file in the data
//! directory. There is no locking; a single writer is assumed.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("corrupt training data in {path:?}: {file_names} file names vs {folder_labels} labels")]
    LengthMismatch {
        path: PathBuf,
        file_names: usize,
        folder_labels: usize,
    },
}

/// Where the store keeps its files. File names are relative to `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub training_data: String,
    pub model: String,
    pub vectorizer: String,
    pub settings: String,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            training_data: "training_data.json".to_string(),
            model: "model.json".to_string(),
            vectorizer: "vectorizer.json".to_string(),
            settings: "settings.json".to_string(),
        }
    }
}

/// Parallel (file name, folder label) sequences used for training.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCorpus {
    pub file_names: Vec<String>,
    pub folder_labels: Vec<String>,
}

impl TrainingCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file_name: impl Into<String>, label: impl Into<String>) {
        self.file_names.push(file_name.into());
        self.folder_labels.push(label.into());
    }

    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    pub fn distinct_labels(&self) -> usize {
        self.folder_labels.iter().collect::<BTreeSet<_>>().len()
    }

    fn check_lengths(&self, path: &Path) -> Result<(), StorageError> {
        if self.file_names.len() != self.folder_labels.len() {
            return Err(StorageError::LengthMismatch {
                path: path.to_path_buf(),
                file_names: self.file_names.len(),
                folder_labels: self.folder_labels.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    paths: StoragePaths,
}

impl Store {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    /// Store rooted at `data_dir` with the default file names.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(StoragePaths {
            data_dir: data_dir.into(),
            ..StoragePaths::default()
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn training_data_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.training_data)
    }

    pub fn model_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.model)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.vectorizer)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.settings)
    }

    /// Returns the stored corpus, or an empty one if nothing was saved yet.
    pub fn load_training_data(&self) -> anyhow::Result<TrainingCorpus> {
        let path = self.training_data_path();
        let corpus: TrainingCorpus = match load_json(&path)? {
            Some(c) => c,
            None => {
                debug!("no training data at {:?}", path);
                return Ok(TrainingCorpus::new());
            }
        };
        corpus.check_lengths(&path)?;
        Ok(corpus)
    }

    pub fn save_training_data(&self, corpus: &TrainingCorpus) -> anyhow::Result<()> {
        let path = self.training_data_path();
        corpus.check_lengths(&path)?;
        save_json(&path, corpus)
    }

    /// Loads the (classifier, vectorizer) pair. Both files must exist.
    pub fn load_model<C, V>(&self) -> anyhow::Result<Option<(C, V)>>
    where
        C: DeserializeOwned,
        V: DeserializeOwned,
    {
        let model_path = self.model_path();
        let vectorizer_path = self.vectorizer_path();
        match (model_path.exists(), vectorizer_path.exists()) {
            (true, true) => {}
            (false, false) => return Ok(None),
            (has_model, has_vectorizer) => {
                warn!(
                    has_model,
                    has_vectorizer, "incomplete model pair on disk, ignoring it"
                );
                return Ok(None);
            }
        }
        let classifier = load_json(&model_path)?;
        let vectorizer = load_json(&vectorizer_path)?;
        Ok(classifier.zip(vectorizer))
    }

    pub fn save_model<C, V>(&self, classifier: &C, vectorizer: &V) -> anyhow::Result<()>
    where
        C: Serialize,
        V: Serialize,
    {
        save_json(&self.model_path(), classifier)?;
        save_json(&self.vectorizer_path(), vectorizer)
    }
}

/// Reads a JSON file. A missing file is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("open {:?}", path)),
    };
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("decode {:?}", path))?;
    Ok(Some(value))
}

/// Writes `value` as JSON, replacing `path` in one rename.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create data dir {:?}", dir))?;
    let mut tmp = NamedTempFile::new_in(dir).context("create temp file")?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("encode {:?}", path))?;
        writer.flush()?;
    }
    tmp.persist(path)
        .with_context(|| format!("replace {:?}", path))?;
    debug!("wrote {:?}", path);
    Ok(())
}
