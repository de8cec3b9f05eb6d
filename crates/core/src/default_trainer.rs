use crate::config::AppConfig;
use crate::model::Model;
use anyhow::Context;
use storage::{Store, TrainingCorpus};
use tracing::info;

/// Built-in categories used when no training data has been collected yet.
pub const SEED_CATEGORIES: &[(&str, &[&str])] = &[
    ("Documents", &["doc", "pdf", "text", "notes", "txt", "rtf"]),
    (
        "Media",
        &["photo", "image", "video", "music", "audio", "jpg", "png"],
    ),
    (
        "Code",
        &["code", "source", "script", "python", "java", "js", "html"],
    ),
    ("Archives", &["archive", "zip", "rar", "7z"]),
    ("Others", &["misc", "temp", "download", "stuff"]),
];

pub fn seed_corpus() -> TrainingCorpus {
    let mut corpus = TrainingCorpus::new();
    for (label, names) in SEED_CATEGORIES {
        for name in *names {
            corpus.push(*name, *label);
        }
    }
    corpus
}

/// Fits a model on the stored corpus, or on the seed table if the corpus is
/// empty. Only the model is written back; the corpus is left untouched.
pub fn train_default_model(store: &Store, cfg: &AppConfig) -> anyhow::Result<Model> {
    let mut corpus = store.load_training_data()?;
    if corpus.is_empty() {
        info!("no training data found, using built-in categories");
        corpus = seed_corpus();
    } else {
        info!("retraining on {} stored samples", corpus.len());
    }

    let model = Model::fit(&corpus, &cfg.vectorizer, &cfg.classifier)
        .context("fit default model")?;
    model.save(store)?;
    Ok(model)
}
