//! Runs the blocking pipeline off the async runtime and streams its progress
//! back to the caller's task.

use anyhow::Result;
use filesort_core::config::AppConfig;
use filesort_core::pipeline::{self, PipelineSummary};
use std::path::PathBuf;
use storage::Store;
use tokio::sync::mpsc;
use tokio::task;

pub async fn organize_in_background<F>(
    store: Store,
    cfg: AppConfig,
    target: PathBuf,
    learning_paths: Vec<PathBuf>,
    mut on_progress: F,
) -> Result<PipelineSummary>
where
    F: FnMut(f32),
{
    let (tx, mut rx) = mpsc::unbounded_channel::<f32>();

    let handle = task::spawn_blocking(move || {
        let mut forward = |percent: f32| {
            // receiver gone means nobody is watching; keep organizing
            let _ = tx.send(percent);
        };
        pipeline::run(
            &store,
            &cfg,
            &target,
            &learning_paths,
            Some(&mut forward as &mut dyn FnMut(f32)),
        )
    });

    while let Some(percent) = rx.recv().await {
        on_progress(percent);
    }

    handle.await?
}

/// Runs any other blocking core call on the blocking pool.
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(f).await?
}
