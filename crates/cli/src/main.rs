use anyhow::Result;
use clap::{Parser, Subcommand};
use filesort_cli::{report, worker};
use filesort_core::config::{self, AppConfig};
use filesort_core::default_trainer;
use filesort_core::learner;
use filesort_core::model::Model;
use filesort_core::organizer::ConflictPolicy;
use filesort_core::pipeline;
use filesort_core::settings::{Settings, Theme};
use std::io::Write;
use std::path::PathBuf;
use storage::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.storage.data_dir = dir;
    }
    let store = Store::new(cfg.storage.clone());

    match cli.command {
        Commands::Learn { paths, json } => run_learn(store, cfg, paths, json).await,
        Commands::TrainDefault => run_train_default(store, cfg).await,
        Commands::Predict { names } => run_predict(store, cfg, names).await,
        Commands::Organize {
            target,
            learn,
            dry_run,
            conflict,
            json,
            verbose,
        } => {
            if dry_run {
                cfg.organize.dry_run = true;
            }
            if let Some(c) = conflict {
                cfg.organize.conflict = c.parse::<ConflictPolicy>()?;
            }
            run_organize(store, cfg, target, learn, json, verbose).await
        }
        Commands::Settings { action } => run_settings(&store, action),
    }
}

#[derive(Parser)]
#[command(name = "filesort")]
#[command(about = "Learns how you file things and sorts folders the same way", long_about = None)]
struct Cli {
    /// Path to config file (TOML, JSON, YAML)
    #[arg(short, long)]
    config: Option<String>,

    /// Directory holding training data, model and settings files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn folder patterns from existing directory trees
    Learn {
        /// Directories to learn from
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Train on stored data, or on the built-in categories if there is none
    TrainDefault,
    /// Print the predicted folder for each file name
    Predict {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
    /// Move the files in a directory into predicted subfolders
    Organize {
        /// Directory whose files are sorted (not recursive)
        target: PathBuf,
        /// Retrain from these directories first (repeatable)
        #[arg(long)]
        learn: Vec<PathBuf>,
        /// Only print what would happen
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Conflict policy: fail|skip|rename
        #[arg(long)]
        conflict: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Verbose per-file output (non-JSON)
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings as JSON
    Show,
    /// Set the theme (dark|light)
    Theme { theme: String },
}

async fn run_learn(store: Store, cfg: AppConfig, paths: Vec<PathBuf>, json: bool) -> Result<()> {
    for p in &paths {
        pipeline::validate_dir(p)?;
    }
    let model_store = store.clone();
    let model = worker::run_blocking(move || {
        learner::analyze_user_patterns(&model_store, &cfg, &paths)
    })
    .await?;
    let Some(model) = model else {
        anyhow::bail!("not enough training data: need at least two folders and ten files");
    };
    let corpus = store.load_training_data()?;
    info!("learned {} folders from {} samples", model.classes().len(), corpus.len());
    if json {
        let summary = serde_json::json!({
            "status": "ok",
            "samples": corpus.len(),
            "classes": model.classes(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "learn: {} samples, {} folders: {}",
            corpus.len(),
            model.classes().len(),
            model.classes().join(", ")
        );
    }
    Ok(())
}

async fn run_train_default(store: Store, cfg: AppConfig) -> Result<()> {
    let model =
        worker::run_blocking(move || default_trainer::train_default_model(&store, &cfg)).await?;
    println!("trained default model: {}", model.classes().join(", "));
    Ok(())
}

async fn run_predict(store: Store, cfg: AppConfig, names: Vec<String>) -> Result<()> {
    let (source, model) =
        worker::run_blocking(move || pipeline::resolve_model(&store, &cfg, &[])).await?;
    let model: Model = model.ok_or(filesort_core::error::PipelineError::NoModel)?;
    info!("{}", source.describe());
    for name in names {
        println!("{}\t{}", model.predict(&name), name);
    }
    Ok(())
}

async fn run_organize(
    store: Store,
    cfg: AppConfig,
    target: PathBuf,
    learn: Vec<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let summary = worker::organize_in_background(store, cfg, target, learn, |percent| {
        if !json {
            eprint!("\rorganizing... {:5.1}%", percent);
            let _ = std::io::stderr().flush();
        }
    })
    .await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::summary_json(&summary))?
        );
    } else {
        eprintln!();
        println!("{}", report::render_text(&summary.report, verbose));
    }
    Ok(())
}

fn run_settings(store: &Store, action: SettingsAction) -> Result<()> {
    let mut settings = Settings::load(store)?;
    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Theme { theme } => {
            settings.theme = theme.parse::<Theme>()?;
            settings.save(store)?;
            println!("theme set to {}", settings.theme);
        }
    }
    Ok(())
}
