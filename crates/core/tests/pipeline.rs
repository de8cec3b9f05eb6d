use filesort_core::config::AppConfig;
use filesort_core::default_trainer::train_default_model;
use filesort_core::error::PipelineError;
use filesort_core::learner::analyze_user_patterns;
use filesort_core::model::Model;
use filesort_core::organizer::{organize_items, ConflictPolicy, ItemStatus, OrganizeOptions};
use filesort_core::pipeline::{self, ModelSource};
use std::fs;
use std::path::Path;
use storage::Store;
use tempfile::tempdir;

fn touch(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

fn seeded_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.learn.seed = Some(42);
    cfg
}

fn default_model(data: &Path) -> Model {
    train_default_model(&Store::open(data), &AppConfig::default()).unwrap()
}

#[test]
fn learner_refuses_a_single_folder_name() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let only = temp.path().join("only");
    let names: Vec<String> = (0..20).map(|i| format!("file_{i}.txt")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    touch(&only, &refs);

    let model = analyze_user_patterns(&store, &seeded_config(), &[only]).unwrap();
    assert!(model.is_none());
    assert!(!store.model_path().exists());
    assert!(store.load_training_data().unwrap().is_empty());
}

#[test]
fn learner_refuses_too_few_samples() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let root = temp.path().join("root");
    touch(&root.join("a"), &["one.pdf", "two.pdf"]);
    touch(&root.join("b"), &["one.jpg", "two.jpg"]);

    let model = analyze_user_patterns(&store, &seeded_config(), &[root]).unwrap();
    assert!(model.is_none());
}

#[test]
fn learner_trains_persists_and_accumulates() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let root = temp.path().join("library");
    touch(
        &root.join("invoices"),
        &[
            "invoice_jan.pdf",
            "invoice_feb.pdf",
            "invoice_mar.pdf",
            "invoice_apr.pdf",
            "invoice_may.pdf",
            "invoice_jun.pdf",
        ],
    );
    touch(
        &root.join("photos"),
        &[
            "IMG_0001.jpg",
            "IMG_0002.jpg",
            "IMG_0003.jpg",
            "IMG_0004.jpg",
            "IMG_0005.jpg",
            "IMG_0006.jpg",
        ],
    );

    let cfg = seeded_config();
    let model = analyze_user_patterns(&store, &cfg, &[root.clone()])
        .unwrap()
        .expect("enough data to train");
    assert_eq!(
        model.classes(),
        &["invoices".to_string(), "photos".to_string()]
    );
    assert_eq!(model.predict("invoice_jul.pdf"), "invoices");
    assert_eq!(model.predict("IMG_0042.jpg"), "photos");

    let corpus = store.load_training_data().unwrap();
    assert_eq!(corpus.len(), 12);
    assert!(Model::load(&store).unwrap().is_some());

    analyze_user_patterns(&store, &cfg, &[root]).unwrap().unwrap();
    assert_eq!(store.load_training_data().unwrap().len(), 24);
}

#[test]
fn organizer_reports_progress_per_file() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["photo.png", "notes.txt", "backup.zip", "script.py"]);

    let mut calls: Vec<f32> = Vec::new();
    let mut record = |p: f32| calls.push(p);
    let report = organize_items(
        &target,
        &model,
        OrganizeOptions::default(),
        Some(&mut record as &mut dyn FnMut(f32)),
    )
    .unwrap();

    assert_eq!(calls.len(), 4);
    assert_eq!(calls, vec![25.0, 50.0, 75.0, 100.0]);
    assert_eq!(report.items.len(), 4);
    assert_eq!(report.moved(), 4);
    for item in &report.items {
        let label = item.label.as_deref().unwrap();
        let name = item.path.file_name().unwrap();
        assert!(target.join(label).join(name).is_file());
        assert!(!item.path.exists());
    }
}

#[test]
fn organizer_on_empty_directory_reports_completion() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("empty");
    fs::create_dir_all(target.join("already_a_folder")).unwrap();

    let mut calls: Vec<f32> = Vec::new();
    let mut record = |p: f32| calls.push(p);
    let report = organize_items(
        &target,
        &model,
        OrganizeOptions::default(),
        Some(&mut record as &mut dyn FnMut(f32)),
    )
    .unwrap();

    assert!(report.items.is_empty());
    assert_eq!(calls, vec![100.0]);
}

#[test]
fn organizer_keeps_going_after_a_failed_move() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["a_photo.jpg", "b_notes.txt", "c_archive.zip"]);

    // occupy the destination of the first file
    let blocked_label = model.predict("a_photo.jpg").to_string();
    touch(&target.join(&blocked_label), &["a_photo.jpg"]);

    let mut last = 0.0;
    let mut record = |p: f32| last = p;
    let report = organize_items(
        &target,
        &model,
        OrganizeOptions::default(),
        Some(&mut record as &mut dyn FnMut(f32)),
    )
    .unwrap();

    assert_eq!(last, 100.0);
    assert_eq!(report.items.len(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.moved(), 2);
    let failed = report.failures().next().unwrap();
    assert!(failed.path.ends_with("a_photo.jpg"));
    assert!(target.join("a_photo.jpg").exists());
    assert_eq!(
        fs::read(target.join(&blocked_label).join("a_photo.jpg")).unwrap(),
        b"a_photo.jpg"
    );
}

#[test]
fn rename_policy_keeps_both_files() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["music.mp3"]);
    let label = model.predict("music.mp3").to_string();
    touch(&target.join(&label), &["music.mp3"]);

    let options = OrganizeOptions {
        conflict: ConflictPolicy::Rename,
        dry_run: false,
    };
    let report = organize_items(&target, &model, options, None).unwrap();
    assert_eq!(
        report.items[0].status,
        ItemStatus::Moved {
            to: target.join(&label).join("music_1.mp3")
        }
    );
    assert!(target.join(&label).join("music.mp3").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["video.mp4", "readme.txt"]);

    let options = OrganizeOptions {
        conflict: ConflictPolicy::Fail,
        dry_run: true,
    };
    let report = organize_items(&target, &model, options, None).unwrap();
    assert!(report
        .items
        .iter()
        .all(|i| matches!(i.status, ItemStatus::Planned { .. })));
    let entries = fs::read_dir(&target).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn organizing_twice_moves_nothing_the_second_time() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["photo.png", "notes.txt", "backup.zip"]);

    let first = organize_items(&target, &model, OrganizeOptions::default(), None).unwrap();
    assert_eq!(first.moved(), 3);

    let second = organize_items(&target, &model, OrganizeOptions::default(), None).unwrap();
    assert_eq!(second.moved(), 0);
    assert!(second.items.is_empty());
}

#[test]
fn pipeline_falls_back_to_default_then_reuses_it() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let cfg = AppConfig::default();

    let (source, model) = pipeline::resolve_model(&store, &cfg, &[]).unwrap();
    assert_eq!(source, ModelSource::Default);
    assert!(model.is_some());

    let (source, model) = pipeline::resolve_model(&store, &cfg, &[]).unwrap();
    assert_eq!(source, ModelSource::Loaded);
    assert_eq!(model.unwrap().predict("zip"), "Archives");
}

#[test]
fn pipeline_rejects_missing_directories() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let cfg = AppConfig::default();
    let missing = temp.path().join("nope");

    let err = pipeline::run(&store, &cfg, &missing, &[], None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NotADirectory(_))
    ));

    let err = pipeline::resolve_model(&store, &cfg, &[missing]).unwrap_err();
    assert!(err.downcast_ref::<PipelineError>().is_some());
}

#[test]
fn pipeline_without_enough_learning_data_has_no_model() {
    let temp = tempdir().unwrap();
    let store = Store::open(temp.path().join("data"));
    let cfg = seeded_config();
    let target = temp.path().join("inbox");
    touch(&target, &["photo.png"]);
    let learn = temp.path().join("tiny");
    touch(&learn, &["one.txt"]);

    let err = pipeline::run(&store, &cfg, &target, &[learn], None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoModel)
    ));
    assert!(target.join("photo.png").exists());
}

#[cfg(unix)]
#[test]
fn dangling_symlink_at_destination_is_not_replaced() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["notes.txt"]);
    let label = model.predict("notes.txt").to_string();
    fs::create_dir_all(target.join(&label)).unwrap();
    let link = target.join(&label).join("notes.txt");
    std::os::unix::fs::symlink(temp.path().join("missing"), &link).unwrap();

    let report = organize_items(&target, &model, OrganizeOptions::default(), None).unwrap();
    assert_eq!(report.failed(), 1);
    assert!(target.join("notes.txt").is_file());
    assert!(fs::symlink_metadata(&link)
        .unwrap()
        .file_type()
        .is_symlink());
}

#[test]
fn io_failure_leaves_the_file_in_place() {
    let temp = tempdir().unwrap();
    let model = default_model(&temp.path().join("data"));
    let target = temp.path().join("inbox");
    touch(&target, &["backup.zip"]);
    // a plain file where the label folder should go
    let label = model.predict("backup.zip").to_string();
    fs::write(target.join(&label), b"not a folder").unwrap();

    let report = organize_items(&target, &model, OrganizeOptions::default(), None).unwrap();
    let item = report
        .items
        .iter()
        .find(|i| i.path.ends_with("backup.zip"))
        .unwrap();
    assert!(matches!(item.status, ItemStatus::Failed { .. }));
    assert!(target.join("backup.zip").is_file());
}
