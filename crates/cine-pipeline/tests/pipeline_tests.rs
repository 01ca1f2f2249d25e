//! End-to-end tests for the pipeline orchestrator.
//!
//! These run the preprocess and train stages against a directory-backed
//! mirror; collection is exercised at the unit level in cine-processing
//! since it needs a live metadata API.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use tempfile::{tempdir, TempDir};

use cine_learning::{CHAMPION_METRICS_FILE, CHAMPION_MODEL_FILE, METRICS_FILE, MODEL_FILE};
use cine_pipeline::Pipeline;
use cine_processing::{write_frame, Layout, Settings, StorageSettings};

const RUN_ID: &str = "20240101";

struct Fixture {
    pipeline: Pipeline,
    layout: Layout,
    _root: TempDir,
    mirror: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let root = tempdir().unwrap();
    let data_root = root.path().join("data");
    let mirror = root.path().join("mirror");

    let settings = Settings::builder()
        .api_key("test-key")
        .data_root(&data_root)
        .storage(StorageSettings::Local {
            root: mirror.clone(),
        })
        .build()
        .unwrap();

    let layout = settings.layout();
    let pipeline = Pipeline::with_run_id(settings, RUN_ID).unwrap();

    Fixture {
        pipeline,
        layout,
        _root: root,
        mirror,
    }
}

fn raw_frame() -> DataFrame {
    df!(
        "id" => &[1i64, 2, 3, 4, 5],
        "title" => &["Movie A", "Movie B", "Movie C", "Movie D", "Movie E"],
        "popularity" => &[100.0, 150.0, 75.0, 200.0, 120.0],
        "vote_count" => &[300i64, 500, 120, 900, 410],
        "vote_average" => &[7.5, 8.0, 6.5, 9.0, 7.8],
    )
    .unwrap()
}

fn write_local_raw(layout: &Layout) {
    let mut df = raw_frame();
    write_frame(&mut df, &layout.raw_csv(RUN_ID)).unwrap();
}

fn write_local_processed(layout: &Layout, noise: f64) {
    let mut df = df!(
        "popularity" => &[100.0, 150.0, 75.0, 200.0, 120.0],
        "vote_count" => &[300.0, 500.0, 120.0, 900.0, 410.0],
        "vote_average" => &[7.5, 8.0 + noise, 6.5, 9.0, 7.8],
    )
    .unwrap();
    write_frame(&mut df, &layout.processed_csv(RUN_ID)).unwrap();
}

fn mirror_has(mirror: &Path, key: &str) -> bool {
    mirror.join(key).is_file()
}

#[test]
fn test_preprocess_falls_back_to_local_raw() {
    let fx = fixture();
    write_local_raw(&fx.layout);

    let processed = fx.pipeline.preprocess(None).unwrap();

    assert_eq!(processed, fx.layout.processed_csv(RUN_ID));
    assert!(processed.exists());
    assert!(mirror_has(
        &fx.mirror,
        &format!("processed/{RUN_ID}/processed_data.csv")
    ));
}

#[test]
fn test_preprocess_restores_raw_from_mirror() {
    let fx = fixture();

    // Seed only the mirror; the local raw directory stays empty.
    let staging = fx._root.path().join("staging");
    let mut df = raw_frame();
    let staged = staging.join(format!("{RUN_ID}.csv"));
    write_frame(&mut df, &staged).unwrap();
    let mirror_key_dir = fx.mirror.join("raw").join(RUN_ID);
    fs::create_dir_all(&mirror_key_dir).unwrap();
    fs::copy(&staged, mirror_key_dir.join(format!("{RUN_ID}.csv"))).unwrap();

    let processed = fx.pipeline.preprocess(None).unwrap();

    assert!(processed.exists());
    // The restored raw snapshot landed in the canonical local path.
    assert!(fx.layout.raw_csv(RUN_ID).exists());
}

#[test]
fn test_preprocess_without_any_raw_snapshot_fails() {
    let fx = fixture();
    assert!(fx.pipeline.preprocess(None).is_err());
}

#[test]
fn test_train_first_run_promotes_and_archives() {
    let fx = fixture();
    write_local_processed(&fx.layout, 0.0);

    let promoted = fx.pipeline.train(None, "v1").unwrap();
    assert!(promoted);

    // Archive pair on disk and mirrored.
    let output = fx.layout.output_dir(RUN_ID);
    assert!(output.join(MODEL_FILE).exists());
    assert!(output.join(METRICS_FILE).exists());
    assert!(mirror_has(
        &fx.mirror,
        &format!("models/archive/{RUN_ID}/{MODEL_FILE}")
    ));
    assert!(mirror_has(
        &fx.mirror,
        &format!("models/archive/{RUN_ID}/{METRICS_FILE}")
    ));

    // Champion pair on disk and mirrored.
    let champion = fx.layout.champion_dir();
    assert!(champion.join(CHAMPION_MODEL_FILE).exists());
    assert!(champion.join(CHAMPION_METRICS_FILE).exists());
    assert!(mirror_has(
        &fx.mirror,
        &format!("models/champion/{CHAMPION_MODEL_FILE}")
    ));
    assert!(mirror_has(
        &fx.mirror,
        &format!("models/champion/{CHAMPION_METRICS_FILE}")
    ));
}

#[test]
fn test_identical_rerun_keeps_champion() {
    let fx = fixture();
    write_local_processed(&fx.layout, 0.0);

    assert!(fx.pipeline.train(None, "v1").unwrap());
    // Same data, same MSE: ties never promote.
    assert!(!fx.pipeline.train(None, "v2").unwrap());
}

#[test]
fn test_train_without_processed_snapshot_fails() {
    let fx = fixture();
    assert!(fx.pipeline.train(None, "v1").is_err());
}
