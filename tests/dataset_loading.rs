use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aram_board::config::DataConfig;
use aram_board::dataset::{Cell, DataCache, Datasets, NAME_KEY};
use aram_board::error::DataError;
use aram_board::selector::resolve_row;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("aram_board_{tag}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

fn copy_fixture(name: &str, dir: &Path, as_name: &str) {
    fs::copy(fixture_path(name), dir.join(as_name)).expect("fixture should copy");
}

#[test]
fn first_existing_candidate_wins() {
    let dir = scratch_dir("first_candidate");
    fs::write(
        dir.join("champion_master_plus.csv"),
        "champion,games\nZed,40\n",
    )
    .unwrap();
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");

    let config = DataConfig::with_dir(&dir);
    let mut cache = DataCache::new();
    let (table, source) = cache.load_primary(&config.primary_candidates()).unwrap();

    assert_eq!(source, "champion_master_plus.csv");
    assert_eq!(table.names().to_vec(), vec!["Zed".to_string()]);
}

#[test]
fn later_candidate_used_when_earlier_is_absent() {
    let dir = scratch_dir("fallback_candidate");
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");

    let config = DataConfig::with_dir(&dir);
    let mut cache = DataCache::new();
    let datasets = Datasets::load(&mut cache, &config).unwrap();

    assert_eq!(datasets.source_name, "champion_master.csv");
    assert!(datasets.loaded_at.is_some());
    assert_eq!(
        datasets.master.names().to_vec(),
        vec!["Ahri", "Garen", "Lux", "Miss Fortune"]
    );
    assert!(datasets.spell_summary.is_none());
    assert!(datasets.item_summary.is_none());
}

#[test]
fn missing_primary_names_every_candidate() {
    let dir = scratch_dir("no_primary");
    let config = DataConfig::with_dir(&dir);
    let mut cache = DataCache::new();

    let err = Datasets::load(&mut cache, &config).unwrap_err();
    assert!(matches!(err, DataError::MissingData { .. }));
    let msg = err.to_string();
    assert!(msg.contains("champion_master_plus.csv"), "{msg}");
    assert!(msg.contains("champion_master.csv"), "{msg}");
}

#[test]
fn primary_without_name_column_is_rejected() {
    let dir = scratch_dir("no_name_column");
    fs::write(dir.join("champion_master.csv"), "name,games\nAhri,10\n").unwrap();

    let mut cache = DataCache::new();
    let err = cache
        .load_primary(&DataConfig::with_dir(&dir).primary_candidates())
        .unwrap_err();
    match err {
        DataError::MissingColumn { column, .. } => assert_eq!(column, NAME_KEY),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cached_table_is_reused_after_file_removal() {
    let dir = scratch_dir("cache_reuse");
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");
    let candidates = DataConfig::with_dir(&dir).primary_candidates();
    let path = dir.join("champion_master.csv");

    let mut cache = DataCache::new();
    let (first, _) = cache.load_primary(&candidates).unwrap();
    let loaded_at = cache.loaded_at(&path).expect("load time recorded");
    fs::remove_file(&path).unwrap();
    let (second, source) = cache.load_primary(&candidates).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source, "champion_master.csv");
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.loaded_at(&path), Some(loaded_at));
}

#[test]
fn primary_parse_failure_is_fatal() {
    let dir = scratch_dir("primary_bad_utf8");
    fs::write(
        dir.join("champion_master_plus.csv"),
        b"champion,games\n\xff\xfe,10\n",
    )
    .unwrap();
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");

    let mut cache = DataCache::new();
    let err = cache
        .load_primary(&DataConfig::with_dir(&dir).primary_candidates())
        .unwrap_err();
    match err {
        DataError::Csv { path, .. } => {
            assert_eq!(path, dir.join("champion_master_plus.csv"))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cache.is_empty());
}

#[test]
fn duplicate_champions_warn_and_resolve_to_first_row() {
    let dir = scratch_dir("duplicates");
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");

    let mut cache = DataCache::new();
    let datasets = Datasets::load(&mut cache, &DataConfig::with_dir(&dir)).unwrap();

    assert_eq!(cache.warnings().len(), 1);
    assert!(cache.warnings()[0].contains("Ahri"));
    let row = resolve_row(&datasets.master, "Ahri").unwrap();
    assert_eq!(row.index(), 0);
    assert_eq!(row.get("games"), Some(&Cell::Number(1234.0)));
}

#[test]
fn absent_optional_table_is_cached_as_unavailable() {
    let dir = scratch_dir("optional_absent");
    let path = dir.join("spell_summary.csv");

    let mut cache = DataCache::new();
    assert!(cache.load_optional(&path).is_none());
    fs::copy(fixture_path("spell_summary.csv"), &path).unwrap();
    assert!(cache.load_optional(&path).is_none());
    assert_eq!(cache.len(), 1);
    assert!(cache.warnings().is_empty());
}

#[test]
fn unreadable_optional_table_is_unavailable_with_warning() {
    let dir = scratch_dir("optional_bad_utf8");
    let path = dir.join("item_summary.csv");
    fs::write(&path, b"item,games,wins,winrate\n\xff\xfe,1,1,100\n").unwrap();

    let mut cache = DataCache::new();
    assert!(cache.load_optional(&path).is_none());
    assert_eq!(cache.warnings().len(), 1);
    assert!(cache.warnings()[0].contains("item_summary.csv"));
}

#[test]
fn summaries_missing_required_columns_are_unavailable() {
    let dir = scratch_dir("summary_validation");
    copy_fixture("champion_master.csv", &dir, "champion_master.csv");
    copy_fixture("spell_summary.csv", &dir, "spell_summary.csv");
    copy_fixture("item_summary_no_winrate.csv", &dir, "item_summary.csv");

    let mut cache = DataCache::new();
    let datasets = Datasets::load(&mut cache, &DataConfig::with_dir(&dir)).unwrap();

    let spells = datasets.spell_summary.as_ref().expect("spell summary is valid");
    assert_eq!(spells.label_column(), "spell_combo");
    assert_eq!(spells.table().len(), 12);
    assert!(datasets.item_summary.is_none());
}
