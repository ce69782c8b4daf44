use qorb::config::{BenchConfig, ConfigManager};
use qorb::store::{maybe_populate, Library, SeedConfig, SeedOutcome};
use qorb::suite::{Suite, SuiteRunner};
use tempfile::TempDir;

#[test]
fn test_seed_then_run_every_suite_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let config = BenchConfig::quick()
        .with_database_path(temp_dir.path().join("data").join("library.sqlite3"))
        .with_bulk_authors(30);
    config.validate().unwrap();

    let library = Library::open(&config.database_path).unwrap();
    let seed = SeedConfig::new(config.bulk_authors).quiet(true);
    let outcome = maybe_populate(&library, &seed).unwrap();
    assert!(matches!(outcome, SeedOutcome::Populated(_)));
    assert!(library.database_size().unwrap() > 0);

    let mut out = Vec::new();
    let mut runner = SuiteRunner::new(&library, &config, &mut out);
    runner.run_all().unwrap();
    let records = runner.into_records();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(records.len(), 11);
    assert!(!output.contains("Results were NOT the same"));
    assert_eq!(output.matches(" faster than ").count(), 11);

    // A second open sees the populated library and leaves it alone
    drop(library);
    let reopened = Library::open(&config.database_path).unwrap();
    let again = maybe_populate(&reopened, &seed).unwrap();
    assert!(matches!(again, SeedOutcome::AlreadyPopulated(_)));
    assert_eq!(again.counts(), outcome.counts());
}

#[test]
fn test_saved_records_come_back_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_paths(
        temp_dir.path().join("qorb.toml"),
        temp_dir.path().join("results.json"),
    );

    let library = Library::open_in_memory().unwrap();
    maybe_populate(&library, &SeedConfig::new(5).quiet(true)).unwrap();

    let config = manager.load_config().unwrap().with_bulk_authors(5);
    let mut runner = SuiteRunner::new(&library, &config, std::io::sink());
    runner.run(Suite::Optimize).unwrap();
    manager.save_records(runner.into_records()).unwrap();

    let recent = manager.get_recent_records(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].timestamp >= recent[1].timestamp);
    assert!(recent.iter().all(|r| r.suite == "optimize"));

    manager.clear_records().unwrap();
    assert!(manager.get_recent_records(10).unwrap().is_empty());
}

#[test]
fn test_config_saved_through_manager_reloads() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_paths(
        temp_dir.path().join("nested").join("qorb.toml"),
        temp_dir.path().join("results.json"),
    );

    let config = BenchConfig::quick().with_preview_chars(25);
    manager.save_config(&config).unwrap();

    let loaded = manager.load_config().unwrap();
    assert_eq!(loaded.bulk_authors, 1_000);
    assert_eq!(loaded.preview_chars, 25);
}
