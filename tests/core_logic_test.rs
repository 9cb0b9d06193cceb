use import_failure_cleaner::builders::blocks::{
    BlockRemover, DEFAULT_END_MARKER, DEFAULT_START_MARKER, MarkerPair, count_blocks,
    remove_blocks,
};
use import_failure_cleaner::core::config::{BackupStrategy, CleanerConfig};
use import_failure_cleaner::core::engine::{CleanEngine, FileStatus};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;

#[test]
fn test_core_workflow() {
    let dir = tempfile::tempdir().unwrap();

    // 1. A script with two import-failure blocks and a blank-line run
    let path = dir.path().join("env.tst");
    let original = "TEST.UNIT:a\n\
                    TEST.IMPORT_FAILURES:\nfirst\nTEST.END_IMPORT_FAILURES:\n\
                    TEST.NEW\n\n\n\n\
                    TEST.IMPORT_FAILURES:\nsecond\nTEST.END_IMPORT_FAILURES:\n\
                    TEST.END\n";
    fs::write(&path, original).unwrap();

    // 2. Clean it with the defaults
    let mut engine = CleanEngine::new(&CleanerConfig::default()).unwrap();
    let report = engine.clean_file(&path).unwrap();

    // 3. Blocks are gone, the blank-line run is capped, the backup is intact
    assert_eq!(report.status, FileStatus::Cleaned);
    assert_eq!(report.blocks_found, 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "TEST.UNIT:a\nTEST.NEW\n\nTEST.END\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("env.tst.bak")).unwrap(),
        original
    );
}

#[test]
fn test_custom_markers_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "keep <<drop>> keep\n").unwrap();

    let mut config = CleanerConfig::default();
    config.markers = MarkerPair::new("<<", ">>").unwrap();
    config.global_settings.backup_strategy = BackupStrategy::Disabled;

    let mut engine = CleanEngine::new(&config).unwrap();
    engine.clean_file(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "keep  keep\n");
}

#[rstest]
#[case("", 0)]
#[case("no markers at all", 0)]
#[case("TEST.IMPORT_FAILURES: open only", 0)]
#[case("TEST.IMPORT_FAILURES: x TEST.END_IMPORT_FAILURES:", 1)]
#[case(
    "TEST.IMPORT_FAILURES: x TEST.IMPORT_FAILURES: y TEST.END_IMPORT_FAILURES: TEST.END_IMPORT_FAILURES:",
    1
)]
#[case(
    "TEST.IMPORT_FAILURES:1TEST.END_IMPORT_FAILURES:TEST.IMPORT_FAILURES:2TEST.END_IMPORT_FAILURES:",
    2
)]
fn test_count_matches_removal(#[case] content: &str, #[case] expected: usize) {
    let count = count_blocks(content, DEFAULT_START_MARKER, DEFAULT_END_MARKER).unwrap();
    assert_eq!(count, expected);

    let result = BlockRemover::default().clean(content);
    assert_eq!(result.blocks_removed, expected);

    let cleaned = remove_blocks(content, DEFAULT_START_MARKER, DEFAULT_END_MARKER).unwrap();
    assert_eq!(cleaned, result.content);
    assert_eq!(
        count_blocks(&cleaned, DEFAULT_START_MARKER, DEFAULT_END_MARKER).unwrap(),
        0
    );
}

#[test]
fn test_documented_examples() {
    assert_eq!(
        remove_blocks(
            "a\nTEST.IMPORT_FAILURES:\nbad\nTEST.END_IMPORT_FAILURES:\nb",
            DEFAULT_START_MARKER,
            DEFAULT_END_MARKER
        )
        .unwrap(),
        "a\nb"
    );
    assert_eq!(remove_blocks("p X: q X: r Y: s", "X:", "Y:").unwrap(), "p  s");
}
