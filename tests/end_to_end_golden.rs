use std::fs;

use checksum_classify::check::{ArtifactChecker, CheckError};
use checksum_classify::database::{DatabaseError, StoreConfig};
use checksum_classify::types::{Category, CheckStatus};
use checksum_classify::check_artifact;
use tempfile::tempdir;

// md5("hello")
const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
// sha256("hello")
const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

#[test]
fn missing_artifact_fails_without_touching_database() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("missing.pdf");
    let database = dir.path().join("missing.json");

    let result = check_artifact(&artifact, &database).unwrap();
    assert_eq!(result.status, CheckStatus::Fail);
    assert_eq!(result.message, "File missing.pdf not generated");
    assert!(!database.exists());

    match ArtifactChecker::default().check(&artifact, &database) {
        Err(e @ CheckError::ArtifactMissing(_)) => assert!(!e.is_fatal()),
        other => panic!("expected missing artifact, got {other:?}"),
    }
}

#[test]
fn fresh_subject_records_one_unknown_checksum() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("hello.pdf");
    let database = dir.path().join("md5").join("hello.json");
    fs::write(&artifact, b"hello").unwrap();

    let result = check_artifact(&artifact, &database).unwrap();
    assert_eq!(result.status, CheckStatus::Unknown);
    assert_eq!(
        result.message,
        format!("Validity of file hello.pdf checksum '{HELLO_MD5}' is unknown.")
    );

    let expected = format!(
        "bad_md5 = [\n        'sentinel']\n\ngood_md5 = [\n        'sentinel']\n\nunknown_md5 = [\n        '{HELLO_MD5}',\n        'sentinel']\n\n"
    );
    assert_eq!(fs::read_to_string(&database).unwrap(), expected);
}

#[test]
fn second_check_of_same_artifact_leaves_file_alone() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("hello.pdf");
    let database = dir.path().join("hello.json");
    fs::write(&artifact, b"hello").unwrap();

    let checker = ArtifactChecker::default();
    let first = checker.check(&artifact, &database).unwrap();
    assert!(first.database_changed);
    let bytes = fs::read(&database).unwrap();

    let second = checker.check(&artifact, &database).unwrap();
    assert_eq!(second.category, Category::Unknown);
    assert!(!second.database_changed);
    assert_eq!(fs::read(&database).unwrap(), bytes);
}

#[test]
fn hand_classified_good_artifact_reports_good() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("hello.pdf");
    let database = dir.path().join("hello.json");
    fs::write(&artifact, b"hello").unwrap();

    let text = format!(
        "bad_md5 = [\n        'sentinel']\n\ngood_md5 = [\n        '{HELLO_MD5}',\n        'sentinel']\n\nunknown_md5 = [\n        'sentinel']\n\n"
    );
    fs::write(&database, &text).unwrap();

    let result = check_artifact(&artifact, &database).unwrap();
    assert_eq!(result.status, CheckStatus::Good);
    assert_eq!(fs::read_to_string(&database).unwrap(), text);
}

#[test]
fn conflicting_database_aborts_and_is_not_rewritten() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("other.pdf");
    let database = dir.path().join("other.json");
    fs::write(&artifact, b"something new").unwrap();

    let text = "good_md5 = ['abcd', 'sentinel']\nbad_md5 = ['abcd', 'sentinel']\n";
    fs::write(&database, text).unwrap();

    let err = check_artifact(&artifact, &database).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        CheckError::Database(DatabaseError::ConflictingClassification { .. })
    ));
    assert_eq!(fs::read_to_string(&database).unwrap(), text);
}

#[test]
fn malformed_database_aborts_and_is_not_rewritten() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("other.pdf");
    let database = dir.path().join("other.json");
    fs::write(&artifact, b"content").unwrap();
    fs::write(&database, "good_md5 = [").unwrap();

    let err = check_artifact(&artifact, &database).unwrap_err();
    assert!(matches!(err, CheckError::Database(DatabaseError::Malformed { .. })));
    assert_eq!(fs::read_to_string(&database).unwrap(), "good_md5 = [");
}

#[test]
fn json_sha256_configuration() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("hello.pdf");
    let database = dir.path().join("hello.json");
    fs::write(&artifact, b"hello").unwrap();

    let checker = ArtifactChecker::new(StoreConfig::json_sha256());
    let verdict = checker.check(&artifact, &database).unwrap();
    assert_eq!(verdict.checksum.as_str(), HELLO_SHA256);

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&database).unwrap()).unwrap();
    assert_eq!(parsed["unknown"][0], HELLO_SHA256);
    assert_eq!(parsed["unknown"][1], "sentinel");
}

#[test]
fn unreadable_database_is_a_fatal_io_error() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("hello.pdf");
    let database = dir.path().join("hello.json");
    fs::write(&artifact, b"hello").unwrap();
    fs::create_dir(&database).unwrap();

    let err = check_artifact(&artifact, &database).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, CheckError::Database(DatabaseError::Io(_))), "{err:?}");

    assert!(database.is_dir());
    assert_eq!(fs::read_dir(&database).unwrap().count(), 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2, "no temp file left behind");
}

#[test]
fn unreadable_artifact_is_a_fatal_io_error() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("output.pdf");
    let database = dir.path().join("output.json");
    fs::create_dir(&artifact).unwrap();

    let err = check_artifact(&artifact, &database).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, CheckError::Io(_)), "{err:?}");
    assert!(!database.exists());
}
