use overrides_fs::ConfigStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestDocument {
    name: String,
    count: i32,
    tags: Vec<String>,
}

fn sample() -> TestDocument {
    TestDocument {
        name: "roundtrip".into(),
        count: 123,
        tags: vec!["a".into(), "b".into()],
    }
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("doc.toml");
    fs::write(&file_path, "name = \"test\"\ncount = 42\ntags = []\n").unwrap();

    let doc: TestDocument = ConfigStore::new().load(&file_path).unwrap();

    assert_eq!(doc.name, "test");
    assert_eq!(doc.count, 42);
}

#[test]
fn test_save_toml_is_readable() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("doc.toml");

    ConfigStore::new().save(&file_path, &sample()).unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert!(content.contains("name = \"roundtrip\""));
    assert!(content.contains("count = 123"));
}

#[rstest]
#[case("doc.toml")]
#[case("doc.json")]
#[case("doc.yaml")]
#[case("doc.yml")]
fn test_roundtrip_each_format(#[case] file_name: &str) {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(file_name);
    let store = ConfigStore::new();

    store.save(&file_path, &sample()).unwrap();
    let loaded: TestDocument = store.load(&file_path).unwrap();

    assert_eq!(loaded, sample());
}

#[test]
fn test_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("doc.xyz");
    fs::write(&file_path, "data").unwrap();

    let result: overrides_fs::Result<TestDocument> = ConfigStore::new().load(&file_path);

    assert!(matches!(
        result,
        Err(overrides_fs::Error::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_malformed_document_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("doc.json");
    fs::write(&file_path, "{ not json").unwrap();

    let result: overrides_fs::Result<TestDocument> = ConfigStore::new().load(&file_path);

    match result {
        Err(overrides_fs::Error::ConfigParse { format, path, .. }) => {
            assert_eq!(format, "JSON");
            assert_eq!(path, file_path);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
