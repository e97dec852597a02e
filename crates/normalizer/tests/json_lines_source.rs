use std::fs;
use std::path::PathBuf;

use normalizer::{normalize_event, EventSource, JsonLinesSource, RecordError};

fn write_fixture(name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}.jsonl", name, std::process::id()));
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn scans_every_line_and_restarts_per_pass() {
    let path = write_fixture(
        "normalizer-scan",
        concat!(
            r#"{"actor_id":1,"actor_login":"alice","repo_id":10,"repo_name":"org/a","created_at":"2023-01-01 00:00:00","type":"IssuesEvent","action":"opened"}"#,
            "\n\n",
            "not json\n",
            r#"{"actor_login":"ghost","repo_id":10,"repo_name":"org/a","created_at":"2023-01-01 00:00:00","type":"IssueCommentEvent"}"#,
            "\n",
        ),
    );
    let source = JsonLinesSource::new(&path);

    for _pass in 0..2 {
        let items: Vec<_> = source
            .scan()
            .expect("scan")
            .map(|item| item.expect("io"))
            .collect();
        assert_eq!(items.len(), 3, "blank line skipped");

        let first = normalize_event(items[0].as_ref().expect("decoded")).expect("valid");
        assert_eq!(first.actor_login, "alice");
        assert!(matches!(items[1], Err(RecordError::Decode(_))));
        let missing = normalize_event(items[2].as_ref().expect("decoded")).unwrap_err();
        assert!(matches!(missing, RecordError::MissingField("actor_id")));
    }

    fs::remove_file(path).ok();
}

#[test]
fn invalid_utf8_line_is_a_decode_error_and_scanning_continues() {
    let valid = r#"{"actor_id":1,"actor_login":"alice","repo_id":10,"repo_name":"org/a","created_at":"2023-01-01 00:00:00","type":"IssuesEvent","action":"opened"}"#;
    let mut contents = Vec::new();
    contents.extend_from_slice(valid.as_bytes());
    contents.extend_from_slice(b"\n{\"body\":\"\xff\xfe broken\"}\r\n");
    contents.extend_from_slice(valid.as_bytes());
    contents.push(b'\n');
    let path = write_fixture("normalizer-utf8", contents);

    let items: Vec<_> = JsonLinesSource::new(&path)
        .scan()
        .expect("scan")
        .map(|item| item.expect("bad bytes are not a source failure"))
        .collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(RecordError::Decode(_))));
    let last = normalize_event(items[2].as_ref().expect("decoded")).expect("valid");
    assert_eq!(last.actor_login, "alice");

    fs::remove_file(path).ok();
}

#[test]
fn missing_file_fails_the_scan() {
    let source = JsonLinesSource::new("/definitely/not/here.jsonl");
    assert!(source.scan().is_err());
}
