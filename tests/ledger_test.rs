//! Integration tests for the durable reply ledger.

use sitewatch::error::Error;
use sitewatch::ledger::{HEADER, Ledger};
use sitewatch::model::LedgerEntry;
use std::path::PathBuf;
use tempfile::TempDir;

fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("posted.csv");
    (dir, path)
}

fn entry(id: &str) -> LedgerEntry {
    LedgerEntry {
        user_name: format!("user{id}"),
        domain: "example.com".into(),
        reply_tweet_id: format!("9{id}"),
        id_str: id.into(),
        created_at: "Wed Oct 10 20:19:24 +0000 2018".into(),
        favorite_count: "1".into(),
        reply_count: "2".into(),
        retweet_count: "3".into(),
        quote_count: "4".into(),
        full_text: format!("mention number {id}"),
    }
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

#[test]
fn exists_is_true_exactly_for_appended_ids() {
    let (_dir, path) = scratch();
    let mut ledger = Ledger::open(&path).unwrap();

    let appended = ["100", "200", "300", "400"];
    for id in appended {
        ledger.append(entry(id)).unwrap();
    }

    for id in appended {
        assert!(ledger.exists(id), "{id} should exist");
    }
    for id in ["", "1", "10", "1000", "abc"] {
        assert!(!ledger.exists(id), "{id} should not exist");
    }
    assert_eq!(ledger.len(), appended.len());
}

#[test]
fn entries_keep_append_order() {
    let (_dir, path) = scratch();
    let mut ledger = Ledger::open(&path).unwrap();
    ledger.append(entry("b")).unwrap();
    ledger.append(entry("a")).unwrap();

    let ids: Vec<_> = ledger.entries().iter().map(|e| e.id_str.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

// ---------------------------------------------------------------------------
// Restart safety
// ---------------------------------------------------------------------------

#[test]
fn appended_entries_survive_restart() {
    let (_dir, path) = scratch();

    {
        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(entry("A")).unwrap();
    }

    let ledger = Ledger::open(&path).unwrap();
    assert!(ledger.exists("A"));
    assert_eq!(ledger.get("A"), Some(&entry("A")));
}

#[test]
fn first_entry_of_new_ledger_is_not_lost_on_reload() {
    let (_dir, path) = scratch();

    // Fresh store: header is written on creation, so row 0 is never data.
    let mut ledger = Ledger::open(&path).unwrap();
    ledger.append(entry("first")).unwrap();
    drop(ledger);

    let ledger = Ledger::open(&path).unwrap();
    assert_eq!(ledger.len(), 1);
    assert!(ledger.exists("first"));
}

#[test]
fn headerless_file_keeps_its_first_row() {
    let (_dir, path) = scratch();
    std::fs::write(
        &path,
        "alice,example.com,91,1,Mon,0,0,0,0,text one\nbob,example.com,92,2,Tue,0,0,0,0,text two\n",
    )
    .unwrap();

    let ledger = Ledger::open(&path).unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.exists("1"));
    assert!(ledger.exists("2"));
}

#[test]
fn rewritten_file_starts_with_header() {
    let (_dir, path) = scratch();
    std::fs::write(&path, "alice,example.com,91,1,Mon,0,0,0,0,text one\n").unwrap();

    let mut ledger = Ledger::open(&path).unwrap();
    ledger.append(entry("2")).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let first_line = content.lines().next().unwrap();
    assert_eq!(first_line, HEADER.join(","));

    let reloaded = Ledger::open(&path).unwrap();
    assert!(reloaded.exists("1"));
    assert!(reloaded.exists("2"));
}

#[test]
fn empty_file_loads_as_empty_ledger() {
    let (_dir, path) = scratch();
    std::fs::write(&path, "").unwrap();

    let ledger = Ledger::open(&path).unwrap();
    assert!(ledger.is_empty());
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn short_row_is_a_format_error() {
    let (_dir, path) = scratch();
    std::fs::write(&path, format!("{}\nalice,example.com,91\n", HEADER.join(","))).unwrap();

    let err = Ledger::open(&path).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "got {err:?}");
}

#[test]
fn duplicate_ids_in_storage_are_a_format_error() {
    let (_dir, path) = scratch();
    std::fs::write(
        &path,
        format!(
            "{}\na,d,91,7,t,0,0,0,0,x\nb,d,92,7,t,0,0,0,0,y\n",
            HEADER.join(",")
        ),
    )
    .unwrap();

    let err = Ledger::open(&path).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "got {err:?}");
}

#[test]
fn unreadable_path_is_an_io_error() {
    let (dir, _) = scratch();
    // A directory where a file is expected.
    let err = Ledger::open(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}
