use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

use ytmusic_csv_import::error::ImportError;
use ytmusic_csv_import::ingest::{dedupe_tracks, read_tracks};

fn write_csv(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn reads_all_columns() {
    let td = tempdir().unwrap();
    let path = write_csv(
        td.path(),
        "liked.csv",
        "Track URI,Track Name,Artist Name(s),Album Name,Duration (ms)\n\
         spotify:track:1,Yesterday,The Beatles,Help!,125000\n\
         spotify:track:2,\"Under Pressure\",\"Queen, David Bowie\",Hot Space,248000.0\n",
    );
    let tracks = read_tracks(&path).expect("read csv");
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "Yesterday");
    assert_eq!(tracks[0].album.as_deref(), Some("Help!"));
    assert_eq!(tracks[0].duration_ms, Some(125_000));
    assert_eq!(tracks[1].artist, "Queen, David Bowie");
    assert_eq!(tracks[1].duration_ms, Some(248_000));
}

#[test]
fn optional_columns_may_be_missing_or_empty() {
    let td = tempdir().unwrap();
    let path = write_csv(
        td.path(),
        "minimal.csv",
        "Track Name,Artist Name(s)\nYesterday,The Beatles\n",
    );
    let tracks = read_tracks(&path).unwrap();
    assert_eq!(tracks[0].album, None);
    assert_eq!(tracks[0].duration_ms, None);

    let path = write_csv(
        td.path(),
        "empty_cells.csv",
        "Track Name,Artist Name(s),Album Name,Duration (ms)\nYesterday,The Beatles,,\n",
    );
    let tracks = read_tracks(&path).unwrap();
    assert_eq!(tracks[0].album, None);
    assert_eq!(tracks[0].duration_ms, None);
}

#[test]
fn missing_required_column_is_fatal() {
    let td = tempdir().unwrap();
    let path = write_csv(td.path(), "bad.csv", "Track Name,Album Name\nYesterday,Help!\n");
    match read_tracks(&path) {
        Err(ImportError::CsvUnreadable { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected CsvUnreadable, got {:?}", other),
    }
}

#[test]
fn missing_file_is_fatal() {
    let td = tempdir().unwrap();
    let res = read_tracks(&td.path().join("nope.csv"));
    assert!(matches!(res, Err(ImportError::CsvUnreadable { .. })));
}

#[test]
fn duplicates_keep_first_occurrence() {
    let td = tempdir().unwrap();
    let path = write_csv(
        td.path(),
        "dupes.csv",
        "Track Name,Artist Name(s),Album Name,Duration (ms)\n\
         Yesterday,The Beatles,Help!,125000\n\
         Help!,The Beatles,Help!,139000\n\
         Yesterday,The Beatles,1,126000\n\
         yesterday,The Beatles,Help!,125000\n",
    );
    let tracks = dedupe_tracks(read_tracks(&path).unwrap());
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0].album.as_deref(), Some("Help!"));
    assert_eq!(tracks[1].name, "Help!");
    // dedup identity is case-sensitive
    assert_eq!(tracks[2].name, "yesterday");
}
