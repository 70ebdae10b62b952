use crate::error::ImportError;
use crate::models::SourceTrack;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Column names as written by common playlist exporters.
#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Track Name")]
    track_name: String,
    #[serde(rename = "Artist Name(s)")]
    artist_names: String,
    #[serde(rename = "Album Name", default)]
    album_name: Option<String>,
    #[serde(rename = "Duration (ms)", default)]
    duration_ms: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

/// Accepts "125000" as well as "125000.0".
fn parse_duration_ms(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f.round() as u64),
        _ => None,
    }
}

impl ExportRow {
    fn into_track(self, line: u64) -> SourceTrack {
        let duration_ms = non_empty(self.duration_ms).and_then(|raw| {
            let parsed = parse_duration_ms(&raw);
            if parsed.is_none() {
                warn!("line {}: ignoring unparseable duration {:?}", line, raw);
            }
            parsed
        });
        SourceTrack {
            name: self.track_name,
            artist: self.artist_names,
            album: non_empty(self.album_name),
            duration_ms,
        }
    }
}

/// Parse the export, pairing each track with the file line its record
/// starts on. Quoted cells may span lines, so this is not the record index.
fn read_rows(path: &Path) -> anyhow::Result<Vec<(u64, SourceTrack)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();

    let mut tracks = Vec::new();
    for result in rdr.records() {
        let record = result.context("malformed row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: ExportRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("malformed row at line {}", line))?;
        tracks.push((line, row.into_track(line)));
    }
    Ok(tracks)
}

/// Parse every row of the export. A missing file, a missing required
/// column or a malformed row aborts the run.
pub fn read_tracks(path: &Path) -> Result<Vec<SourceTrack>, ImportError> {
    read_rows(path)
        .map(|rows| rows.into_iter().map(|(_, t)| t).collect())
        .map_err(|source| ImportError::CsvUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Drop repeated (name, artist) pairs, keeping the first occurrence.
pub fn dedupe_tracks(tracks: Vec<SourceTrack>) -> Vec<SourceTrack> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let before = tracks.len();
    let out: Vec<SourceTrack> = tracks
        .into_iter()
        .filter(|t| {
            let (name, artist) = t.key();
            seen.insert((name.to_string(), artist.to_string()))
        })
        .collect();
    if out.len() != before {
        debug!("dropped {} duplicate row(s)", before - out.len());
    }
    out
}

/// The playlist is named after the export file, without its extension.
pub fn playlist_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Imported playlist")
        .to_string()
}

/// Ask the operator for a CSV file through the native file dialog.
#[cfg(feature = "file-dialog")]
pub fn pick_csv_file() -> Result<PathBuf, ImportError> {
    rfd::FileDialog::new()
        .set_title("Select a CSV file")
        .add_filter("CSV files", &["csv"])
        .pick_file()
        .ok_or(ImportError::NoFileSelected)
}

#[cfg(not(feature = "file-dialog"))]
pub fn pick_csv_file() -> Result<PathBuf, ImportError> {
    Err(ImportError::NoFileSelected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_accept_float_text() {
        assert_eq!(parse_duration_ms("125000"), Some(125_000));
        assert_eq!(parse_duration_ms("125000.0"), Some(125_000));
        assert_eq!(parse_duration_ms("abc"), None);
        assert_eq!(parse_duration_ms("-5"), None);
    }

    #[test]
    fn row_lines_follow_the_file_not_the_record_count() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("multi.csv");
        std::fs::write(
            &path,
            "Track Name,Artist Name(s),Album Name,Duration (ms)\n\
             Yesterday,The Beatles,\"Help!\nDeluxe\nEdition\",125000\n\
             Let It Be,The Beatles,Let It Be,243000\n",
        )
        .unwrap();
        let rows = read_rows(&path).unwrap();
        let lines: Vec<u64> = rows.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![2, 5]);
        assert_eq!(rows[0].1.album.as_deref(), Some("Help!\nDeluxe\nEdition"));
        assert_eq!(rows[1].1.name, "Let It Be");
    }

    #[test]
    fn playlist_name_is_file_stem() {
        assert_eq!(playlist_name_from_path(Path::new("/tmp/Liked Songs.csv")), "Liked Songs");
    }
}
