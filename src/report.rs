use crate::models::{CandidateResult, RejectReason, SourceTrack};
use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ALL_ADDED_SENTINEL: &str = "All tracks were added successfully.";
pub const NOTHING_SKIPPED_SENTINEL: &str = "No tracks were skipped.";

/// Why a track ended up in the failure list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Rejected(RejectReason),
    /// The remote answered HTTP 409: already in the playlist or unavailable.
    DuplicateOrUnavailable,
    AddError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Rejected(r) => write!(f, "{}", r),
            FailureKind::DuplicateOrUnavailable => f.write_str("already in playlist or unavailable"),
            FailureKind::AddError => f.write_str("add error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    /// 1-based position of the track in the deduplicated input.
    pub position: usize,
    pub total: usize,
    /// "name by artist"
    pub label: String,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for FailureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}: {}", self.position, self.total, self.label, self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedMatch {
    pub position: usize,
    pub total: usize,
    pub track: SourceTrack,
    pub candidate: CandidateResult,
}

/// Everything a run produced, in the order it happened.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportReport {
    pub playlist_id: Option<String>,
    pub total: usize,
    pub accepted: Vec<AcceptedMatch>,
    pub failures: Vec<FailureEntry>,
    /// "name by artist" of every successfully added track.
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub matched: usize,
    pub added: usize,
    pub failed: usize,
}

impl ImportReport {
    pub fn new(total: usize) -> Self {
        Self { total, ..Self::default() }
    }

    /// Failures left after removing the ones that overlap a successful add.
    pub fn net_failures(&self) -> Vec<String> {
        filter_failures(&self.failures, &self.added)
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            total: self.total,
            matched: self.accepted.len(),
            added: self.added.len(),
            failed: self.net_failures().len(),
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} track(s): {} matched, {} added, {} failed",
            self.total, self.matched, self.added, self.failed
        )
    }
}

/// Drop every failure whose rendered text contains the "name by artist"
/// text of a successful add. This is substring containment, not a key
/// join, so unrelated tracks sharing text can be filtered too.
pub fn filter_failures(failures: &[FailureEntry], added: &[String]) -> Vec<String> {
    failures
        .iter()
        .map(|f| f.to_string())
        .filter(|line| !added.iter().any(|ok| line.contains(ok.as_str())))
        .collect()
}

/// The two per-run log files. Every write opens the file in append mode
/// and closes it again.
#[derive(Debug, Clone)]
pub struct RunLogs {
    skipped_path: PathBuf,
    failed_path: PathBuf,
}

impl RunLogs {
    pub fn new(dir: &Path, timestamp: &str) -> Self {
        Self {
            skipped_path: dir.join(format!("skipped_tracks_{}.log", timestamp)),
            failed_path: dir.join(format!("failed_tracks_{}.log", timestamp)),
        }
    }

    pub fn skipped_path(&self) -> &Path {
        &self.skipped_path
    }

    pub fn failed_path(&self) -> &Path {
        &self.failed_path
    }

    fn append(path: &Path, lines: &[String]) -> anyhow::Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            for line in lines {
                writeln!(file, "{}", line)?;
            }
            Ok(())
        };
        write().with_context(|| format!("writing {}", path.display()))
    }

    /// Record one rejected track as soon as it is decided.
    pub fn log_skipped(&self, entry: &FailureEntry) -> anyhow::Result<()> {
        Self::append(&self.skipped_path, &[entry.to_string()])
    }

    /// Called once at the end so the skipped log exists even when nothing was skipped.
    pub fn finish_skipped(&self, skipped_any: bool) -> anyhow::Result<()> {
        if skipped_any {
            return Ok(());
        }
        Self::append(&self.skipped_path, &[NOTHING_SKIPPED_SENTINEL.to_string()])
    }

    /// Write the filtered failure list, or the sentinel line if it is empty.
    pub fn write_failed(&self, report: &ImportReport) -> anyhow::Result<()> {
        let lines = report.net_failures();
        if lines.is_empty() {
            Self::append(&self.failed_path, &[ALL_ADDED_SENTINEL.to_string()])
        } else {
            Self::append(&self.failed_path, &lines)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(position: usize, label: &str, kind: FailureKind) -> FailureEntry {
        FailureEntry {
            position,
            total: 3,
            label: label.into(),
            kind,
            message: String::new(),
        }
    }

    #[test]
    fn entry_renders_position_and_reason() {
        let mut f = failure(2, "Help! by The Beatles", FailureKind::Rejected(RejectReason::NotFound));
        assert_eq!(f.to_string(), "[2/3] Help! by The Beatles: not found");
        f.message = "no song or video results".into();
        assert_eq!(f.to_string(), "[2/3] Help! by The Beatles: not found: no song or video results");
    }

    #[test]
    fn substring_overlap_filters_failures() {
        let failures = vec![
            failure(1, "Help by Beatles", FailureKind::AddError),
            failure(2, "Help by Beatles Tribute", FailureKind::AddError),
            failure(3, "Let It Be by The Beatles", FailureKind::DuplicateOrUnavailable),
        ];
        let added = vec!["Help by Beatles".to_string()];
        let left = filter_failures(&failures, &added);
        assert_eq!(left.len(), 1);
        assert!(left[0].contains("Let It Be"));
    }
}
