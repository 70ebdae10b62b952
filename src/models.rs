use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the source playlist export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
}

impl SourceTrack {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
            album: None,
            duration_ms: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Identity used for deduplication: exact, case-sensitive (name, artist).
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.artist)
    }

    /// "name by artist", the text used in console output and both reports.
    pub fn label(&self) -> String {
        format!("{} by {}", self.name, self.artist)
    }

    /// Search query sent to the remote catalog.
    pub fn query(&self) -> String {
        format!("{} {}", self.name, self.artist)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateKind {
    Song,
    Video,
}

/// A single remote search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Opaque remote id (the video id on YouTube Music).
    pub id: String,
    pub kind: CandidateKind,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    // 0 when the remote result did not carry a duration
    pub duration_ms: u64,
}

impl CandidateResult {
    pub fn joined_artists(&self) -> String {
        self.artists.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    TitleMismatch,
    ArtistMismatch,
    DurationMismatch,
    AlbumMismatch,
    NotFound,
    SearchError,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::TitleMismatch => "title mismatch",
            RejectReason::ArtistMismatch => "artist mismatch",
            RejectReason::DurationMismatch => "duration mismatch",
            RejectReason::AlbumMismatch => "album mismatch",
            RejectReason::NotFound => "not found",
            RejectReason::SearchError => "search error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchDecision {
    Accepted(CandidateResult),
    Rejected { reason: RejectReason, detail: String },
}

impl MatchDecision {
    pub fn rejected(reason: RejectReason, detail: impl Into<String>) -> Self {
        MatchDecision::Rejected {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MatchDecision::Accepted(_))
    }
}
