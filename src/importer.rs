use crate::api::{PrivacyStatus, Provider, SearchFilter};
use crate::error::ImportError;
use crate::matcher::{self, PhaseOutcome, SONG_CANDIDATES, VIDEO_CANDIDATES};
use crate::models::{CandidateKind, MatchDecision, RejectReason, SourceTrack};
use crate::report::{AcceptedMatch, FailureEntry, FailureKind, ImportReport, RunLogs};
use tracing::{error, info, warn};

/// Marker the remote puts in errors for items that are already in the
/// playlist or cannot be added.
pub const DUPLICATE_MARKER: &str = "HTTP 409";

/// Parameters of the playlist a run creates.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub playlist_name: String,
    pub description: String,
    pub privacy: PrivacyStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    DuplicateOrUnavailable(String),
    AddError(String),
}

/// Classify the result of a single add call.
pub fn classify_add_result(result: anyhow::Result<()>) -> AddOutcome {
    match result {
        Ok(()) => AddOutcome::Added,
        Err(e) => {
            let text = format!("{:#}", e);
            if text.contains(DUPLICATE_MARKER) {
                AddOutcome::DuplicateOrUnavailable(text)
            } else {
                AddOutcome::AddError(text)
            }
        }
    }
}

/// Search for `track` and apply the matching policy.
///
/// The unfiltered (video) search is only issued when no song result was
/// accepted. A failing search call yields `SearchError` for this track.
pub async fn resolve_track(provider: &dyn Provider, track: &SourceTrack) -> MatchDecision {
    let query = track.query();

    let songs = match provider.search(&query, Some(SearchFilter::Songs), SONG_CANDIDATES).await {
        Ok(s) => s,
        Err(e) => return MatchDecision::rejected(RejectReason::SearchError, format!("{:#}", e)),
    };
    let song_rejections = match matcher::match_song_phase(track, &songs) {
        PhaseOutcome::Accepted(c) => return MatchDecision::Accepted(c),
        PhaseOutcome::Exhausted(r) => r,
    };

    let videos: Vec<_> = match provider.search(&query, None, VIDEO_CANDIDATES).await {
        Ok(all) => all.into_iter().filter(|c| c.kind == CandidateKind::Video).collect(),
        Err(e) => return MatchDecision::rejected(RejectReason::SearchError, format!("{:#}", e)),
    };
    match matcher::match_video_phase(track, &videos) {
        PhaseOutcome::Accepted(c) => MatchDecision::Accepted(c),
        PhaseOutcome::Exhausted(video_rejections) => matcher::conclude(&song_rejections, &video_rejections),
    }
}

/// Resolve every track in order, recording accepted matches and logging
/// each rejection to the skipped log as it happens.
pub async fn match_tracks(
    provider: &dyn Provider,
    tracks: &[SourceTrack],
    report: &mut ImportReport,
    logs: &RunLogs,
) {
    let total = tracks.len();
    for (i, track) in tracks.iter().enumerate() {
        let position = i + 1;
        match resolve_track(provider, track).await {
            MatchDecision::Accepted(candidate) => {
                info!(
                    "[{}/{}] found: {} (id: {}, {:?})",
                    position,
                    total,
                    track.label(),
                    candidate.id,
                    candidate.kind
                );
                report.accepted.push(AcceptedMatch {
                    position,
                    total,
                    track: track.clone(),
                    candidate,
                });
            }
            MatchDecision::Rejected { reason, detail } => {
                let entry = FailureEntry {
                    position,
                    total,
                    label: track.label(),
                    kind: FailureKind::Rejected(reason),
                    message: detail,
                };
                if reason == RejectReason::SearchError {
                    error!("{}", entry);
                } else {
                    warn!("{}", entry);
                }
                if let Err(e) = logs.log_skipped(&entry) {
                    error!("could not record skipped track: {:#}", e);
                }
                report.failures.push(entry);
            }
        }
    }
}

/// Add each accepted match to the playlist, one call per match, in the
/// order they were accepted. No retries.
pub async fn add_matches(provider: &dyn Provider, playlist_id: &str, report: &mut ImportReport) {
    let accepted = report.accepted.clone();
    for m in &accepted {
        let label = m.track.label();
        let outcome = classify_add_result(provider.add_playlist_item(playlist_id, &m.candidate.id).await);
        let (kind, message) = match outcome {
            AddOutcome::Added => {
                info!("added: {}", label);
                report.added.push(label);
                continue;
            }
            AddOutcome::DuplicateOrUnavailable(msg) => {
                error!("could not add {}: the track may already be in the playlist or be unavailable", label);
                (FailureKind::DuplicateOrUnavailable, msg)
            }
            AddOutcome::AddError(msg) => {
                error!("error adding {}: {}", label, msg);
                (FailureKind::AddError, msg)
            }
        };
        report.failures.push(FailureEntry {
            position: m.position,
            total: m.total,
            label,
            kind,
            message,
        });
    }
}

/// Create the playlist, match every track, add the matches and write both
/// run logs. Only playlist creation can abort the run; log write
/// failures are reported and the run carries on.
pub async fn run_import(
    provider: &dyn Provider,
    tracks: &[SourceTrack],
    job: &ImportJob,
    logs: &RunLogs,
) -> Result<ImportReport, ImportError> {
    let playlist_id = provider
        .create_playlist(&job.playlist_name, &job.description, job.privacy)
        .await
        .map_err(|source| ImportError::PlaylistCreation {
            title: job.playlist_name.clone(),
            source,
        })?;
    info!("created playlist: {} (id: {})", job.playlist_name, playlist_id);

    let mut report = ImportReport::new(tracks.len());
    report.playlist_id = Some(playlist_id.clone());

    match_tracks(provider, tracks, &mut report, logs).await;
    if let Err(e) = logs.finish_skipped(!report.failures.is_empty()) {
        error!("could not finish skipped log: {:#}", e);
    }

    if report.accepted.is_empty() {
        warn!("no track was matched, nothing to add");
    } else {
        add_matches(provider, &playlist_id, &mut report).await;
    }

    if let Err(e) = logs.write_failed(&report) {
        error!("could not write failed log: {:#}", e);
    }
    info!("{}", report.summary());
    Ok(report)
}
