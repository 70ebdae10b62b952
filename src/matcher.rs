use crate::models::{CandidateKind, CandidateResult, MatchDecision, RejectReason, SourceTrack};

/// Maximum allowed difference between the exported duration and a candidate's duration.
pub const DURATION_TOLERANCE_MS: u64 = 10_000;

/// Number of song-filtered results considered per track.
pub const SONG_CANDIDATES: usize = 3;

/// Number of unfiltered results fetched for the video fallback.
pub const VIDEO_CANDIDATES: usize = 3;

/// Outcome of one phase: the accepted candidate, or every per-candidate
/// rejection in the order the candidates were examined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Accepted(CandidateResult),
    Exhausted(Vec<(RejectReason, String)>),
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn check_title(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    if contains_ci(&c.title, &track.name) {
        Ok(())
    } else {
        Err((
            RejectReason::TitleMismatch,
            format!("'{}' is not part of title '{}'", track.name, c.title),
        ))
    }
}

fn check_artist(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    let joined = c.joined_artists();
    if contains_ci(&joined, &track.artist) {
        Ok(())
    } else {
        Err((
            RejectReason::ArtistMismatch,
            format!("'{}' is not part of artists '{}'", track.artist, joined),
        ))
    }
}

fn check_duration(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    let Some(expected) = track.duration_ms else {
        return Ok(());
    };
    let diff = expected.abs_diff(c.duration_ms);
    if diff <= DURATION_TOLERANCE_MS {
        Ok(())
    } else {
        Err((
            RejectReason::DurationMismatch,
            format!(
                "{}ms vs {}ms differs by {}ms (limit {}ms)",
                expected, c.duration_ms, diff, DURATION_TOLERANCE_MS
            ),
        ))
    }
}

fn check_album(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    match (track.album.as_deref(), c.album.as_deref()) {
        (Some(expected), Some(actual)) if !expected.is_empty() && !actual.is_empty() => {
            if contains_ci(actual, expected) {
                Ok(())
            } else {
                Err((
                    RejectReason::AlbumMismatch,
                    format!("'{}' is not part of album '{}'", expected, actual),
                ))
            }
        }
        _ => Ok(()),
    }
}

fn check_song(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    check_title(track, c)?;
    check_artist(track, c)?;
    check_duration(track, c)?;
    check_album(track, c)
}

fn check_video(track: &SourceTrack, c: &CandidateResult) -> Result<(), (RejectReason, String)> {
    check_title(track, c)?;
    // channel-style uploads often carry no artist at all
    if !track.artist.is_empty() && !c.joined_artists().is_empty() {
        check_artist(track, c)?;
    }
    check_duration(track, c)
}

fn run_phase<'a, F>(
    track: &SourceTrack,
    candidates: impl IntoIterator<Item = &'a CandidateResult>,
    check: F,
) -> PhaseOutcome
where
    F: Fn(&SourceTrack, &CandidateResult) -> Result<(), (RejectReason, String)>,
{
    let mut rejections = Vec::new();
    for c in candidates {
        match check(track, c) {
            Ok(()) => return PhaseOutcome::Accepted(c.clone()),
            Err(r) => rejections.push(r),
        }
    }
    PhaseOutcome::Exhausted(rejections)
}

/// First song candidate passing title, artist, duration and album checks wins.
pub fn match_song_phase(track: &SourceTrack, songs: &[CandidateResult]) -> PhaseOutcome {
    run_phase(track, songs, check_song)
}

/// Fallback over video-kind candidates; album is not compared and the artist
/// check is skipped when either side has no artist text. Non-video entries
/// are ignored.
pub fn match_video_phase(track: &SourceTrack, videos: &[CandidateResult]) -> PhaseOutcome {
    run_phase(
        track,
        videos.iter().filter(|c| c.kind == CandidateKind::Video),
        check_video,
    )
}

/// Combine the rejections of both phases into the final decision.
///
/// The highest-ranked examined candidate (first song, else first video)
/// decides the reason; `NotFound` is reserved for empty result lists.
pub fn conclude(song_rejections: &[(RejectReason, String)], video_rejections: &[(RejectReason, String)]) -> MatchDecision {
    let examined = song_rejections.len() + video_rejections.len();
    match song_rejections.iter().chain(video_rejections).next() {
        Some((reason, detail)) => MatchDecision::rejected(
            *reason,
            format!("{} ({} candidate(s) examined)", detail, examined),
        ),
        None => MatchDecision::rejected(RejectReason::NotFound, "no song or video results"),
    }
}

/// Decide whether any candidate is an acceptable match for `track`.
///
/// Songs are tried first in the given order; the video list is only
/// consulted when no song was accepted.
pub fn match_track(track: &SourceTrack, songs: &[CandidateResult], videos: &[CandidateResult]) -> MatchDecision {
    let song_rejections = match match_song_phase(track, songs) {
        PhaseOutcome::Accepted(c) => return MatchDecision::Accepted(c),
        PhaseOutcome::Exhausted(r) => r,
    };
    match match_video_phase(track, videos) {
        PhaseOutcome::Accepted(c) => MatchDecision::Accepted(c),
        PhaseOutcome::Exhausted(video_rejections) => conclude(&song_rejections, &video_rejections),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, artist: &str, duration_ms: u64) -> CandidateResult {
        CandidateResult {
            id: format!("id-{}", title),
            kind: CandidateKind::Song,
            title: title.into(),
            artists: vec![artist.into()],
            album: None,
            duration_ms,
        }
    }

    fn video(title: &str, artists: &[&str], duration_ms: u64) -> CandidateResult {
        CandidateResult {
            kind: CandidateKind::Video,
            artists: artists.iter().map(|a| a.to_string()).collect(),
            ..song(title, "", duration_ms)
        }
    }

    fn yesterday() -> SourceTrack {
        SourceTrack::new("Yesterday", "The Beatles").with_duration_ms(125_000)
    }

    #[test]
    fn remastered_title_within_tolerance_is_accepted() {
        let c = song("Yesterday - Remastered 2009", "The Beatles", 123_000);
        let d = match_track(&yesterday(), &[c.clone()], &[]);
        assert_eq!(d, MatchDecision::Accepted(c));
    }

    #[test]
    fn long_duration_is_rejected() {
        let c = song("Yesterday - Remastered 2009", "The Beatles", 500_000);
        match match_track(&yesterday(), &[c], &[]) {
            MatchDecision::Rejected { reason, .. } => assert_eq!(reason, RejectReason::DurationMismatch),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let c = song("Yesterday", "The Beatles", 135_000);
        assert!(match_track(&yesterday(), &[c], &[]).is_accepted());
        let c = song("Yesterday", "The Beatles", 135_001);
        assert!(!match_track(&yesterday(), &[c], &[]).is_accepted());
    }

    #[test]
    fn first_passing_candidate_wins() {
        let wrong = song("Let It Be", "The Beatles", 125_000);
        let first = song("Yesterday (Live)", "The Beatles", 126_000);
        let second = song("Yesterday", "The Beatles", 125_000);
        let d = match_track(&yesterday(), &[wrong, first.clone(), second], &[]);
        assert_eq!(d, MatchDecision::Accepted(first));
    }

    #[test]
    fn matching_is_case_insensitive_and_uses_joined_artists() {
        let track = SourceTrack::new("under pressure", "david bowie");
        let mut c = song("Under Pressure (Remastered)", "Queen", 0);
        c.artists.push("David Bowie".into());
        assert!(match_track(&track, &[c], &[]).is_accepted());
    }

    #[test]
    fn album_only_compared_when_both_known() {
        let track = yesterday().with_album("Help!");
        let mut c = song("Yesterday", "The Beatles", 125_000);
        assert!(match_track(&track, &[c.clone()], &[]).is_accepted());

        c.album = Some("1".into());
        match match_track(&track, &[c.clone()], &[]) {
            MatchDecision::Rejected { reason, .. } => assert_eq!(reason, RejectReason::AlbumMismatch),
            other => panic!("unexpected {:?}", other),
        }

        c.album = Some("Help! (Remastered)".into());
        assert!(match_track(&track, &[c], &[]).is_accepted());
    }

    #[test]
    fn video_fallback_accepts_when_no_songs() {
        let v = video("Yesterday (Official Video)", &["The Beatles"], 126_000);
        let d = match_track(&yesterday(), &[], &[v.clone()]);
        assert_eq!(d, MatchDecision::Accepted(v));
    }

    #[test]
    fn video_fallback_skips_artist_check_when_empty() {
        let v = video("Yesterday", &[], 125_000);
        assert!(match_track(&yesterday(), &[], &[v]).is_accepted());
        let track = SourceTrack::new("Yesterday", "");
        let v = video("Yesterday", &["Someone Else"], 0);
        assert!(match_track(&track, &[], &[v]).is_accepted());
    }

    #[test]
    fn video_phase_ignores_album_but_checks_artist() {
        let track = yesterday().with_album("Help!");
        let mut v = video("Yesterday", &["The Beatles"], 125_000);
        v.album = Some("Something else".into());
        assert!(match_track(&track, &[], &[v]).is_accepted());

        let v = video("Yesterday", &["Cover Band"], 125_000);
        match match_track(&yesterday(), &[], &[v]) {
            MatchDecision::Rejected { reason, .. } => assert_eq!(reason, RejectReason::ArtistMismatch),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn song_kind_entries_are_not_used_as_video_fallback() {
        let s = song("Yesterday", "The Beatles", 125_000);
        match match_track(&yesterday(), &[], &[s]) {
            MatchDecision::Rejected { reason, .. } => assert_eq!(reason, RejectReason::NotFound),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_results_are_not_found() {
        assert_eq!(
            match_track(&yesterday(), &[], &[]),
            MatchDecision::rejected(RejectReason::NotFound, "no song or video results")
        );
    }

    #[test]
    fn first_examined_candidate_decides_reason() {
        let title_miss = song("Help!", "The Beatles", 125_000);
        let duration_miss = song("Yesterday", "The Beatles", 300_000);
        match match_track(&yesterday(), &[title_miss, duration_miss], &[]) {
            MatchDecision::Rejected { reason, detail } => {
                assert_eq!(reason, RejectReason::TitleMismatch);
                assert!(detail.contains("2 candidate(s)"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
