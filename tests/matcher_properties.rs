use ytmusic_csv_import::matcher::{match_track, DURATION_TOLERANCE_MS};
use ytmusic_csv_import::models::{CandidateKind, CandidateResult, MatchDecision, RejectReason, SourceTrack};

fn candidate(kind: CandidateKind, title: &str, artist: &str, duration_ms: u64) -> CandidateResult {
    CandidateResult {
        id: "x".into(),
        kind,
        title: title.into(),
        artists: vec![artist.into()],
        album: None,
        duration_ms,
    }
}

#[test]
fn title_mismatch_is_never_accepted() {
    let track = SourceTrack::new("Penny Lane", "The Beatles");
    for kind in [CandidateKind::Song, CandidateKind::Video] {
        for title in ["Strawberry Fields Forever", "Penny", "Lane Penny", ""] {
            let c = candidate(kind, title, "The Beatles", 180_000);
            assert!(
                !match_track(&track, &[c.clone()], &[c]).is_accepted(),
                "{:?} {:?} should not match",
                kind,
                title
            );
        }
    }
}

#[test]
fn out_of_tolerance_duration_always_rejected() {
    let track = SourceTrack::new("Penny Lane", "The Beatles").with_duration_ms(180_000);
    for delta in [DURATION_TOLERANCE_MS + 1, 60_000, 179_999] {
        for duration in [180_000 + delta, 180_000 - delta.min(180_000)] {
            let c = candidate(CandidateKind::Song, "Penny Lane", "The Beatles", duration);
            match match_track(&track, &[c], &[]) {
                MatchDecision::Rejected { reason, .. } => assert_eq!(reason, RejectReason::DurationMismatch),
                other => panic!("duration {} unexpectedly {:?}", duration, other),
            }
        }
    }
}

#[test]
fn unknown_track_duration_skips_duration_check() {
    let track = SourceTrack::new("Penny Lane", "The Beatles");
    let c = candidate(CandidateKind::Song, "Penny Lane", "The Beatles", 0);
    assert!(match_track(&track, &[c], &[]).is_accepted());
}
