//! YouTube adapter driven by a shell stand-in for the companion script

#![cfg(unix)]

use libra_core::{LibraError, Playable, PlayableKind, Track};
use libra_sources::{SearchFilters, Source, SourceSettings, YouTubeSource, YOUTUBE_SCRIPT};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const FAKE_SCRIPT: &str = r#"
verb="$1"
shift
case "$verb" in
  search)
    printf '%s' '[{"resultType":"song","title":"Intro","artists":[{"name":"The xx"}],"album":{"name":"xx"},"thumbnails":[{"url":"c.jpg"}],"videoId":"abc","duration_seconds":128,"year":2009},{"resultType":"episode","title":"skip"}]'
    ;;
  lyrics)
    printf '%s' '{"unknown":"txt\nhello"}'
    ;;
  subtitles)
    printf '%s' '{"en":"vtt\nWEBVTT"}'
    ;;
  content)
    printf 'BYTES %s %s' "$1" "$2"
    ;;
  *)
    echo "no handler for $verb" >&2
    exit 3
    ;;
esac
"#;

fn fake_source(dir: &TempDir) -> YouTubeSource {
    let script = dir.path().join("fake.sh");
    std::fs::write(&script, FAKE_SCRIPT).unwrap();
    YouTubeSource::new(SourceSettings {
        python_command: "sh".to_string(),
        youtube_script: script,
        ..SourceSettings::default()
    })
}

fn yt_track(yt_id: &str) -> Playable {
    let mut track = Track::default();
    track
        .additional_meta
        .insert("yt_id".to_string(), json!(yt_id));
    Playable::Track(track)
}

#[tokio::test]
async fn search_parses_script_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = fake_source(&dir);

    let results = source
        .search("intro", 5, 1, &SearchFilters::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind(), PlayableKind::Track);
    assert_eq!(results[0].title(), "Intro");
    assert_eq!(results[0].primary_credit(), "the xx");
    assert_eq!(
        results[0].metadata_source().unwrap().as_str(),
        "youtube::https://music.youtube.com/watch?v=abc"
    );
}

#[tokio::test]
async fn lyrics_and_subtitles_pick_the_verb() {
    let dir = tempfile::tempdir().unwrap();
    let source = fake_source(&dir);

    let lyrics = source.lyrics(&yt_track("abc")).await.unwrap();
    assert_eq!(lyrics["unknown"], "txt\nhello");

    let mut flagged = yt_track("abc");
    if let Playable::Track(t) = &mut flagged {
        t.additional_meta.insert("is_video".to_string(), json!(true));
    }
    let subtitles = source.lyrics(&flagged).await.unwrap();
    assert_eq!(subtitles["en"], "vtt\nWEBVTT");
}

#[tokio::test]
async fn content_returns_raw_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let source = fake_source(&dir);

    let bytes = source.content(&yt_track("abc")).await.unwrap();
    assert_eq!(bytes, b"BYTES type=audio id=abc");
}

#[tokio::test]
async fn script_failures_surface_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let source = fake_source(&dir);

    let err = source.complete_metadata(yt_track("abc")).await.unwrap_err();
    match err {
        LibraError::Source { source_id, message } => {
            assert_eq!(source_id, "youtube");
            assert!(message.contains("no handler for track"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_youtube_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = fake_source(&dir);

    let err = source
        .content(&Playable::Track(Track::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraError::InvalidInput(_)));
}

#[tokio::test]
async fn install_extracts_script_once() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("scripts").join("youtube.py");
    let settings = SourceSettings {
        youtube_script: script.clone(),
        ..SourceSettings::default()
    };

    YouTubeSource::install(settings.clone()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&script).unwrap(), YOUTUBE_SCRIPT);

    std::fs::write(&script, "# customised").unwrap();
    YouTubeSource::install(settings).await.unwrap();
    assert_eq!(read(&script), "# customised");
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
