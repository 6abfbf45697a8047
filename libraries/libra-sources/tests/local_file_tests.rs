//! Local file source over a temporary directory tree

use libra_core::{LibraError, Playable, PlayableKind};
use libra_sources::{LocalFileSource, SearchFilters, Source};
use std::path::Path;
use tempfile::TempDir;

fn library() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("Artist/Album")).unwrap();
    std::fs::write(root.join("Artist/Album/01 Night Drive.mp3"), b"audio one").unwrap();
    std::fs::write(root.join("Artist/Album/02 Daybreak.flac"), b"audio two").unwrap();
    std::fs::write(root.join("Artist/Album/02 Daybreak.lrc"), "[00:00.00]la la").unwrap();
    std::fs::write(root.join("Artist/night drive live.mp4"), b"video").unwrap();
    std::fs::write(root.join("Artist/cover.jpg"), b"image").unwrap();
    dir
}

fn source_for(root: &Path) -> LocalFileSource {
    LocalFileSource::at(root)
}

#[tokio::test]
async fn search_matches_stems_case_insensitively() {
    let dir = library();
    let source = source_for(dir.path());

    let results = source
        .search("NIGHT", 10, 1, &SearchFilters::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title(), "01 Night Drive");
    let linked = results[0].metadata_source().unwrap();
    assert_eq!(linked.source_id(), source.id());
    assert_eq!(linked.locator(), "Artist/Album/01 Night Drive.mp3");
}

#[tokio::test]
async fn videos_only_when_requested() {
    let dir = library();
    let source = source_for(dir.path());

    let filters = SearchFilters::new().with_allow_videos(true);
    let results = source.search("night", 10, 1, &filters).await.unwrap();

    let kinds: Vec<PlayableKind> = results.iter().map(Playable::kind).collect();
    assert_eq!(kinds, vec![PlayableKind::Track, PlayableKind::Video]);
}

#[tokio::test]
async fn empty_query_pages_through_everything() {
    let dir = library();
    let source = source_for(dir.path());

    let first = source.search("", 1, 1, &SearchFilters::new()).await.unwrap();
    let second = source.search("", 1, 2, &SearchFilters::new()).await.unwrap();
    let third = source.search("", 1, 3, &SearchFilters::new()).await.unwrap();

    assert_eq!(first[0].title(), "01 Night Drive");
    assert_eq!(second[0].title(), "02 Daybreak");
    assert!(third.is_empty());
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let dir = library();
    let source = source_for(dir.path());

    let results = source
        .search("", 20, usize::MAX, &SearchFilters::new())
        .await
        .unwrap();
    assert!(results.is_empty());

    let unlimited = source
        .search("", 0, usize::MAX, &SearchFilters::new())
        .await
        .unwrap();
    assert_eq!(unlimited.len(), 2);
}

#[tokio::test]
async fn missing_root_finds_nothing() {
    let source = LocalFileSource::at("/definitely/not/here");
    let results = source.search("", 10, 1, &SearchFilters::new()).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn content_and_lyrics_follow_locator() {
    let dir = library();
    let source = source_for(dir.path());

    let results = source
        .search("daybreak", 10, 1, &SearchFilters::new())
        .await
        .unwrap();
    let daybreak = &results[0];

    assert_eq!(source.content(daybreak).await.unwrap(), b"audio two");
    let lyrics = source.lyrics(daybreak).await.unwrap();
    assert_eq!(lyrics["unknown"], "lrc\n[00:00.00]la la");
}

#[tokio::test]
async fn single_file_root() {
    let dir = library();
    let file = dir.path().join("Artist/Album/01 Night Drive.mp3");
    let source = source_for(&file);

    let results = source.search("", 10, 1, &SearchFilters::new()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].metadata_source().unwrap().locator(),
        "01 Night Drive.mp3"
    );
    assert_eq!(source.content(&results[0]).await.unwrap(), b"audio one");
}

#[tokio::test]
async fn foreign_playables_are_rejected() {
    let dir = library();
    let source = source_for(dir.path());
    let other = LocalFileSource::at("/elsewhere");

    let results = other.search("", 10, 1, &SearchFilters::new()).await.unwrap();
    assert!(results.is_empty());

    let foreign = Playable::Track(libra_core::Track {
        metadata_source: libra_core::LinkedSource::new("file:/elsewhere", "a.mp3"),
        ..Default::default()
    });
    assert!(matches!(
        source.content(&foreign).await,
        Err(LibraError::InvalidInput(_))
    ));
}
