//! Catalog CRUD against a real SQLite file

mod common;

use common::{sample_track, TestDb};
use libra_core::{
    Album, Artist, CatalogStore, LibraError, Playable, PlayableKind, Playlist, Video,
};

#[tokio::test]
async fn test_track_crud_roundtrip() {
    let db = TestDb::new().await;
    let track = sample_track("trk00000001", "user0000001");

    db.catalog.add_track(&track).await.unwrap();
    let fetched = db.catalog.get_track("trk00000001").await.unwrap();
    assert_eq!(fetched, track);

    let mut changed = fetched.clone();
    changed.title = "Renamed".to_string();
    changed.listen_count = 99;
    db.catalog.update_track(&changed).await.unwrap();
    assert_eq!(db.catalog.get_track("trk00000001").await.unwrap(), changed);

    db.catalog.delete_track("trk00000001").await.unwrap();
    let err = db.catalog.get_track("trk00000001").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let db = TestDb::new().await;

    assert!(db.catalog.get_album("nope").await.unwrap_err().is_not_found());
    assert!(db.catalog.delete_video("nope").await.unwrap_err().is_not_found());

    let ghost = Artist {
        id: "ghost".to_string(),
        ..Artist::default()
    };
    assert!(db.catalog.update_artist(&ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let db = TestDb::new().await;
    let track = sample_track("trk00000001", "");

    db.catalog.add_track(&track).await.unwrap();
    let err = db.catalog.add_track(&track).await.unwrap_err();
    assert!(matches!(err, LibraError::Duplicate(_)), "got {err:?}");
}

#[tokio::test]
async fn test_user_scoped_listing() {
    let db = TestDb::new().await;
    db.catalog
        .add_track(&sample_track("a", "alice"))
        .await
        .unwrap();
    db.catalog.add_track(&sample_track("b", "bob")).await.unwrap();
    db.catalog
        .add_track(&sample_track("c", "alice"))
        .await
        .unwrap();

    let alice: Vec<String> = db
        .catalog
        .get_user_tracks("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(alice, vec!["a", "c"]);
    assert_eq!(db.catalog.get_all_tracks().await.unwrap().len(), 3);
    assert!(db.catalog.get_user_tracks("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_playables_are_grouped_by_kind() {
    let db = TestDb::new().await;

    db.catalog
        .add_playlist(&Playlist {
            id: "pl".to_string(),
            user_id: "u".to_string(),
            title: "Mix".to_string(),
            track_ids: vec!["t".to_string()],
            ..Playlist::default()
        })
        .await
        .unwrap();
    db.catalog
        .add_artist(&Artist {
            id: "ar".to_string(),
            user_id: "u".to_string(),
            name: "Band".to_string(),
            ..Artist::default()
        })
        .await
        .unwrap();
    db.catalog
        .add_video(&Video {
            id: "vi".to_string(),
            user_id: "u".to_string(),
            ..Video::default()
        })
        .await
        .unwrap();
    db.catalog
        .add_album(&Album {
            id: "al".to_string(),
            user_id: "other".to_string(),
            track_ids: vec!["t".to_string()],
            ..Album::default()
        })
        .await
        .unwrap();
    db.catalog.add_track(&sample_track("t", "u")).await.unwrap();

    let kinds: Vec<PlayableKind> = db
        .catalog
        .get_all_playables()
        .await
        .unwrap()
        .iter()
        .map(Playable::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            PlayableKind::Track,
            PlayableKind::Album,
            PlayableKind::Video,
            PlayableKind::Artist,
            PlayableKind::Playlist,
        ]
    );

    let owned = db.catalog.get_playables("u").await.unwrap();
    assert_eq!(owned.len(), 4);
    assert!(owned.iter().all(|p| p.user_id() == "u"));
}

#[tokio::test]
async fn test_json_columns_preserve_order_and_values() {
    let db = TestDb::new().await;
    let album = Album {
        id: "al".to_string(),
        track_ids: vec!["z".to_string(), "a".to_string(), "m".to_string()],
        tags: vec!["b".to_string(), "a".to_string()],
        ..Album::default()
    };
    db.catalog.add_album(&album).await.unwrap();

    let fetched = db.catalog.get_album("al").await.unwrap();
    assert_eq!(fetched.track_ids, vec!["z", "a", "m"]);
    assert_eq!(fetched.tags, vec!["b", "a"]);
}
