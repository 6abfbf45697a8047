use super::{
    Entity, LanguageMap, Linkable, LinkedSource, LyricBearing, Metadata, Permissions,
    PlayableKind, Sourced,
};
use crate::duration::HumanDuration;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Audio track
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: String,
    pub user_id: String,
    pub isrc: String,
    pub title: String,
    pub artist_ids: Vec<String>,
    pub album_ids: Vec<String>,
    pub primary_album_id: String,
    pub track_number: i64,
    #[serde(with = "crate::duration::seconds")]
    pub duration: HumanDuration,
    pub description: String,
    pub release_date: String,
    /// Language code to lyrics
    pub lyrics: LanguageMap,
    pub listen_count: i64,
    pub favorite_count: i64,
    pub addition_date: i64,
    pub tags: Vec<String>,
    pub additional_meta: Metadata,
    pub permissions: Permissions,
    pub linked_item_ids: Vec<String>,
    pub content_source: LinkedSource,
    pub metadata_source: LinkedSource,
    /// Language code to the source the lyrics came from
    pub lyric_sources: BTreeMap<String, LinkedSource>,
}

impl Entity for Track {
    fn kind(&self) -> PlayableKind {
        PlayableKind::Track
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn release_date(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.release_date)
    }

    fn addition_date(&self) -> i64 {
        self.addition_date
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn additional_meta(&self) -> &Metadata {
        &self.additional_meta
    }

    fn permissions(&self) -> &Permissions {
        &self.permissions
    }
}

impl Linkable for Track {
    fn linked_item_ids(&self) -> &[String] {
        &self.linked_item_ids
    }
}

impl Sourced for Track {
    fn view_count(&self) -> i64 {
        self.listen_count
    }

    fn metadata_source(&self) -> &LinkedSource {
        &self.metadata_source
    }
}

impl LyricBearing for Track {
    fn lyrics(&self) -> &LanguageMap {
        &self.lyrics
    }

    fn lyric_sources(&self) -> &BTreeMap<String, LinkedSource> {
        &self.lyric_sources
    }
}
