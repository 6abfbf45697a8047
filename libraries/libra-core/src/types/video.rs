use super::{
    Entity, LanguageMap, Linkable, LinkedSource, LyricBearing, Metadata, Permissions,
    PlayableKind, Sourced,
};
use crate::duration::HumanDuration;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Video; subtitles play the role lyrics play for tracks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub artist_ids: Vec<String>,
    #[serde(with = "crate::duration::seconds")]
    pub duration: HumanDuration,
    pub description: String,
    pub release_date: String,
    pub subtitles: LanguageMap,
    pub watch_count: i64,
    pub favorite_count: i64,
    pub addition_date: i64,
    pub tags: Vec<String>,
    pub additional_meta: Metadata,
    pub permissions: Permissions,
    pub linked_item_ids: Vec<String>,
    pub content_source: LinkedSource,
    pub metadata_source: LinkedSource,
    pub lyric_sources: BTreeMap<String, LinkedSource>,
}

impl Entity for Video {
    fn kind(&self) -> PlayableKind {
        PlayableKind::Video
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

impl Linkable for Video {
    fn linked_item_ids(&self) -> &[String] {
        &self.linked_item_ids
    }
}

impl Sourced for Video {
    fn view_count(&self) -> i64 {
        self.watch_count
    }

    fn metadata_source(&self) -> &LinkedSource {
        &self.metadata_source
    }
}

impl LyricBearing for Video {
    fn lyrics(&self) -> &LanguageMap {
        &self.subtitles
    }

    fn lyric_sources(&self) -> &BTreeMap<String, LinkedSource> {
        &self.lyric_sources
    }
}
