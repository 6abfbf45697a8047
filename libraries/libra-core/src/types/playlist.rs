use super::{Entity, LinkedSource, Metadata, Permissions, PlayableKind, Sourced};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Ordered list of tracks owned by a user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub track_ids: Vec<String>,
    pub listen_count: i64,
    pub favorite_count: i64,
    pub description: String,
    pub creation_date: String,
    pub addition_date: i64,
    pub tags: Vec<String>,
    pub additional_meta: Metadata,
    pub permissions: Permissions,
    pub metadata_source: LinkedSource,
}

impl Entity for Playlist {
    fn kind(&self) -> PlayableKind {
        PlayableKind::Playlist
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
        Cow::Borrowed(&self.creation_date)
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

impl Sourced for Playlist {
    fn view_count(&self) -> i64 {
        self.listen_count
    }

    fn metadata_source(&self) -> &LinkedSource {
        &self.metadata_source
    }
}
