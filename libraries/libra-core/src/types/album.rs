use super::{Entity, Linkable, LinkedSource, Metadata, Permissions, PlayableKind, Sourced};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Album; `track_ids` is in track order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    pub id: String,
    pub user_id: String,
    pub upc: String,
    pub title: String,
    pub artist_ids: Vec<String>,
    pub track_ids: Vec<String>,
    pub description: String,
    pub release_date: String,
    pub listen_count: i64,
    pub favorite_count: i64,
    pub addition_date: i64,
    pub tags: Vec<String>,
    pub additional_meta: Metadata,
    pub permissions: Permissions,
    pub linked_item_ids: Vec<String>,
    pub metadata_source: LinkedSource,
}

impl Entity for Album {
    fn kind(&self) -> PlayableKind {
        PlayableKind::Album
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

impl Linkable for Album {
    fn linked_item_ids(&self) -> &[String] {
        &self.linked_item_ids
    }
}

impl Sourced for Album {
    fn view_count(&self) -> i64 {
        self.listen_count
    }

    fn metadata_source(&self) -> &LinkedSource {
        &self.metadata_source
    }
}
