use super::{Entity, Linkable, LinkedSource, Metadata, Permissions, PlayableKind, Sourced};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Artist; `name` doubles as the title and `creation_date` as the release date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub album_ids: Vec<String>,
    pub track_ids: Vec<String>,
    pub description: String,
    pub creation_date: String,
    pub listen_count: i64,
    pub favorite_count: i64,
    pub addition_date: i64,
    pub tags: Vec<String>,
    pub additional_meta: Metadata,
    pub permissions: Permissions,
    pub linked_item_ids: Vec<String>,
    pub metadata_source: LinkedSource,
}

impl Entity for Artist {
    fn kind(&self) -> PlayableKind {
        PlayableKind::Artist
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn title(&self) -> &str {
        &self.name
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

impl Linkable for Artist {
    fn linked_item_ids(&self) -> &[String] {
        &self.linked_item_ids
    }
}

impl Sourced for Artist {
    fn view_count(&self) -> i64 {
        self.listen_count
    }

    fn metadata_source(&self) -> &LinkedSource {
        &self.metadata_source
    }
}
