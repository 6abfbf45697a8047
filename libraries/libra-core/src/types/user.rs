/// User domain types
use super::{Entity, Metadata, Permissions, PlayableKind};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

static EMPTY_META: Metadata = Metadata::new();

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Unique user identifier
    pub id: String,

    /// Login name, unique case-insensitively
    pub username: String,

    /// Optional email, unique case-insensitively when set
    pub email: String,

    pub display_name: String,
    pub description: String,

    /// Playable id to listen count
    pub listened_to: BTreeMap<String, i64>,

    /// Favorited playable ids
    pub favorites: Vec<String>,

    pub public_view_count: i64,

    /// Unix seconds
    pub creation_date: i64,

    pub permissions: Permissions,
    pub linked_artist_id: String,

    /// Provider id to external user id
    pub linked_sources: BTreeMap<String, String>,
}

impl User {
    /// Attach a password hash for persistence
    pub fn into_database_user(self, password_hash: impl Into<String>) -> DatabaseUser {
        DatabaseUser {
            user: self,
            password_hash: password_hash.into(),
        }
    }
}

impl Entity for User {
    fn kind(&self) -> PlayableKind {
        PlayableKind::User
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// A user owns itself
    fn user_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// The creation timestamp as a decimal string
    fn release_date(&self) -> Cow<'_, str> {
        Cow::Owned(self.creation_date.to_string())
    }

    fn addition_date(&self) -> i64 {
        self.creation_date
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn additional_meta(&self) -> &Metadata {
        &EMPTY_META
    }

    fn permissions(&self) -> &Permissions {
        &self.permissions
    }
}

/// A user as stored, including the password hash
///
/// Never returned from the HTTP layer; convert with [`DatabaseUser::into_user`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub password_hash: String,
}

impl DatabaseUser {
    /// Drop the password hash
    pub fn into_user(self) -> User {
        self.user
    }
}
