use libra_core::{MediaType, PlayableKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search options keyed by name
///
/// Recognised keys are `types` (kind names, default `["tracks"]`) and
/// `allow_videos` (adds `videos` whenever `tracks` is requested). Other keys
/// are passed through to the sources untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchFilters(Map<String, Value>);

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the search to `kinds`
    #[must_use]
    pub fn with_types(mut self, kinds: &[PlayableKind]) -> Self {
        let names = kinds.iter().map(|k| Value::from(k.plural())).collect();
        self.0.insert("types".to_string(), Value::Array(names));
        self
    }

    #[must_use]
    pub fn with_allow_videos(mut self, allow: bool) -> Self {
        self.0.insert("allow_videos".to_string(), Value::Bool(allow));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn allow_videos(&self) -> bool {
        self.0
            .get("allow_videos")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Requested kinds, in request order, without duplicates
    ///
    /// `types` may be an array or a comma-separated string; unknown names are
    /// skipped.
    pub fn kinds(&self) -> Vec<PlayableKind> {
        let names: Vec<String> = match self.0.get("types") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(joined)) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        let mut kinds: Vec<PlayableKind> = Vec::new();
        for name in &names {
            if let Ok(kind) = name.parse::<PlayableKind>() {
                if kind != PlayableKind::User && !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        if names.is_empty() {
            kinds.push(PlayableKind::Track);
        }

        if self.allow_videos()
            && kinds.contains(&PlayableKind::Track)
            && !kinds.contains(&PlayableKind::Video)
        {
            kinds.push(PlayableKind::Video);
        }
        kinds
    }

    /// Media types covering [`kinds`](Self::kinds)
    pub fn media_types(&self) -> Vec<MediaType> {
        let mut media_types = Vec::new();
        for media_type in self.kinds().into_iter().filter_map(PlayableKind::media_type) {
            if !media_types.contains(&media_type) {
                media_types.push(media_type);
            }
        }
        media_types
    }

    /// Copy with `types` replaced by the resolved plural names
    pub fn normalized(&self) -> Self {
        let kinds = self.kinds();
        let mut out = self.clone().with_types(&kinds);
        out.0.remove("allow_videos");
        out
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for SearchFilters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> SearchFilters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_to_tracks() {
        assert_eq!(SearchFilters::new().kinds(), vec![PlayableKind::Track]);
        assert_eq!(SearchFilters::new().media_types(), vec![MediaType::Music]);
    }

    #[test]
    fn allow_videos_extends_tracks_only() {
        let with_tracks = filters(json!({"types": ["tracks"], "allow_videos": true}));
        assert_eq!(
            with_tracks.kinds(),
            vec![PlayableKind::Track, PlayableKind::Video]
        );

        let albums_only = filters(json!({"types": ["albums"], "allow_videos": true}));
        assert_eq!(albums_only.kinds(), vec![PlayableKind::Album]);
    }

    #[test]
    fn accepts_comma_separated_types() {
        let f = filters(json!({"types": "albums, artists,albums"}));
        assert_eq!(f.kinds(), vec![PlayableKind::Album, PlayableKind::Artist]);
        assert_eq!(f.media_types(), vec![MediaType::Music]);
    }

    #[test]
    fn unknown_types_are_skipped() {
        let f = filters(json!({"types": ["podcasts", "playlists"]}));
        assert_eq!(f.kinds(), vec![PlayableKind::Playlist]);

        let none_known = filters(json!({"types": ["podcasts"]}));
        assert!(none_known.kinds().is_empty());
    }

    #[test]
    fn normalized_spells_out_kinds() {
        let f = SearchFilters::new().with_allow_videos(true);
        let normalized = f.normalized();
        assert_eq!(normalized.get("types"), Some(&json!(["tracks", "videos"])));
        assert!(normalized.get("allow_videos").is_none());
    }
}
