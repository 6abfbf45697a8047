//! Remote Libra-compatible services
//!
//! The prototype derives one instance per `http(s)://` id. Deriving fetches
//! the remote descriptor, so an unreachable service fails at enable time.

use async_trait::async_trait;
use libra_core::{
    LanguageMap, LibraError, LinkedSource, MediaType, Playable, Result, SourceType, Version,
};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::filters::SearchFilters;
use crate::settings::SourceSettings;
use crate::source::{ensure_media_type, ensure_source_type, Source, SourceDescriptor};

#[derive(Debug, Clone)]
pub struct WebSource {
    base: Option<Url>,
    id: String,
    name: String,
    version: Version,
    source_types: Vec<SourceType>,
    media_types: Vec<MediaType>,
    client: Client,
}

impl WebSource {
    /// The unbound prototype
    pub fn prototype(settings: &SourceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(format!("Libra/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LibraError::source("web", e))?;

        Ok(Self {
            base: None,
            id: "web".to_string(),
            name: "Web".to_string(),
            version: Version::current(),
            source_types: vec![SourceType::Content, SourceType::Metadata, SourceType::Lyrics],
            media_types: vec![MediaType::Music, MediaType::Video, MediaType::Playlist],
            client,
        })
    }

    /// Instance bound to `id`, described by the service at that address
    pub async fn connect(&self, id: &str) -> Result<Self> {
        let trimmed = id.trim_end_matches('/');
        let base = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| LibraError::InvalidSource(format!("{id}: {e}")))?;

        let response = self
            .client
            .get(base.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LibraError::source(trimmed, e))?;
        let descriptor: SourceDescriptor = Self::decode(trimmed, response).await?;

        info!(
            source = trimmed,
            remote_id = %descriptor.id,
            version = %descriptor.version,
            "Connected to remote source"
        );

        Ok(Self {
            base: Some(base),
            id: trimmed.to_string(),
            name: descriptor.name,
            version: descriptor.version,
            source_types: descriptor.source_types,
            media_types: descriptor.media_types,
            client: self.client.clone(),
        })
    }

    fn base(&self) -> Result<&Url> {
        self.base
            .as_ref()
            .ok_or_else(|| LibraError::InvalidSource("web prototype has no address".to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base()?
            .join(path)
            .map_err(|e| LibraError::invalid_input(format!("bad path {path:?}: {e}")))
    }

    async fn decode<T: DeserializeOwned>(source_id: &str, response: reqwest::Response) -> Result<T> {
        let response = Self::check(source_id, response)?;
        response
            .json()
            .await
            .map_err(|e| LibraError::source(source_id, format!("unreadable response: {e}")))
    }

    fn check(source_id: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(LibraError::not_found("remote item", response.url().as_str())),
            status => Err(LibraError::source(source_id, format!("remote returned {status}"))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(source = %self.id, %url, "GET");
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LibraError::source(&self.id, e))?;
        Self::decode(&self.id, response).await
    }

    /// The remote id of a playable this instance produced
    fn locator_of<'a>(&self, playable: &'a Playable) -> Result<&'a str> {
        playable
            .metadata_source()
            .filter(|s| s.source_id() == self.id)
            .map(LinkedSource::locator)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| {
                LibraError::invalid_input(format!(
                    "{} {:?} does not come from {}",
                    playable.kind(),
                    playable.title(),
                    self.id
                ))
            })
    }

    /// Re-address a remote playable through this instance and strip its
    /// remote identity
    fn localize(&self, mut item: Playable) -> Result<Playable> {
        let remote_id = item.id().to_string();
        let kind = item.kind();
        let content_url = self.endpoint(&format!("api/v1/{kind}/{remote_id}/content"))?;
        let metadata_source = LinkedSource::new(&self.id, &remote_id);
        let content_source = LinkedSource::new(&self.id, content_url.as_str());

        match &mut item {
            Playable::Track(t) => {
                t.id.clear();
                t.user_id.clear();
                t.metadata_source = metadata_source;
                t.content_source = content_source;
            }
            Playable::Video(v) => {
                v.id.clear();
                v.user_id.clear();
                v.metadata_source = metadata_source;
                v.content_source = content_source;
            }
            Playable::Album(a) => {
                a.id.clear();
                a.user_id.clear();
                a.metadata_source = metadata_source;
            }
            Playable::Artist(a) => {
                a.id.clear();
                a.user_id.clear();
                a.metadata_source = metadata_source;
            }
            Playable::Playlist(p) => {
                p.id.clear();
                p.user_id.clear();
                p.metadata_source = metadata_source;
            }
            Playable::User(_) => {
                return Err(LibraError::UnsupportedMediaType(kind.to_string()));
            }
        }
        Ok(item)
    }
}

/// Give `fresh` the local identity of `original`
fn keep_identity(original: &Playable, fresh: &mut Playable) {
    let (id, user_id, added) = (
        original.id().to_string(),
        original.user_id().to_string(),
        original.addition_date(),
    );
    match fresh {
        Playable::Track(t) => (t.id, t.user_id, t.addition_date) = (id, user_id, added),
        Playable::Video(v) => (v.id, v.user_id, v.addition_date) = (id, user_id, added),
        Playable::Album(a) => (a.id, a.user_id, a.addition_date) = (id, user_id, added),
        Playable::Artist(a) => (a.id, a.user_id, a.addition_date) = (id, user_id, added),
        Playable::Playlist(p) => (p.id, p.user_id, p.addition_date) = (id, user_id, added),
        Playable::User(_) => {}
    }
}

#[async_trait]
impl Source for WebSource {
    fn satisfies(&self, id: &str) -> bool {
        id.starts_with("http://") || id.starts_with("https://")
    }

    fn supports_multiple(&self) -> bool {
        self.base.is_none()
    }

    async fn derive(&self, id: &str) -> Result<Arc<dyn Source>> {
        if !self.supports_multiple() {
            return Err(LibraError::InvalidSource(format!(
                "source {} does not support multiple instances",
                self.id
            )));
        }
        Ok(Arc::new(self.connect(id).await?))
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Version {
        self.version.clone()
    }

    fn source_types(&self) -> &[SourceType] {
        &self.source_types
    }

    fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        page: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Playable>> {
        let types: Vec<&str> = filters.kinds().iter().map(|k| k.plural()).collect();
        let mut url = self.endpoint("api/v1/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.max(1).to_string())
            .append_pair("types", &types.join(","));

        let items: Vec<Playable> = self.get_json(url).await?;
        items
            .into_iter()
            .filter(|item| !matches!(item, Playable::User(_)))
            .map(|item| self.localize(item))
            .collect()
    }

    async fn content(&self, playable: &Playable) -> Result<Vec<u8>> {
        ensure_source_type(self, SourceType::Content)?;
        ensure_media_type(self, playable.kind())?;

        let locator = playable
            .content_source()
            .filter(|s| s.source_id() == self.id)
            .map(LinkedSource::locator)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let url = match locator {
            Some(locator) => match Url::parse(&locator) {
                Ok(url) => url,
                Err(_) => self.endpoint(&locator)?,
            },
            None => {
                let remote_id = self.locator_of(playable)?;
                self.endpoint(&format!("api/v1/{}/{remote_id}/content", playable.kind()))?
            }
        };

        debug!(source = %self.id, %url, "Downloading content");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LibraError::source(&self.id, e))?;
        let bytes = Self::check(&self.id, response)?
            .bytes()
            .await
            .map_err(|e| LibraError::source(&self.id, e))?;
        Ok(bytes.to_vec())
    }

    async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap> {
        ensure_media_type(self, playable.kind())?;
        let remote_id = self.locator_of(playable)?;
        let url = self.endpoint(&format!("api/v1/{}/{remote_id}/lyrics", playable.kind()))?;
        match self.get_json(url).await {
            Err(e) if e.is_not_found() => Ok(LanguageMap::new()),
            other => other,
        }
    }

    async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        ensure_media_type(self, playable.kind())?;
        let remote_id = self.locator_of(&playable)?;
        let url = self.endpoint(&format!("api/v1/{}/{remote_id}", playable.kind()))?;

        let fetched: Playable = self.get_json(url).await?;
        if fetched.kind() != playable.kind() {
            return Err(LibraError::source(
                &self.id,
                format!("expected {}, got {}", playable.kind(), fetched.kind()),
            ));
        }
        let mut completed = self.localize(fetched)?;
        keep_identity(&playable, &mut completed);
        Ok(completed)
    }
}
