/// Content cache - media and cover files on disk
///
/// ```text
/// <root>/content/tracks/<id>.<ext>
/// <root>/content/videos/<id>.<ext>
/// <root>/covers/<kinds>/<id>.<ext>
/// ```
///
/// When the tree outgrows `size_limit`, the least-viewed tracks and videos
/// that are older than `minimum_age` are deleted first.
use crate::error::{Result, ServerError};
use chrono::Utc;
use libra_core::{ByteSize, CatalogStore, HumanDuration, LibraError, PlayableKind};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

const CONTENT_KINDS: [PlayableKind; 2] = [PlayableKind::Track, PlayableKind::Video];

/// Result of one eviction sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Evicted entries, least-viewed first
    pub evicted: Vec<(PlayableKind, String)>,
    pub freed_bytes: u64,
    pub remaining_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
    size_limit: ByteSize,
    minimum_age: HumanDuration,
    error_warnings: bool,
}

/// Eviction candidate
struct Candidate {
    kind: PlayableKind,
    id: String,
    views: i64,
    path: PathBuf,
}

impl ContentCache {
    pub fn new(root: PathBuf, size_limit: ByteSize, minimum_age: HumanDuration) -> Self {
        Self {
            root,
            size_limit,
            minimum_age,
            error_warnings: false,
        }
    }

    /// Report sweep warnings at error level
    pub fn with_error_warnings(mut self, enabled: bool) -> Self {
        self.error_warnings = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory tree
    pub async fn initialize(&self) -> Result<()> {
        for kind in CONTENT_KINDS {
            fs::create_dir_all(self.content_dir(kind)?).await?;
        }
        for kind in PlayableKind::CATALOG {
            fs::create_dir_all(self.cover_dir(kind)).await?;
        }
        Ok(())
    }

    fn content_dir(&self, kind: PlayableKind) -> Result<PathBuf> {
        if !CONTENT_KINDS.contains(&kind) {
            return Err(LibraError::UnsupportedMediaType(kind.to_string()).into());
        }
        Ok(self.root.join("content").join(kind.plural()))
    }

    fn cover_dir(&self, kind: PlayableKind) -> PathBuf {
        self.root.join("covers").join(kind.plural())
    }

    /// Whether any file in the content directory has `id` as its stem
    pub async fn is_content_stored(&self, kind: PlayableKind, id: &str) -> Result<bool> {
        Ok(self.content_path(kind, id).await?.is_some())
    }

    /// Path of the stored content for `id`, if any
    pub async fn content_path(&self, kind: PlayableKind, id: &str) -> Result<Option<PathBuf>> {
        let dir = self.content_dir(kind)?;
        find_by_stem(&dir, id).await
    }

    /// Store media bytes for a track or video, replacing earlier content
    pub async fn store_content(
        &self,
        kind: PlayableKind,
        id: &str,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf> {
        let dir = self.content_dir(kind)?;
        write_replacing(&dir, id, data, extension).await
    }

    /// Store cover art for any catalog kind
    pub async fn store_cover(
        &self,
        kind: PlayableKind,
        id: &str,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf> {
        if kind == PlayableKind::User {
            return Err(LibraError::UnsupportedMediaType(kind.to_string()).into());
        }
        write_replacing(&self.cover_dir(kind), id, data, extension).await
    }

    /// Evict least-viewed, old-enough content until the tree fits `size_limit`
    ///
    /// Per-file failures are logged and skipped. Files written after the
    /// directory scan are not considered until the next sweep.
    pub async fn clean_overfilled_storage(&self, catalog: &dyn CatalogStore) -> Result<SweepReport> {
        let root = self.root.clone();
        let (on_disk, total) = tokio::task::spawn_blocking(move || scan(&root))
            .await
            .map_err(|e| ServerError::Internal(format!("cache scan panicked: {e}")))?;

        let mut report = SweepReport {
            remaining_bytes: total,
            ..SweepReport::default()
        };
        if self.size_limit.is_zero() || total <= self.size_limit.bytes() {
            debug!(total, limit = self.size_limit.bytes(), "cache within limit");
            return Ok(report);
        }

        let cutoff = Utc::now().timestamp() - self.minimum_age.num_seconds();
        let mut candidates = Vec::new();
        for track in catalog.get_all_tracks().await? {
            if let Some(path) = on_disk.get(&(PlayableKind::Track, track.id.clone())) {
                if track.addition_date <= cutoff {
                    candidates.push(Candidate {
                        kind: PlayableKind::Track,
                        id: track.id,
                        views: track.listen_count,
                        path: path.clone(),
                    });
                }
            }
        }
        for video in catalog.get_all_videos().await? {
            if let Some(path) = on_disk.get(&(PlayableKind::Video, video.id.clone())) {
                if video.addition_date <= cutoff {
                    candidates.push(Candidate {
                        kind: PlayableKind::Video,
                        id: video.id,
                        views: video.watch_count,
                        path: path.clone(),
                    });
                }
            }
        }
        candidates.sort_by(|a, b| a.views.cmp(&b.views).then_with(|| a.id.cmp(&b.id)));

        let mut candidates = candidates.into_iter();
        while report.remaining_bytes > self.size_limit.bytes() {
            let Some(candidate) = candidates.next() else {
                self.warn(&format!(
                    "storage overfilled, no evictable items ({} of {} bytes used)",
                    report.remaining_bytes,
                    self.size_limit.bytes()
                ));
                break;
            };

            let mut freed = remove_file_sized(&candidate.path).await;
            let cover_dir = self.cover_dir(candidate.kind);
            for cover in files_with_stem_prefix(&cover_dir, &candidate.id).await {
                freed += remove_file_sized(&cover).await;
            }

            info!(
                kind = %candidate.kind,
                id = %candidate.id,
                views = candidate.views,
                freed,
                "evicted cached content"
            );
            report.freed_bytes += freed;
            report.remaining_bytes = report.remaining_bytes.saturating_sub(freed);
            report.evicted.push((candidate.kind, candidate.id));
        }

        Ok(report)
    }

    /// Sweep every `interval` until `cancel` fires
    ///
    /// Expired token blacklist entries are purged on the same schedule.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        catalog: Arc<dyn CatalogStore>,
        interval: HumanDuration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let period = interval.to_std().max(std::time::Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; startup already swept.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = self.clean_overfilled_storage(catalog.as_ref()).await {
                    self.warn(&format!("cache sweep failed: {e}"));
                }
                if let Err(e) = catalog.clean_expired_tokens().await {
                    self.warn(&format!("token cleanup failed: {e}"));
                }
            }
            debug!("cache sweeper stopped");
        })
    }

    fn warn(&self, message: &str) {
        if self.error_warnings {
            error!("{}", message);
        } else {
            warn!("{}", message);
        }
    }
}

/// Content files keyed by `(kind, id)` and the byte total of the whole tree
fn scan(root: &Path) -> (HashMap<(PlayableKind, String), PathBuf>, u64) {
    let mut on_disk = HashMap::new();
    for kind in CONTENT_KINDS {
        let dir = root.join("content").join(kind.plural());
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    on_disk.insert((kind, stem.to_string()), entry.path().to_path_buf());
                }
            }
        }
    }

    let total = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum();

    (on_disk, total)
}

async fn find_by_stem(dir: &Path, id: &str) -> Result<Option<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.file_stem().and_then(|s| s.to_str()) == Some(id) && path.is_file() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

async fn files_with_stem_prefix(dir: &Path, id: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(mut entries) = fs::read_dir(dir).await else {
        return found;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.starts_with(id));
        if matches {
            found.push(path);
        }
    }
    found
}

/// Delete a file, returning its size, or 0 when that failed
async fn remove_file_sized(path: &Path) -> u64 {
    let size = match fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot stat cached file");
            return 0;
        }
    };
    match fs::remove_file(path).await {
        Ok(()) => size,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot delete cached file");
            0
        }
    }
}

/// Write through a temporary file, then drop other files with the same stem
async fn write_replacing(dir: &Path, id: &str, data: &[u8], extension: &str) -> Result<PathBuf> {
    if id.is_empty() || id.contains('/') || id.contains('\\') || id.starts_with('.') {
        return Err(LibraError::invalid_input(format!("invalid cache id {id:?}")).into());
    }
    let extension = extension.trim_start_matches('.');

    fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{id}.{extension}"));
    let temp = dir.join(format!(".{id}.{extension}.tmp"));

    fs::write(&temp, data).await?;
    if let Err(e) = fs::rename(&temp, &path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e.into());
    }

    if let Ok(mut entries) = fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let other = entry.path();
            if other != path && other.file_stem().and_then(|s| s.to_str()) == Some(id) {
                if let Err(e) = fs::remove_file(&other).await {
                    warn!(path = %other.display(), error = %e, "cannot remove stale cached file");
                }
            }
        }
    }

    Ok(path)
}
