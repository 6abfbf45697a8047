use std::path::PathBuf;
use std::time::Duration;

/// Options the built-in adapters read
///
/// The server fills this from its `general` and `source_scripts` config
/// sections; the defaults mirror the server defaults.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Interpreter command, split on whitespace (e.g. `python3` or `uv run python`)
    pub python_command: String,

    /// Where the YouTube companion script is extracted to
    pub youtube_script: PathBuf,

    /// Keep video results from YouTube searches
    pub include_video_results: bool,

    /// Present YouTube videos as audio tracks
    pub video_audio_only: bool,

    /// Copy remote view counts into listen/watch counts
    pub inherit_listen_counts: bool,

    /// Artist listen counts are summed from tracks instead of copied
    pub artist_listen_counts_by_track: bool,

    /// Timeout for HTTP requests made by web sources
    pub http_timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            python_command: "python3".to_string(),
            youtube_script: PathBuf::from("source_scripts/youtube.py"),
            include_video_results: true,
            video_audio_only: true,
            inherit_listen_counts: false,
            artist_listen_counts_by_track: true,
            http_timeout: Duration::from_secs(30),
        }
    }
}
