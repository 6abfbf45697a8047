/// Server configuration
///
/// Built from three layers, later ones winning: the compiled-in defaults, an
/// optional config file, and `LIBRA_<SECTION>_<KEY>` environment variables.
use crate::{
    error::{Result, ServerError},
    services::auth::signing_method_canonical,
};
use config::{Config, File};
use libra_core::{ByteSize, HumanDuration, MediaType, DEFAULT_ID_LENGTH};
use libra_sources::SourceSettings;
use libra_storage::{DatabaseConfig, DatabaseEngine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub application: ApplicationConfig,
    pub auth: AuthConfig,
    pub general: GeneralConfig,
    pub source_scripts: SourceScriptsConfig,
    pub logs: LogsConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub public_url: String,
    pub port: u16,
    /// Id this server announces when other Libra instances use it as a source
    pub source_id: String,
    pub source_name: String,
    pub media_types: Vec<MediaType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub global_api_routes_require_auth: bool,
    pub user_api_routes_require_auth: bool,
    pub user_api_require_same_user: bool,
    pub disable_account_creation: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    pub signing_method: String,
    /// Literal key material, or `file:PATH`
    pub signing_key: String,
    /// Public key for asymmetric methods, literal or `file:PATH`
    pub verification_key: String,
    pub access_token_expiration: HumanDuration,
    pub refresh_token_expiration: HumanDuration,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub id_length: usize,
    pub include_video_results: bool,
    pub video_audio_only: bool,
    pub inherit_listen_counts: bool,
    pub artist_listen_counts_by_track: bool,
    /// 0 disables the cap
    pub max_search_results: usize,
    /// 0 disables the cap
    pub max_track_duration: HumanDuration,
    pub reserved_usernames: Vec<String>,
    /// Source ids in priority order
    pub enabled_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceScriptsConfig {
    pub python_command: String,
    pub youtube_location: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogsConfig {
    pub debug: bool,
    /// Log non-fatal source and cache warnings at error level
    pub error_warnings: bool,
    /// Abort startup when a configured source cannot be enabled
    pub all_errors_fatal: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub location: PathBuf,
    /// 0 means unlimited
    pub size_limit: ByteSize,
    pub minimum_age_threshold: HumanDuration,
    pub cleanup_interval: HumanDuration,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            public_url: "http://127.0.0.1".to_string(),
            port: 8080,
            source_id: "libra".to_string(),
            source_name: "Libra".to_string(),
            media_types: vec![MediaType::Music, MediaType::Video, MediaType::Playlist],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            global_api_routes_require_auth: true,
            user_api_routes_require_auth: true,
            user_api_require_same_user: false,
            disable_account_creation: false,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            signing_method: "HS256".to_string(),
            signing_key: "secret".to_string(),
            verification_key: String::new(),
            access_token_expiration: HumanDuration::from_secs(15 * 60),
            refresh_token_expiration: HumanDuration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            id_length: DEFAULT_ID_LENGTH,
            include_video_results: true,
            video_audio_only: true,
            inherit_listen_counts: false,
            artist_listen_counts_by_track: true,
            max_search_results: 20,
            max_track_duration: HumanDuration::zero(),
            reserved_usernames: vec!["owner".to_string(), "admin".to_string()],
            enabled_sources: vec!["spotify".to_string(), "youtube".to_string()],
        }
    }
}

impl Default for SourceScriptsConfig {
    fn default() -> Self {
        Self {
            python_command: "python3".to_string(),
            youtube_location: PathBuf::from("source_scripts/youtube.py"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from("./storage"),
            size_limit: ByteSize(0),
            minimum_age_threshold: HumanDuration::from_secs(7 * 24 * 60 * 60),
            cleanup_interval: HumanDuration::from_secs(60 * 60),
        }
    }
}

/// Options that may be overridden from the environment
///
/// Keys contain underscores themselves, so `LIBRA_AUTH_JWT_SIGNING_KEY` cannot
/// be split mechanically; each known option is looked up by its full name.
const ENV_OPTIONS: &[&str] = &[
    "application.public_url",
    "application.port",
    "application.source_id",
    "application.source_name",
    "application.media_types",
    "auth.jwt.signing_method",
    "auth.jwt.signing_key",
    "auth.jwt.verification_key",
    "auth.jwt.access_token_expiration",
    "auth.jwt.refresh_token_expiration",
    "auth.global_api_routes_require_auth",
    "auth.user_api_routes_require_auth",
    "auth.user_api_require_same_user",
    "auth.disable_account_creation",
    "general.id_length",
    "general.include_video_results",
    "general.video_audio_only",
    "general.inherit_listen_counts",
    "general.artist_listen_counts_by_track",
    "general.max_search_results",
    "general.max_track_duration",
    "general.reserved_usernames",
    "general.enabled_sources",
    "source_scripts.python_command",
    "source_scripts.youtube_location",
    "logs.debug",
    "logs.error_warnings",
    "logs.all_errors_fatal",
    "storage.location",
    "storage.size_limit",
    "storage.minimum_age_threshold",
    "storage.cleanup_interval",
    "database.engine",
    "database.sqlite.path",
    "database.postgresql.host",
    "database.postgresql.user",
    "database.postgresql.pass",
    "database.postgresql.db_name",
    "database.postgresql.params",
];

const LIST_OPTIONS: &[&str] = &[
    "application.media_types",
    "general.reserved_usernames",
    "general.enabled_sources",
];

/// Environment variable for a dotted option path
pub fn env_var_name(option: &str) -> String {
    format!("LIBRA_{}", option.replace('.', "_").to_ascii_uppercase())
}

/// Where to look for configuration
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
    /// Base for relative paths and for `config.{toml,yaml,json}` discovery
    pub data_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from the defaults, file and process environment
    pub fn load(options: &LoadOptions) -> Result<Self> {
        Self::load_with_env(options, std::env::vars())
    }

    /// Like [`load`](Self::load) with an explicit environment
    pub fn load_with_env<I>(options: &LoadOptions, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let defaults =
            Config::try_from(&ServerConfig::default()).map_err(|e| config_error(&e))?;
        let mut settings = Config::builder().add_source(defaults);

        match &options.config_file {
            Some(path) => {
                settings = settings.add_source(File::from(path.as_path()).required(true));
            }
            None => {
                let stem = options.data_dir.join("config");
                settings = settings.add_source(File::from(stem.as_path()).required(false));
            }
        }

        let env: Vec<(String, String)> = env
            .into_iter()
            .filter(|(key, _)| key.starts_with("LIBRA_"))
            .collect();
        for option in ENV_OPTIONS {
            let name = env_var_name(option);
            let Some((_, value)) = env.iter().find(|(key, _)| *key == name) else {
                continue;
            };
            settings = if LIST_OPTIONS.contains(option) {
                let items: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                settings.set_override(*option, items)
            } else {
                settings.set_override(*option, value.as_str())
            }
            .map_err(|e| config_error(&e))?;
        }

        let mut config: ServerConfig = settings
            .build()
            .map_err(|e| config_error(&e))?
            .try_deserialize()
            .map_err(|e| config_error(&e))?;
        config.resolve_paths(&options.data_dir);
        Ok(config)
    }

    /// Anchor relative paths at `data_dir`
    pub fn resolve_paths(&mut self, data_dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = data_dir.join(&*path);
            }
        };
        resolve(&mut self.storage.location);
        resolve(&mut self.source_scripts.youtube_location);
        resolve(&mut self.database.sqlite.path);
    }

    /// Startup checks; any failure here is fatal
    pub fn validate(&self) -> Result<()> {
        if self.application.port == 0 {
            return Err(ServerError::Config(
                "application.port must not be 0".to_string(),
            ));
        }

        url::Url::parse(&self.application.public_url).map_err(|e| {
            ServerError::Config(format!(
                "invalid application.public_url {:?}: {}",
                self.application.public_url, e
            ))
        })?;

        if signing_method_canonical(&self.auth.jwt.signing_method).is_none() {
            return Err(ServerError::Config(format!(
                "unknown auth.jwt.signing_method {:?}",
                self.auth.jwt.signing_method
            )));
        }

        for key in [&self.auth.jwt.signing_key, &self.auth.jwt.verification_key] {
            if let Some(path) = key.strip_prefix("file:") {
                if !Path::new(path).exists() {
                    return Err(ServerError::Config(format!("key file not found: {path}")));
                }
            }
        }

        if self.general.id_length == 0 {
            return Err(ServerError::Config(
                "general.id_length must be positive".to_string(),
            ));
        }

        if self.database.engine == DatabaseEngine::Postgresql
            && self.database.postgresql.host.is_empty()
        {
            return Err(ServerError::Config(
                "database.postgresql.host is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings handed to the source adapters
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            python_command: self.source_scripts.python_command.clone(),
            youtube_script: self.source_scripts.youtube_location.clone(),
            include_video_results: self.general.include_video_results,
            video_audio_only: self.general.video_audio_only,
            inherit_listen_counts: self.general.inherit_listen_counts,
            artist_listen_counts_by_track: self.general.artist_listen_counts_by_track,
            ..SourceSettings::default()
        }
    }
}

fn config_error(err: &config::ConfigError) -> ServerError {
    ServerError::Config(err.to_string())
}
