use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::db::schema::MAX_BATCH_ROWS;

/// Base follow timestamp (epoch milliseconds); row `i` gets `base + i`
pub const DEFAULT_BASE_FOLLOW_TIME: i64 = 1764047780230;

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Avatars {
    /// Directory the `{index}.jpg` files are written to
    pub dir: PathBuf,
    /// Preferred TrueType/OpenType font, tried before the system candidates
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Public URL prefix stored in the `avatar` column
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub count: u32,
    pub batch_size: usize,
    pub base_follow_time: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub avatars: Avatars,
    pub seed: Seed,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional)
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Workspace root runs pick up the crate-local file
        let dev_path = PathBuf::from("follow-seed").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("database.path", "follow.db")?
            .set_default("avatars.dir", "avatars")?
            .set_default("avatars.url_prefix", "/avatars")?
            .set_default("seed.count", 1000)?
            .set_default("seed.batch_size", 100)?
            .set_default("seed.base_follow_time", DEFAULT_BASE_FOLLOW_TIME)?;

        // 2. Override with environment variables (highest priority)
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(dir) = std::env::var("AVATAR_DIR") {
            builder = builder.set_override("avatars.dir", dir)?;
        }
        if let Ok(font) = std::env::var("AVATAR_FONT") {
            builder = builder.set_override("avatars.font_path", font)?;
        }
        if let Ok(count) = std::env::var("SEED_COUNT") {
            builder = builder.set_override("seed.count", count)?;
        }
        if let Ok(batch_size) = std::env::var("SEED_BATCH_SIZE") {
            builder = builder.set_override("seed.batch_size", batch_size)?;
        }

        let s = builder.build()?;
        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings for a seed run rooted at `workdir`; used by tests and tooling
    pub fn for_directory(workdir: &std::path::Path) -> Self {
        Self {
            database: Database {
                path: workdir.join("follow.db").to_string_lossy().into_owned(),
            },
            avatars: Avatars {
                dir: workdir.join("avatars"),
                font_path: None,
                url_prefix: "/avatars".to_string(),
            },
            seed: Seed {
                count: 1000,
                batch_size: 100,
                base_follow_time: DEFAULT_BASE_FOLLOW_TIME,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed.count == 0 {
            return Err(ConfigError::Message("seed.count must be at least 1".into()));
        }
        if self.seed.batch_size == 0 {
            return Err(ConfigError::Message(
                "seed.batch_size must be at least 1".into(),
            ));
        }
        if self.seed.batch_size > MAX_BATCH_ROWS {
            return Err(ConfigError::Message(format!(
                "seed.batch_size must be at most {}, got {}",
                MAX_BATCH_ROWS, self.seed.batch_size
            )));
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Message("database.path must not be empty".into()));
        }
        Ok(())
    }

    /// Avatar URL prefix without a trailing slash
    pub fn avatar_url_prefix(&self) -> &str {
        self.avatars.url_prefix.trim_end_matches('/')
    }
}
