//! c6 configuration.

use std::path::PathBuf;

use c6_local_ai::{paths, DEFAULT_DATABASE_URL, DEFAULT_MODEL_URL};

use crate::engine::AIError;

/// Resolved paths and endpoints for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct C6Config {
    /// Working directory (default: ~/.c6)
    pub dir: PathBuf,
    /// SQLite database file (default: <dir>/c6.db)
    pub database: PathBuf,
    /// GGUF model weights (default: <dir>/codellama-7b-instruct.Q4_K_M.gguf)
    pub model: PathBuf,
    /// Gzip-compressed database download
    pub database_url: String,
    /// Model weights download
    pub model_url: String,
    /// Expected SHA256 of the compressed database download
    pub database_sha256: Option<String>,
    /// Expected SHA256 of the model download
    pub model_sha256: Option<String>,
    /// sqlite3 shell used for schema dumps and `c6 sql`
    pub sqlite_binary: String,
    /// Metal shader copied next to the executable while the model runs
    pub metal_shader: Option<PathBuf>,
}

impl C6Config {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, AIError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AIError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let dir = match var("C6_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => paths::c6_data_dir()?,
        };

        let mut builder = Self::builder(dir);
        if let Some(database) = var("C6_DATABASE") {
            builder = builder.database(database);
        }
        if let Some(model) = var("C6_LLM") {
            builder = builder.model(model);
        }
        if let Some(url) = var("C6_DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(url) = var("C6_LLM_URL") {
            builder = builder.model_url(url);
        }
        if let Some(sha256) = var("C6_DATABASE_SHA256") {
            builder = builder.database_sha256(sha256);
        }
        if let Some(sha256) = var("C6_LLM_SHA256") {
            builder = builder.model_sha256(sha256);
        }
        if let Some(sqlite) = var("C6_SQLITE") {
            builder = builder.sqlite_binary(sqlite);
        }
        if let Some(shader) = var("C6_METAL_SHADER") {
            builder = builder.metal_shader(shader);
        }

        Ok(builder.build())
    }

    /// Create a builder with defaults rooted at `dir`.
    pub fn builder(dir: impl Into<PathBuf>) -> C6ConfigBuilder {
        let dir = dir.into();
        C6ConfigBuilder {
            config: Self {
                database: paths::database_path(&dir),
                model: paths::model_path(&dir),
                dir,
                database_url: DEFAULT_DATABASE_URL.to_string(),
                model_url: DEFAULT_MODEL_URL.to_string(),
                database_sha256: None,
                model_sha256: None,
                sqlite_binary: "sqlite3".to_string(),
                metal_shader: None,
            },
        }
    }
}

/// Builder for c6 configuration.
#[derive(Debug)]
pub struct C6ConfigBuilder {
    config: C6Config,
}

impl C6ConfigBuilder {
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database = path.into();
        self
    }

    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model = path.into();
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    pub fn model_url(mut self, url: impl Into<String>) -> Self {
        self.config.model_url = url.into();
        self
    }

    pub fn database_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.config.database_sha256 = Some(sha256.into());
        self
    }

    pub fn model_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.config.model_sha256 = Some(sha256.into());
        self
    }

    pub fn sqlite_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.sqlite_binary = binary.into();
        self
    }

    pub fn metal_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.metal_shader = Some(path.into());
        self
    }

    pub fn build(self) -> C6Config {
        self.config
    }
}
