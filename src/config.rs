//! Library layout configuration.
//!
//! Loaded from YAML, with environment overrides applied last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LibraryError, Result};

/// Where documents live and where the snapshot goes.
///
/// Relative paths are resolved against [`Config::root`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prompts_dir: PathBuf,
    pub fragments_dir: PathBuf,
    pub prompt_extension: String,
    pub fragment_extension: String,
    pub output: PathBuf,
    /// Library root. Not part of the file; set by the loader.
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("prompts"),
            fragments_dir: PathBuf::from("fragments"),
            prompt_extension: "prompty".to_string(),
            fragment_extension: "md".to_string(),
            output: PathBuf::from("web/src/data/index.json"),
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "promptlib.yaml";

    /// Default layout rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration for the library at `root`.
    ///
    /// Lookup order: `explicit`, `$PROMPTLIB_CONFIG`, `<root>/promptlib.yaml`,
    /// then the user config directory. An explicit path must exist; the
    /// others fall through to defaults when absent.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        let explicit = explicit
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("PROMPTLIB_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load_file(&path)?.ok_or_else(|| {
                LibraryError::Config(format!("config file not found: {}", path.display()))
            })?,
            None => match Self::load_file(&root.join(Self::FILE_NAME))? {
                Some(config) => config,
                None => match global_config_path() {
                    Some(path) => Self::load_file(&path)?.unwrap_or_default(),
                    None => Self::default(),
                },
            },
        };

        config.root = root.to_path_buf();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "loading config");

        let raw = std::fs::read_to_string(path)
            .map_err(|err| LibraryError::Config(format!("read {}: {err}", path.display())))?;
        let config = serde_yaml::from_str(&raw)
            .map_err(|err| LibraryError::Config(format!("parse {}: {err}", path.display())))?;
        Ok(Some(config))
    }

    /// Apply `PROMPTLIB_*` overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PROMPTLIB_PROMPTS_DIR") {
            self.prompts_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("PROMPTLIB_FRAGMENTS_DIR") {
            self.fragments_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("PROMPTLIB_OUTPUT") {
            self.output = PathBuf::from(value);
        }
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.root.join(&self.prompts_dir)
    }

    pub fn fragments_path(&self) -> PathBuf {
        self.root.join(&self.fragments_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|err| LibraryError::Config(err.to_string()))
    }
}

fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "promptlib")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
