//! Configuration loading and root folder resolution
//!
//! Settings come from four sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`AIMG_ROOT_FOLDER`)
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing or malformed TOML file never stops the program: a warning is
//! logged and the compiled defaults are used instead.

use crate::{DisplayMode, Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the collection root folder
pub const ROOT_FOLDER_ENV: &str = "AIMG_ROOT_FOLDER";

/// Environment variable pointing at an explicit config file
pub const CONFIG_FILE_ENV: &str = "AIMG_CONFIG";

/// Default embedding table file name, relative to the root folder
pub const DEFAULT_EMBEDDINGS_FILE: &str = "embeddings.json";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder of the image collection (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Embedding table JSON file (optional, defaults to `<root>/embeddings.json`)
    #[serde(default)]
    pub embeddings_file: Option<PathBuf>,

    /// Default display mode for `show` and `gallery`
    #[serde(default)]
    pub display_mode: DisplayMode,

    /// Image file extension considered by the scanner (case-insensitive)
    #[serde(default = "default_image_extension")]
    pub image_extension: String,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            embeddings_file: None,
            display_mode: DisplayMode::default(),
            image_extension: default_image_extension(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_image_extension() -> String {
    "png".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults on any failure
    ///
    /// `explicit` is a path given on the command line or through
    /// `AIMG_CONFIG`. Without it the platform config locations are searched.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let Some(path) = path else {
            debug!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config file");
                config
            }
            Err(e) => {
                warn!("{} - using compiled defaults", e);
                Self::default()
            }
        }
    }
}

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub image_extension: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
            image_extension: default_image_extension(),
        }
    }
}

/// Root folder resolution following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Root folder passed on the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Root folder read from the TOML config
    pub fn with_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            debug!(
                module = %self.module_name,
                path = %path.display(),
                "Root folder from command line"
            );
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                debug!(module = %self.module_name, %path, "Root folder from {}", ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            debug!(
                module = %self.module_name,
                path = %path.display(),
                "Root folder from config file"
            );
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        let path = default_root_folder();
        debug!(
            module = %self.module_name,
            path = %path.display(),
            "Root folder from compiled default"
        );
        path
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub embeddings_file: PathBuf,
    pub display_mode: DisplayMode,
    pub image_extension: String,
    pub log_level: String,
}

impl Settings {
    /// Combine command-line overrides with a loaded config
    pub fn resolve(
        config: &TomlConfig,
        cli_root: Option<PathBuf>,
        cli_embeddings: Option<PathBuf>,
    ) -> Self {
        let root_folder = RootFolderResolver::new("aimg")
            .with_cli_arg(cli_root)
            .with_config(config)
            .resolve();

        let embeddings_file = cli_embeddings
            .or_else(|| config.embeddings_file.clone())
            .map(|p| if p.is_relative() { root_folder.join(p) } else { p })
            .unwrap_or_else(|| root_folder.join(DEFAULT_EMBEDDINGS_FILE));

        let image_extension = config.image_extension.trim_start_matches('.').to_lowercase();

        Self {
            root_folder,
            embeddings_file,
            display_mode: config.display_mode,
            image_extension,
            log_level: config.logging.level.clone(),
        }
    }
}

/// Locate the config file for the platform, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("aimg").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/aimg/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("./aimg_data"))
}
