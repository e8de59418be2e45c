//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
const PROJECT_FILES: [&str; 2] = ["deliberation.toml", ".deliberation.toml"];

/// Prefix of environment overrides, e.g.
/// `DELIBERATION_ESCALATION__CONFIDENCE_THRESHOLD=90`
pub const ENV_PREFIX: &str = "DELIBERATION_";

/// Where a configuration layer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `DELIBERATION_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./deliberation.toml` or `./.deliberation.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/deliberation/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut files: Vec<PathBuf> = Vec::new();
        if let Some(global) = Self::global_config_path() {
            files.push(global);
        }
        if let Some(project) = Self::project_config_path() {
            files.push(project);
        }
        if let Some(path) = config_path {
            files.push(path.to_path_buf());
        }

        Self::from_files(&files)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Defaults overlaid with each existing file in order, later files
    /// winning.
    pub fn from_files(files: &[PathBuf]) -> Figment {
        files
            .iter()
            .filter(|path| path.exists())
            .fold(
                Figment::new().merge(Serialized::defaults(FileConfig::default())),
                |figment, path| figment.merge(Toml::file(path)),
            )
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/deliberation/config.toml`, falling back to the
    /// platform config directory
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("deliberation").join("config.toml"))
    }

    /// The project-level config file, if one exists
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Every file layer in priority order (highest first), for `--show-config`
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();
        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                path: path.to_path_buf(),
                found: path.exists(),
            });
        }
        let project = Self::project_config_path()
            .unwrap_or_else(|| PathBuf::from(PROJECT_FILES[0]));
        sources.push(ConfigSource {
            label: "Project",
            found: project.exists(),
            path: project,
        });
        if let Some(global) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: global.exists(),
                path: global,
            });
        }
        sources
    }
}
