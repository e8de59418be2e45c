//! Configuration file loading for deliberation
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DELIBERATION_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./deliberation.toml` or `./.deliberation.toml`
//! 4. Global: `$XDG_CONFIG_HOME/deliberation/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBudgetsConfig, FileCatalogConfig, FileComposite, FileConfig,
    FileDotVoteConfig, FileEngineConfig, FileEscalationConfig, FileOutputConfig,
    FileOutputFormat, FileParticipant, FileScoringConfig, FileTraceConfig,
};
pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX};
