//! Trace and catalog locations from TOML (`[trace]` and `[catalog]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTraceConfig {
    /// Write a JSONL call trace for every run
    pub enabled: bool,
    /// Trace directory; defaults to the user data directory
    pub dir: Option<PathBuf>,
}

impl FileTraceConfig {
    /// Configured directory, or `$XDG_DATA_HOME/deliberation/traces`
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("deliberation").join("traces")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCatalogConfig {
    /// Directory of capability card `*.toml` files
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_dir_override() {
        let config = FileTraceConfig {
            enabled: true,
            dir: Some(PathBuf::from("/tmp/traces")),
        };
        assert_eq!(config.resolved_dir(), Some(PathBuf::from("/tmp/traces")));
    }
}
