//! Capability catalog loading.
//!
//! One capability card per `*.toml` file in a directory. Cards come back
//! sorted by `protocol_id` so routing summaries are stable.

use deliberation_domain::CapabilityCard;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid capability card {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Protocol '{0}' is defined more than once")]
    DuplicateProtocol(String),
}

/// Reads capability cards from a directory
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<CapabilityCard>, CatalogError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        files.sort();

        let mut cards = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for path in files {
            let card = Self::load_file(&path)?;
            if !seen.insert(card.protocol_id.clone()) {
                return Err(CatalogError::DuplicateProtocol(card.protocol_id));
            }
            debug!("Loaded capability card {} from {}", card.protocol_id, path.display());
            cards.push(card);
        }

        cards.sort_by(|a, b| a.protocol_id.cmp(&b.protocol_id));
        Ok(cards)
    }

    pub fn load_file(path: &Path) -> Result<CapabilityCard, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
