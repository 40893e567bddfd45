//! Application configuration.
//!
//! Configuration is read from an optional JSON file. Missing keys take their
//! defaults, and command line flags override whatever the file sets.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PaperSiftError, Result};
use crate::lexical::index::inverted::InvertedIndexWriterConfig;
use crate::query::Bm25Config;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSiftConfig {
    /// Directory holding the index.
    pub index_path: PathBuf,

    /// Directory scanned for `.txt` papers.
    pub source_dir: PathBuf,

    /// Number of hits returned per query.
    pub top_k: usize,

    /// Replacement for the default English stop word list.
    pub stop_words: Option<Vec<String>>,

    /// Ranking parameters.
    pub bm25: Bm25Config,
}

impl Default for PaperSiftConfig {
    fn default() -> Self {
        PaperSiftConfig {
            index_path: PathBuf::from("index"),
            source_dir: PathBuf::from("papers_txt"),
            top_k: 10,
            stop_words: None,
            bm25: Bm25Config::default(),
        }
    }
}

impl PaperSiftConfig {
    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PaperSiftError::configuration(format!(
                "cannot read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: PaperSiftConfig = serde_json::from_str(&content).map_err(|e| {
            PaperSiftError::configuration(format!(
                "invalid config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(PaperSiftError::configuration("top_k must be at least 1"));
        }
        if self.bm25.k1 < 0.0 || !self.bm25.k1.is_finite() {
            return Err(PaperSiftError::configuration(format!(
                "bm25.k1 must be a non-negative number, got {}",
                self.bm25.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(PaperSiftError::configuration(format!(
                "bm25.b must be between 0 and 1, got {}",
                self.bm25.b
            )));
        }
        Ok(())
    }

    /// Writer settings derived from this configuration.
    pub fn writer_config(&self) -> InvertedIndexWriterConfig {
        InvertedIndexWriterConfig {
            stop_words: self.stop_words.clone(),
            ..InvertedIndexWriterConfig::default()
        }
    }
}
