//! Spelling checks over visible page text
//!
//! The checker itself sits behind [`SpellChecker`] so it can be swapped out;
//! the default is a word list loaded from disk.

mod dictionary;
mod tokenizer;

pub use dictionary::WordListChecker;
pub use tokenizer::{Token, Tokenizer};

use crate::config::SpellingConfig;
use crate::ConfigError;
use std::path::Path;
use std::sync::Arc;

/// Word list used when no dictionary is configured
pub const SYSTEM_DICTIONARY: &str = "/usr/share/dict/words";

/// The spelling-mistake detector
pub trait SpellChecker: Send + Sync {
    /// Returns true if `word` is not a known word
    fn is_misspelled(&self, word: &str) -> bool;

    /// A likely intended spelling, if one is known
    fn suggest(&self, _word: &str) -> Option<String> {
        None
    }
}

/// A checker that accepts every word
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl SpellChecker for Disabled {
    fn is_misspelled(&self, _word: &str) -> bool {
        false
    }
}

/// Builds the checker described by `config`
///
/// An explicitly configured dictionary that cannot be read is a configuration
/// error. Without one, the system word list is used when present; otherwise
/// spelling checks are switched off with a warning.
pub fn load_spell_checker(config: &SpellingConfig) -> Result<Arc<dyn SpellChecker>, ConfigError> {
    if !config.enabled {
        tracing::debug!("Spelling checks disabled by configuration");
        return Ok(Arc::new(Disabled));
    }

    if let Some(path) = &config.dictionary_path {
        let checker = WordListChecker::from_path(path).map_err(|source| ConfigError::Dictionary {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Loaded {} dictionary words from {}", checker.len(), path.display());
        return Ok(Arc::new(checker));
    }

    let system = Path::new(SYSTEM_DICTIONARY);
    if system.is_file() {
        match WordListChecker::from_path(system) {
            Ok(checker) => {
                tracing::info!("Loaded {} dictionary words from {}", checker.len(), SYSTEM_DICTIONARY);
                return Ok(Arc::new(checker));
            }
            Err(e) => tracing::warn!("Failed to read {}: {}", SYSTEM_DICTIONARY, e),
        }
    }

    tracing::warn!("No dictionary available; spelling checks are disabled");
    Ok(Arc::new(Disabled))
}
