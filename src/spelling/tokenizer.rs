//! Splits visible text into checkable words

use crate::config::SpellingConfig;
use std::collections::HashSet;

/// A word to check plus the text window it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word as written on the page, punctuation stripped
    pub word: String,

    /// Surrounding raw text in original casing
    pub context: String,
}

/// Word extraction rules
#[derive(Debug, Clone)]
pub struct Tokenizer {
    min_word_length: usize,
    context_words: usize,
    ignore: HashSet<String>,
}

impl Tokenizer {
    pub fn new(min_word_length: usize, context_words: usize) -> Self {
        Self {
            min_word_length,
            context_words,
            ignore: HashSet::new(),
        }
    }

    pub fn from_config(config: &SpellingConfig) -> Self {
        Self::new(config.min_word_length, config.context_words)
            .with_ignored(config.ignore_words.iter())
    }

    /// Words that are never reported, compared case-insensitively
    pub fn with_ignored<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Extracts checkable words in order of appearance
    ///
    /// Whitespace-separated pieces that look like URLs or e-mail addresses are
    /// skipped entirely. The rest lose surrounding punctuation and are split
    /// on hyphens; a part is kept only if it consists of letters (and
    /// apostrophes), reaches the minimum length and is not ignored.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let raw: Vec<&str> = text.split_whitespace().collect();
        let mut tokens = Vec::new();

        for (i, piece) in raw.iter().enumerate() {
            if looks_like_address(piece) {
                continue;
            }

            let piece = piece.replace('\u{2019}', "'");
            for part in piece.split('-') {
                let word = part.trim_matches(|c: char| !c.is_alphanumeric());
                if !self.is_checkable(word) {
                    continue;
                }

                tokens.push(Token {
                    word: word.to_string(),
                    context: self.context(&raw, i),
                });
            }
        }

        tokens
    }

    fn is_checkable(&self, word: &str) -> bool {
        if word.chars().count() < self.min_word_length {
            return false;
        }

        if !word.chars().all(|c| c.is_alphabetic() || c == '\'') {
            return false;
        }

        !self.ignore.contains(&word.to_lowercase())
    }

    fn context(&self, raw: &[&str], index: usize) -> String {
        let start = index.saturating_sub(self.context_words);
        let end = (index + self.context_words + 1).min(raw.len());
        raw[start..end].join(" ")
    }
}

fn looks_like_address(piece: &str) -> bool {
    let lower = piece.to_ascii_lowercase();
    lower.contains("://")
        || lower.starts_with("www.")
        || lower.contains('/')
        || (lower.contains('@') && lower.contains('.'))
}
