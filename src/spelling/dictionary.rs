//! Word-list spell checker with single-edit suggestions

use super::SpellChecker;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

const ALPHABET: std::ops::RangeInclusive<char> = 'a'..='z';

/// Spell checker backed by a set of known words
///
/// Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WordListChecker {
    words: HashSet<String>,
}

impl WordListChecker {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Loads a word list with one word per line
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_words(content.lines()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        if self.words.contains(&word) {
            return true;
        }

        // Possessives ("site's") count when the stem is known
        word.strip_suffix("'s")
            .map(|stem| self.words.contains(stem))
            .unwrap_or(false)
    }

    /// Finds a known word one edit away from `word`
    ///
    /// Transpositions are preferred over substitutions, deletions and
    /// insertions, in that order; ties within a class go to the
    /// lexicographically smallest candidate.
    fn closest(&self, word: &str) -> Option<String> {
        let chars: Vec<char> = word.to_lowercase().chars().collect();

        let classes: [fn(&[char]) -> Vec<String>; 4] =
            [transpositions, substitutions, deletions, insertions];

        classes.iter().find_map(|edits| {
            edits(&chars)
                .into_iter()
                .filter(|candidate| self.words.contains(candidate))
                .min()
        })
    }
}

impl SpellChecker for WordListChecker {
    fn is_misspelled(&self, word: &str) -> bool {
        !self.contains(word)
    }

    fn suggest(&self, word: &str) -> Option<String> {
        self.closest(word).map(|candidate| match_case(word, &candidate))
    }
}

fn transpositions(chars: &[char]) -> Vec<String> {
    (0..chars.len().saturating_sub(1))
        .map(|i| {
            let mut edited = chars.to_vec();
            edited.swap(i, i + 1);
            edited.into_iter().collect()
        })
        .collect()
}

fn substitutions(chars: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0..chars.len() {
        for c in ALPHABET.filter(|c| *c != chars[i]) {
            let mut edited = chars.to_vec();
            edited[i] = c;
            out.push(edited.into_iter().collect());
        }
    }
    out
}

fn deletions(chars: &[char]) -> Vec<String> {
    (0..chars.len())
        .map(|i| {
            chars
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| *c)
                .collect()
        })
        .collect()
}

fn insertions(chars: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0..=chars.len() {
        for c in ALPHABET {
            let mut edited = chars.to_vec();
            edited.insert(i, c);
            out.push(edited.into_iter().collect());
        }
    }
    out
}

/// Applies the capitalization pattern of `original` to `candidate`
fn match_case(original: &str, candidate: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();

    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return candidate.to_uppercase();
    }

    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = candidate.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    candidate.to_string()
}
