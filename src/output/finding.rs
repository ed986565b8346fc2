//! Finding definitions
//!
//! A finding is one reportable issue tied to the page it was found on.

use crate::state::FailureReason;
use crate::url::NormalizedUrl;
use serde::Serialize;
use std::fmt;

/// One discrete reportable issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The page being crawled could not be fetched or parsed
    PageError {
        page: NormalizedUrl,
        reason: FailureReason,
    },

    /// A word in the page's visible text failed the spelling check
    MisspelledWord {
        page: NormalizedUrl,
        word: String,
        context: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },

    /// An `<a href>` target failed its existence probe
    BrokenLink {
        page: NormalizedUrl,
        target: NormalizedUrl,
        reason: FailureReason,
    },

    /// An `<img src>` target failed its existence probe
    BrokenImage {
        page: NormalizedUrl,
        target: NormalizedUrl,
        reason: FailureReason,
    },
}

/// Discriminant of [`Finding`]; the declaration order is the report order
/// within a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    PageError,
    MisspelledWord,
    BrokenLink,
    BrokenImage,
}

impl FindingKind {
    pub const ALL: [FindingKind; 4] = [
        FindingKind::PageError,
        FindingKind::MisspelledWord,
        FindingKind::BrokenLink,
        FindingKind::BrokenImage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PageError => "page_error",
            Self::MisspelledWord => "misspelled_word",
            Self::BrokenLink => "broken_link",
            Self::BrokenImage => "broken_image",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Self::PageError { .. } => FindingKind::PageError,
            Self::MisspelledWord { .. } => FindingKind::MisspelledWord,
            Self::BrokenLink { .. } => FindingKind::BrokenLink,
            Self::BrokenImage { .. } => FindingKind::BrokenImage,
        }
    }

    /// The page this finding was recorded against
    pub fn page(&self) -> &NormalizedUrl {
        match self {
            Self::PageError { page, .. }
            | Self::MisspelledWord { page, .. }
            | Self::BrokenLink { page, .. }
            | Self::BrokenImage { page, .. } => page,
        }
    }

    /// The broken link or image, if this finding is about one
    pub fn target(&self) -> Option<&NormalizedUrl> {
        match self {
            Self::BrokenLink { target, .. } | Self::BrokenImage { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::PageError { reason, .. }
            | Self::BrokenLink { reason, .. }
            | Self::BrokenImage { reason, .. } => Some(reason),
            Self::MisspelledWord { .. } => None,
        }
    }
}
