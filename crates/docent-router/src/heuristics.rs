// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Swappable text heuristics.
//!
//! Both heuristics are plain `text -> bool` predicates. Anything implementing
//! [`TextHeuristic`], closures included, can replace them, for example a
//! model-based classifier.

use docent_config::model::HeuristicsConfig;

/// A yes/no judgement about a piece of text.
pub trait TextHeuristic: Send + Sync {
    fn matches(&self, text: &str) -> bool;
}

impl<F> TextHeuristic for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, text: &str) -> bool {
        self(text)
    }
}

/// Lowercases and folds typographic apostrophes so `don’t` matches `don't`.
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// True if `phrase` occurs in `haystack` with no letter or digit directly
/// on either side. Both arguments must already be normalized.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Does a message look like a question or a request for help?
///
/// Yes if it ends with `?`, starts with an interrogative word, or contains a
/// help-seeking phrase.
#[derive(Debug, Clone)]
pub struct QuestionHeuristic {
    interrogatives: Vec<String>,
    help_phrases: Vec<String>,
}

impl QuestionHeuristic {
    pub fn new<I, J>(interrogatives: I, help_phrases: J) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        J: IntoIterator,
        J::Item: AsRef<str>,
    {
        Self {
            interrogatives: interrogatives
                .into_iter()
                .map(|w| normalize(w.as_ref().trim()))
                .collect(),
            help_phrases: help_phrases
                .into_iter()
                .map(|p| normalize(p.as_ref().trim()))
                .collect(),
        }
    }

    pub fn from_config(config: &HeuristicsConfig) -> Self {
        Self::new(&config.interrogatives, &config.help_phrases)
    }
}

impl Default for QuestionHeuristic {
    fn default() -> Self {
        Self::from_config(&HeuristicsConfig::default())
    }
}

impl TextHeuristic for QuestionHeuristic {
    fn matches(&self, text: &str) -> bool {
        let lower = normalize(text.trim());
        if lower.is_empty() {
            return false;
        }
        if lower.ends_with('?') {
            return true;
        }

        let first_word = lower
            .split_whitespace()
            .next()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .unwrap_or_default();
        // "what's" counts as "what".
        let stem = first_word.split('\'').next().unwrap_or(first_word);
        if self
            .interrogatives
            .iter()
            .any(|w| w == first_word || w == stem)
        {
            return true;
        }

        self.help_phrases
            .iter()
            .any(|phrase| contains_phrase(&lower, phrase))
    }
}

/// Does generated text signal that the backend could not answer?
///
/// Case-insensitive substring match against a phrase list. This is a
/// best-effort filter and will miss rephrased declines.
#[derive(Debug, Clone)]
pub struct DeclineHeuristic {
    phrases: Vec<String>,
}

impl DeclineHeuristic {
    pub fn new<I>(phrases: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| normalize(p.as_ref().trim()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &HeuristicsConfig) -> Self {
        Self::new(&config.decline_phrases)
    }

    /// The first configured phrase found in `text`, if any.
    pub fn matched_phrase(&self, text: &str) -> Option<&str> {
        let lower = normalize(text);
        self.phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

impl Default for DeclineHeuristic {
    fn default() -> Self {
        Self::from_config(&HeuristicsConfig::default())
    }
}

impl TextHeuristic for DeclineHeuristic {
    fn matches(&self, text: &str) -> bool {
        self.matched_phrase(text).is_some()
    }
}
