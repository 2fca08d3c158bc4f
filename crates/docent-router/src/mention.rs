// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection and removal of explicit address to the assistant.
//!
//! The platform encodes user mentions as `<@U123ABC>` (optionally
//! `<@U123ABC|display>`). Configured aliases such as `@docent` also count.

use std::sync::LazyLock;

use regex::Regex;

/// Any user mention token.
static MENTION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@([A-Z0-9]+)(?:\|[^>]*)?>").expect("mention pattern is valid")
});

/// Recognizes messages that address the assistant directly.
#[derive(Debug, Clone)]
pub struct AddressDetector {
    bot_user_id: String,
    aliases: Vec<String>,
}

impl AddressDetector {
    pub fn new<I>(bot_user_id: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            bot_user_id: bot_user_id.into(),
            aliases: aliases
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    /// True if `text` mentions the assistant's user id or one of its aliases.
    pub fn is_addressed(&self, text: &str) -> bool {
        let mentioned = MENTION_TOKEN
            .captures_iter(text)
            .any(|caps| caps.get(1).is_some_and(|id| id.as_str() == self.bot_user_id));
        mentioned || self.alias_ranges(text).next().is_some()
    }

    /// Removes every mention token and assistant alias, then trims.
    ///
    /// Mentions of other users are removed too; the backend cannot resolve
    /// platform ids and they only add noise to the prompt.
    pub fn strip(&self, text: &str) -> String {
        let without_tokens = MENTION_TOKEN.replace_all(text, "");
        let mut ranges: Vec<(usize, usize)> = self.alias_ranges(&without_tokens).collect();
        ranges.sort_unstable();

        let mut out = String::with_capacity(without_tokens.len());
        let mut cursor = 0;
        for (start, end) in ranges {
            if start < cursor {
                continue;
            }
            out.push_str(&without_tokens[cursor..start]);
            cursor = end;
        }
        out.push_str(&without_tokens[cursor..]);
        out.trim().to_string()
    }

    /// Byte ranges of aliases standing as whole words in `text`.
    fn alias_ranges<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.aliases.iter().flat_map(move |alias| {
            find_ignore_ascii_case(text, alias).filter(move |&(start, end)| {
                let before = text[..start].chars().next_back();
                let after = text[end..].chars().next();
                !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
            })
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every ASCII-case-insensitive occurrence of `needle` (already lowercase) in `haystack`.
fn find_ignore_ascii_case<'a>(
    haystack: &'a str,
    needle: &'a str,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let len = needle.len();
    haystack
        .char_indices()
        .map(|(i, _)| i)
        .filter(move |&i| {
            haystack
                .get(i..i + len)
                .is_some_and(|window| window.eq_ignore_ascii_case(needle))
        })
        .map(move |i| (i, i + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> AddressDetector {
        AddressDetector::new("U0BOT", ["@docent"])
    }

    #[test]
    fn detects_platform_mention() {
        let d = detector();
        assert!(d.is_addressed("<@U0BOT> how do I deploy?"));
        assert!(d.is_addressed("hey <@U0BOT|docent>, quick one"));
    }

    #[test]
    fn ignores_mentions_of_other_users() {
        let d = detector();
        assert!(!d.is_addressed("<@U0ALICE> how do I deploy?"));
    }

    #[test]
    fn detects_alias_case_insensitively() {
        let d = detector();
        assert!(d.is_addressed("@Docent what is the VPN?"));
        assert!(!d.is_addressed("email me at ops@docent.example"));
        assert!(!d.is_addressed("@docentbot is a different bot"));
    }

    #[test]
    fn strip_removes_tokens_and_aliases() {
        let d = detector();
        assert_eq!(d.strip("<@U0BOT> how do I deploy?"), "how do I deploy?");
        assert_eq!(d.strip("@docent ask <@U0ALICE> too"), "ask  too");
        assert_eq!(d.strip("no mentions here"), "no mentions here");
    }

    #[test]
    fn strip_keeps_non_ascii_text() {
        let d = detector();
        assert_eq!(d.strip("<@U0BOT> où est la doc ?"), "où est la doc ?");
    }
}
