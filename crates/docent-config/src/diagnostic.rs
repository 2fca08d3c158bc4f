// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns configuration failures into miette reports.
//!
//! Every model field has a default, so loading can only fail on a key that
//! does not exist, a value of the wrong shape, or TOML that does not parse.
//! Validation adds a fourth kind for values that parse but cannot work.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section.as_deref()))]
    #[diagnostic(
        code(docent::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Table holding the key, `None` at the top level.
        section: Option<String>,
        suggestion: Option<String>,
        valid_keys: Vec<&'static str>,
        #[label("not a docent setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(docent::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `threads.active_ttl_secs`.
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but makes no sense (zero TTL, empty trigger, ...).
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(docent::config::validation))]
    Validation { message: String },

    /// Unparseable TOML or a value figment rejected for another reason.
    #[error("{0}")]
    #[diagnostic(code(docent::config::malformed))]
    Malformed(String),
}

fn section_label(section: Option<&str>) -> String {
    match section {
        Some(name) => format!("[{name}]"),
        None => "the top level".to_string(),
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &[&str]) -> String {
    let valid = valid_keys.join(", ");
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Known keys here: {valid}"),
        None => format!("known keys here: {valid}"),
    }
}

/// Maps each error inside a `figment::Error` onto a [`ConfigError`].
///
/// `toml_sources` pairs a file path with its contents; when a failing key can
/// be found in one of them the report points at it.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let source = source_for(&error, toml_sources);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(source, &error.path, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: (!error.path.is_empty()).then(|| error.path.join(".")),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.to_vec(),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (span, src) = match error.path.split_last() {
                        Some((field, table)) => locate(source, table, field),
                        None => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Malformed(error.to_string()),
            }
        })
        .collect()
}

/// The source text an error came from.
///
/// Inline strings carry no file metadata, so a lone source is assumed.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    match file {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    }
}

fn locate(
    source: Option<&(String, String)>,
    table: &[String],
    field: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((path, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, table, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` as a key inside the table named by `table`.
///
/// An empty `table` searches the lines before the first table header.
pub fn find_key_offset(content: &str, table: &[String], field: &str) -> Option<usize> {
    let start = if table.is_empty() {
        0
    } else {
        let header = format!("[{}]", table.join("."));
        content.find(&header).map(|pos| pos + header.len())?
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            break;
        }
        if let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }

    None
}

/// Closest known key to `unknown`, if any is close enough to be a typo.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Writes every error to stderr as a graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    #[test]
    fn suggests_cooldown_key_for_typo() {
        let valid = &["enabled", "default_cooldown_secs"];
        assert_eq!(
            suggest_key("default_cooldwn_secs", valid),
            Some("default_cooldown_secs".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level", "bot_user_id"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_its_table() {
        let content = "[assistant]\nname = \"x\"\n\n[threads]\nactive_ttl = 10\n";
        let offset = find_key_offset(content, &table("threads"), "active_ttl").unwrap();
        assert_eq!(&content[offset..offset + 10], "active_ttl");
    }

    #[test]
    fn key_must_match_whole_name() {
        let content = "[delivery]\nsegment_limit_max = 3\n";
        assert_eq!(find_key_offset(content, &table("delivery"), "segment_limit"), None);
    }

    #[test]
    fn search_stops_at_next_table() {
        let content = "[ambient]\nenabled = true\n\n[delivery]\nsegment_limit = 3\n";
        assert_eq!(find_key_offset(content, &table("ambient"), "segment_limit"), None);
    }

    #[test]
    fn unknown_key_message_names_its_table() {
        let err = ConfigError::UnknownKey {
            key: "cooldown".into(),
            section: Some("ambient".into()),
            suggestion: None,
            valid_keys: vec!["enabled"],
            span: None,
            src: None,
        };
        assert_eq!(err.to_string(), "unknown key `cooldown` in [ambient]");
        let help = err.help().map(|h| h.to_string()).unwrap();
        assert_eq!(help, "known keys here: enabled");
    }
}
