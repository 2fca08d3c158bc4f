// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::DocentConfig;

/// Smallest segment limit that still leaves room for text after a
/// continuation label such as `(part 12/12)`.
pub const MIN_SEGMENT_LIMIT: usize = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration, collecting every error.
pub fn validate_config(config: &DocentConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.assistant.name.trim().is_empty() {
        fail("assistant.name must not be empty".to_string());
    }

    let level = config.assistant.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "assistant.log_level `{}` is not one of {}",
            config.assistant.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(id) = &config.assistant.bot_user_id
        && id.trim().is_empty()
    {
        fail("assistant.bot_user_id must not be empty when set".to_string());
    }

    for (i, alias) in config.assistant.address_aliases.iter().enumerate() {
        if alias.trim().is_empty() {
            fail(format!("assistant.address_aliases[{i}] must not be empty"));
        }
    }

    if config.threads.active_ttl_secs == 0 {
        fail("threads.active_ttl_secs must be greater than 0".to_string());
    }

    if config.threads.sweep_interval_secs == 0 {
        fail("threads.sweep_interval_secs must be greater than 0".to_string());
    }

    if config.generation.timeout_secs == 0 {
        fail("generation.timeout_secs must be greater than 0".to_string());
    }

    if config.generation.max_output_tokens == 0 {
        fail("generation.max_output_tokens must be greater than 0".to_string());
    }

    if config.preferences.directory.as_os_str().is_empty() {
        fail("preferences.directory must not be empty".to_string());
    }

    if config.delivery.segment_limit < MIN_SEGMENT_LIMIT {
        fail(format!(
            "delivery.segment_limit must be at least {MIN_SEGMENT_LIMIT}, got {}",
            config.delivery.segment_limit
        ));
    }

    if config.feedback.reaction.trim().is_empty() {
        fail("feedback.reaction must not be empty".to_string());
    }

    for (name, list) in [
        ("heuristics.interrogatives", &config.heuristics.interrogatives),
        ("heuristics.help_phrases", &config.heuristics.help_phrases),
        ("heuristics.decline_phrases", &config.heuristics.decline_phrases),
    ] {
        if list.iter().any(|entry| entry.trim().is_empty()) {
            fail(format!("{name} must not contain empty entries"));
        }
    }

    let messages = &config.messages;
    for (name, text) in [
        ("messages.not_trained", &messages.not_trained),
        ("messages.thinking", &messages.thinking),
        ("messages.empty_reply", &messages.empty_reply),
        ("messages.truncated_reply", &messages.truncated_reply),
        ("messages.backend_error", &messages.backend_error),
        ("messages.delivery_failed", &messages.delivery_failed),
        ("messages.feedback_prompt", &messages.feedback_prompt),
    ] {
        if text.trim().is_empty() {
            fail(format!("{name} must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&DocentConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = DocentConfig::default();
        config.threads.active_ttl_secs = 0;
        config.delivery.segment_limit = 10;
        config.feedback.reaction = " ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = DocentConfig::default();
        config.assistant.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("assistant.log_level"));
    }

    #[test]
    fn rejects_empty_decline_phrase() {
        let mut config = DocentConfig::default();
        config.heuristics.decline_phrases.push(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("heuristics.decline_phrases"));
    }
}
