// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Docent configuration system.

use docent_config::diagnostic::ConfigError;
use docent_config::model::DocentConfig;
use docent_config::{load_and_validate_str, load_config, load_config_from_path, load_config_from_str};

/// Every section with explicit values deserializes.
#[test]
fn full_toml_deserializes_into_docent_config() {
    let toml = r#"
[assistant]
name = "helpdesk"
log_level = "debug"
bot_user_id = "U0BOT"
address_aliases = ["@helpdesk"]

[ambient]
enabled = false
default_cooldown_secs = 60

[threads]
active_ttl_secs = 3600
history_turns = 4

[generation]
timeout_secs = 30
max_output_tokens = 512

[preferences]
directory = "/var/lib/docent"
staleness_check_secs = 10

[delivery]
segment_limit = 2000
show_thinking = false

[feedback]
reaction = "x"

[heuristics]
interrogatives = ["what"]
help_phrases = ["help"]
decline_phrases = ["no idea"]

[messages]
not_trained = "not set up"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.assistant.name, "helpdesk");
    assert_eq!(config.assistant.bot_user_id.as_deref(), Some("U0BOT"));
    assert_eq!(config.assistant.address_aliases, vec!["@helpdesk"]);
    assert!(!config.ambient.enabled);
    assert_eq!(config.ambient.default_cooldown_secs, 60);
    assert_eq!(config.threads.active_ttl_secs, 3600);
    assert_eq!(config.threads.history_turns, 4);
    assert_eq!(config.threads.sweep_interval_secs, 300);
    assert_eq!(config.generation.timeout_secs, 30);
    assert_eq!(config.preferences.directory.to_str(), Some("/var/lib/docent"));
    assert_eq!(config.delivery.segment_limit, 2000);
    assert!(!config.delivery.show_thinking);
    assert_eq!(config.feedback.reaction, "x");
    assert_eq!(config.heuristics.decline_phrases, vec!["no idea"]);
    assert_eq!(config.messages.not_trained, "not set up");
    // Unset messages keep their defaults.
    assert!(config.messages.truncated_reply.contains("too complex"));
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.assistant.name, "docent");
    assert_eq!(config.assistant.log_level, "info");
    assert!(config.assistant.bot_user_id.is_none());
    assert_eq!(config.threads.active_ttl_secs, 7200);
    assert_eq!(config.generation.max_output_tokens, 1024);
    assert_eq!(config.delivery.segment_limit, 3900);
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[ambient]
default_cooldwn_secs = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "default_cooldwn_secs");
            assert_eq!(suggestion.as_deref(), Some("default_cooldown_secs"));
            assert!(span.is_some(), "inline source should be located");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n")
        .expect_err("unknown section should fail");
    assert!(err.to_string().contains("telemetry"));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[threads]
active_ttl_secs = "two hours"
"#;

    let errors = load_and_validate_str(toml).expect_err("string is not an integer");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key == "threads.active_ttl_secs")),
        "got {errors:?}"
    );
}

#[test]
fn wrong_type_points_at_the_value_key() {
    let toml = "[threads]\nactive_ttl_secs = \"two hours\"\n";

    let errors = load_and_validate_str(toml).expect_err("string is not an integer");
    match &errors[0] {
        ConfigError::InvalidType { span, found, .. } => {
            let span = span.expect("inline source should be located");
            assert_eq!(span.offset(), toml.find("active_ttl_secs").unwrap());
            assert!(found.contains("two hours"), "found: {found}");
        }
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn unparseable_toml_is_malformed() {
    let errors = load_and_validate_str("[threads\nactive_ttl_secs = 10\n")
        .expect_err("unclosed table header");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ConfigError::Malformed(_)), "got {errors:?}");
}

#[test]
fn semantic_errors_are_reported_together() {
    let toml = r#"
[threads]
active_ttl_secs = 0

[generation]
timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero durations are invalid");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn env_var_overrides_file_value() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
        jail.create_file(
            "docent.toml",
            r#"
[ambient]
default_cooldown_secs = 120
"#,
        )?;
        jail.set_env("DOCENT_AMBIENT_DEFAULT_COOLDOWN_SECS", "60");
        jail.set_env("DOCENT_ASSISTANT_BOT_USER_ID", "U0ENV");

        let config = load_config()?;
        assert_eq!(config.ambient.default_cooldown_secs, 60);
        assert_eq!(config.assistant.bot_user_id.as_deref(), Some("U0ENV"));
        Ok(())
    });
}

#[test]
fn local_file_is_picked_up() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
        jail.create_file("docent.toml", "[feedback]\nreaction = \"-1\"\n")?;

        let config = load_config()?;
        assert_eq!(config.feedback.reaction, "-1");
        Ok(())
    });
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[delivery]\nsegment_limit = 1500\n").unwrap();

    let config = load_config_from_path(&path).expect("file should load");
    assert_eq!(config.delivery.segment_limit, 1500);
}

#[test]
fn missing_explicit_path_yields_defaults() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/docent.toml"))
        .expect("missing file is skipped");
    let defaults = DocentConfig::default();
    assert_eq!(config.delivery.segment_limit, defaults.delivery.segment_limit);
}
