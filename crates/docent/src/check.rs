// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docent check` command implementation.

use docent_config::DocentConfig;
use docent_core::error::DocentError;
use docent_core::traits::Adapter;
use docent_core::types::HealthStatus;
use docent_prefs::FilePersistence;

/// Reports the effective configuration and preference storage health.
///
/// Configuration errors never reach here; they are rendered at load time.
pub async fn run_check(config: &DocentConfig) -> Result<(), DocentError> {
    for line in summary(config) {
        println!("{line}");
    }

    let persistence = FilePersistence::new(&config.preferences.directory);
    let status = persistence.health_check().await?;
    match &status {
        HealthStatus::Healthy => println!("preferences: ok"),
        HealthStatus::Degraded(reason) => println!("preferences: degraded ({reason})"),
        HealthStatus::Unhealthy(reason) => {
            return Err(DocentError::Configuration(format!(
                "preference storage unusable: {reason}"
            )));
        }
    }
    Ok(())
}

fn summary(config: &DocentConfig) -> Vec<String> {
    vec![
        format!("config: ok (assistant.name={})", config.assistant.name),
        format!(
            "bot user id: {}",
            config
                .assistant
                .bot_user_id
                .as_deref()
                .unwrap_or("resolved from platform")
        ),
        format!(
            "ambient: {} (default cooldown {}s)",
            if config.ambient.enabled { "enabled" } else { "disabled" },
            config.ambient.default_cooldown_secs
        ),
        format!(
            "threads: active for {}s, {} history turns",
            config.threads.active_ttl_secs, config.threads.history_turns
        ),
        format!(
            "generation: timeout {}s, max {} output tokens",
            config.generation.timeout_secs, config.generation.max_output_tokens
        ),
        format!("preferences: {}", config.preferences.directory.display()),
        format!(
            "instructions: {} chars{}",
            config.assistant.resolve_instructions().chars().count(),
            config
                .assistant
                .instructions_file
                .as_ref()
                .map(|p| format!(" (from {})", p.display()))
                .unwrap_or_default()
        ),
    ]
}
