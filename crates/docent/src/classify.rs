// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docent classify` command implementation.
//!
//! Replays recorded events through the classifier against the configured
//! preferences. Nothing is generated or posted, so threads never become
//! active during a dry run.

use std::path::Path;
use std::sync::Arc;

use docent_agent::EngagementState;
use docent_config::DocentConfig;
use docent_core::clock::{Clock, SystemClock};
use docent_core::error::DocentError;
use docent_core::types::InboundEvent;
use docent_engage::{ActiveConversationTracker, CooldownEngine, MemoryStateStore};
use docent_prefs::{FilePersistence, PreferenceStore};
use docent_router::{Classification, ConversationState, EventClassifier};

/// Classify every event in the JSONL file at `events` and print one line each.
pub async fn run_classify(
    config: &DocentConfig,
    events: &Path,
    bot_user_id: Option<String>,
) -> Result<(), DocentError> {
    let bot_user_id = bot_user_id
        .or_else(|| config.assistant.bot_user_id.clone())
        .ok_or_else(|| {
            DocentError::Configuration(
                "bot user id is required: pass --bot-user-id or set assistant.bot_user_id"
                    .to_string(),
            )
        })?;

    let input = tokio::fs::read_to_string(events).await.map_err(|e| {
        DocentError::Configuration(format!("cannot read {}: {e}", events.display()))
    })?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = engagement_state(config, clock);
    let classifier = EventClassifier::from_config(bot_user_id, config);

    for line in classify_lines(&classifier, &state, &input).await? {
        println!("{line}");
    }
    Ok(())
}

fn engagement_state(config: &DocentConfig, clock: Arc<dyn Clock>) -> EngagementState {
    let persistence = Arc::new(FilePersistence::new(&config.preferences.directory));
    let prefs = Arc::new(PreferenceStore::from_config(
        config,
        persistence,
        clock.clone(),
    ));
    let cooldown = Arc::new(CooldownEngine::new(
        prefs.clone(),
        clock.clone(),
        config.ambient.default_cooldown(),
    ));
    let store = Arc::new(MemoryStateStore::new(clock.clone()));
    let threads = Arc::new(ActiveConversationTracker::new(
        store,
        clock,
        config.threads.active_ttl(),
    ));
    EngagementState::new(prefs, cooldown, threads)
}

async fn classify_lines(
    classifier: &EventClassifier,
    state: &dyn ConversationState,
    input: &str,
) -> Result<Vec<String>, DocentError> {
    let mut out = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let event: InboundEvent = serde_json::from_str(raw).map_err(|e| {
            DocentError::Configuration(format!("event on line {}: {e}", idx + 1))
        })?;
        let classification = classifier.classify(&event, state).await;
        out.push(format!(
            "{}\t{}\t{}",
            event.timestamp,
            classification.label(),
            detail(&classification)
        ));
    }
    Ok(out)
}

fn detail(classification: &Classification) -> String {
    match classification {
        Classification::Ignore(reason) => reason.to_string(),
        Classification::FeedbackPrompt { message_timestamp } => {
            format!("message={message_timestamp}")
        }
        Classification::DirectReply {
            thread_root,
            trigger,
        } => format!("{trigger} thread={thread_root}"),
        Classification::AmbientReply => "private".to_string(),
    }
}
