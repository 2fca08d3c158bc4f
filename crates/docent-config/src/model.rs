// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Docent assistant.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of silently falling back to a default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Docent configuration.
///
/// Built once at startup and handed by value to the orchestrator; nothing
/// reads configuration from global state afterwards.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DocentConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Unsolicited-reply settings.
    #[serde(default)]
    pub ambient: AmbientConfig,

    /// Active-thread tracking and history.
    #[serde(default)]
    pub threads: ThreadsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Word lists driving the question and decline heuristics.
    #[serde(default)]
    pub heuristics: HeuristicsConfig,

    /// Fixed user-facing texts.
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Identity and instructions of the assistant.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Platform user id of the assistant. Resolved from the platform when unset.
    #[serde(default)]
    pub bot_user_id: Option<String>,

    /// Plain-text handles that also count as addressing the assistant.
    #[serde(default)]
    pub address_aliases: Vec<String>,

    /// Inline system instructions. `instructions_file` wins if both are set.
    #[serde(default = "default_instructions")]
    pub instructions: String,

    #[serde(default)]
    pub instructions_file: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            log_level: default_log_level(),
            bot_user_id: None,
            address_aliases: Vec::new(),
            instructions: default_instructions(),
            instructions_file: None,
        }
    }
}

impl AssistantConfig {
    /// System instructions, reading `instructions_file` when configured.
    ///
    /// An unreadable file falls back to the inline instructions.
    pub fn resolve_instructions(&self) -> String {
        if let Some(path) = &self.instructions_file {
            match std::fs::read_to_string(path) {
                Ok(content) if !content.trim().is_empty() => return content,
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "instructions file is empty, using inline instructions");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read instructions file, using inline instructions");
                }
            }
        }
        self.instructions.clone()
    }
}

fn default_assistant_name() -> String {
    "docent".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_instructions() -> String {
    "You are a helpful assistant for this team. Answer only from the provided \
     documentation. If the documentation does not cover the question, say that \
     you have not been trained on this topic."
        .to_string()
}

/// Unsolicited (ambient) reply settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AmbientConfig {
    /// Global switch. A user seen for the first time starts silenced when this is off.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum interval between ambient replies to one user in one channel.
    #[serde(default = "default_cooldown_secs")]
    pub default_cooldown_secs: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl AmbientConfig {
    pub fn default_cooldown(&self) -> Duration {
        Duration::from_secs(self.default_cooldown_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_cooldown_secs() -> u64 {
    300
}

/// Active-thread tracking.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadsConfig {
    /// How long a thread stays active after the assistant's last reply.
    #[serde(default = "default_active_ttl_secs")]
    pub active_ttl_secs: u64,

    /// Interval of the in-memory expiry sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Maximum prior turns passed to the backend when replying in a thread.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            active_ttl_secs: default_active_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            history_turns: default_history_turns(),
        }
    }
}

impl ThreadsConfig {
    pub fn active_ttl(&self) -> Duration {
        Duration::from_secs(self.active_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_active_ttl_secs() -> u64 {
    2 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_history_turns() -> usize {
    10
}

/// Generation backend call settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generation_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_max_output_tokens() -> u32 {
    1024
}

/// Preference store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesConfig {
    /// Directory holding `users.json` and `channels.json`.
    #[serde(default = "default_preferences_directory")]
    pub directory: PathBuf,

    /// Minimum interval between checks of the backing store for changes.
    #[serde(default = "default_staleness_check_secs")]
    pub staleness_check_secs: u64,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            directory: default_preferences_directory(),
            staleness_check_secs: default_staleness_check_secs(),
        }
    }
}

impl PreferencesConfig {
    pub fn staleness_check(&self) -> Duration {
        Duration::from_secs(self.staleness_check_secs)
    }
}

fn default_preferences_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("docent"))
        .unwrap_or_else(|| PathBuf::from("./docent-data"))
}

fn default_staleness_check_secs() -> u64 {
    5
}

/// Outbound message formatting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Maximum characters per posted segment, continuation label included.
    #[serde(default = "default_segment_limit")]
    pub segment_limit: usize,

    /// Post a placeholder before generating a direct reply.
    #[serde(default = "default_true")]
    pub show_thinking: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            segment_limit: default_segment_limit(),
            show_thinking: true,
        }
    }
}

fn default_segment_limit() -> usize {
    3900
}

/// Feedback trigger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackConfig {
    /// Reaction name that opens a feedback prompt when added to an assistant message.
    #[serde(default = "default_feedback_reaction")]
    pub reaction: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            reaction: default_feedback_reaction(),
        }
    }
}

fn default_feedback_reaction() -> String {
    "thumbsdown".to_string()
}

/// Word lists for the text heuristics. Matching is case-insensitive.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeuristicsConfig {
    /// Leading words that make a message look like a question.
    #[serde(default = "default_interrogatives")]
    pub interrogatives: Vec<String>,

    /// Phrases anywhere in a message that signal a request for help.
    #[serde(default = "default_help_phrases")]
    pub help_phrases: Vec<String>,

    /// Phrases in generated text that signal the backend could not answer.
    #[serde(default = "default_decline_phrases")]
    pub decline_phrases: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            interrogatives: default_interrogatives(),
            help_phrases: default_help_phrases(),
            decline_phrases: default_decline_phrases(),
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn default_interrogatives() -> Vec<String> {
    to_strings(&[
        "who", "what", "when", "where", "why", "how", "which", "is", "are", "can", "could",
        "should", "would", "does", "do", "did", "will", "has", "have",
    ])
}

fn default_help_phrases() -> Vec<String> {
    to_strings(&[
        "help",
        "anyone know",
        "does anyone",
        "not sure how",
        "i'm stuck",
        "im stuck",
        "struggling with",
        "how to",
        "looking for",
        "need to know",
    ])
}

fn default_decline_phrases() -> Vec<String> {
    to_strings(&[
        "not trained",
        "not been trained",
        "outside the scope",
        "cannot answer",
        "can't answer",
        "no relevant documentation",
        "i don't know",
        "i do not know",
    ])
}

/// Fixed user-facing texts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Direct reply in a channel with no corpus bound.
    #[serde(default = "default_not_trained")]
    pub not_trained: String,

    /// Placeholder shown while generating.
    #[serde(default = "default_thinking")]
    pub thinking: String,

    /// Direct reply when the backend produced no text.
    #[serde(default = "default_empty_reply")]
    pub empty_reply: String,

    /// Direct reply when the backend ran out of room before producing text.
    #[serde(default = "default_truncated_reply")]
    pub truncated_reply: String,

    /// Direct reply when the backend failed.
    #[serde(default = "default_backend_error")]
    pub backend_error: String,

    /// Best-effort notice after a failed delivery.
    #[serde(default = "default_delivery_failed")]
    pub delivery_failed: String,

    /// Private prompt sent after a feedback reaction.
    #[serde(default = "default_feedback_prompt")]
    pub feedback_prompt: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            not_trained: default_not_trained(),
            thinking: default_thinking(),
            empty_reply: default_empty_reply(),
            truncated_reply: default_truncated_reply(),
            backend_error: default_backend_error(),
            delivery_failed: default_delivery_failed(),
            feedback_prompt: default_feedback_prompt(),
        }
    }
}

fn default_not_trained() -> String {
    "I haven't been trained for this channel yet. Ask an admin to connect a knowledge source."
        .to_string()
}

fn default_thinking() -> String {
    "Thinking...".to_string()
}

fn default_empty_reply() -> String {
    "Sorry, I couldn't find an answer to that. Could you rephrase or add more detail?".to_string()
}

fn default_truncated_reply() -> String {
    "That question is too complex for me to answer in one go, please rephrase or narrow it down."
        .to_string()
}

fn default_backend_error() -> String {
    "Sorry, something went wrong while generating an answer. Please try again in a moment."
        .to_string()
}

fn default_delivery_failed() -> String {
    "Sorry, I couldn't post my full answer here.".to_string()
}

fn default_feedback_prompt() -> String {
    "Thanks for flagging that answer. Tell us what went wrong so we can improve it.".to_string()
}
