// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docent prefs` command implementation.
//!
//! Administrative operations against the file-backed preference store. Each
//! command prints the resulting preference record as JSON.

use std::sync::Arc;

use clap::Subcommand;
use docent_config::DocentConfig;
use docent_core::clock::SystemClock;
use docent_core::error::DocentError;
use docent_prefs::{FilePersistence, PreferenceStore};

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PrefsAction {
    /// Subscribe a channel to ambient answers, optionally binding a corpus.
    Subscribe {
        channel: String,
        #[arg(long)]
        corpus: Option<String>,
    },
    /// Stop ambient answers in a channel. Direct requests still work.
    Unsubscribe { channel: String },
    /// Bind a knowledge corpus to a channel; omit `--corpus` to unbind it.
    SetCorpus {
        channel: String,
        #[arg(long)]
        corpus: Option<String>,
    },
    /// Override a user's ambient cooldown; omit `--secs` to use the default.
    SetCooldown {
        user: String,
        #[arg(long)]
        secs: Option<u64>,
    },
    /// Opt a user out of ambient answers.
    Silence { user: String },
    /// Opt a user back in to ambient answers.
    Unsilence { user: String },
    /// Show a channel's preferences.
    Channel { channel: String },
    /// Show a user's preferences.
    User { user: String },
}

/// Run a `docent prefs` subcommand against the configured directory.
pub async fn run_prefs(config: &DocentConfig, action: PrefsAction) -> Result<(), DocentError> {
    let persistence = Arc::new(FilePersistence::new(&config.preferences.directory));
    let store = PreferenceStore::from_config(config, persistence, Arc::new(SystemClock));
    let record = apply(&store, action).await?;
    println!("{record}");
    Ok(())
}

/// Applies `action` and returns the affected record as pretty JSON.
pub async fn apply(store: &PreferenceStore, action: PrefsAction) -> Result<String, DocentError> {
    match action {
        PrefsAction::Subscribe { channel, corpus } => {
            to_json(&store.subscribe_channel(&channel, corpus).await)
        }
        PrefsAction::Unsubscribe { channel } => {
            to_json(&store.unsubscribe_channel(&channel).await)
        }
        PrefsAction::SetCorpus { channel, corpus } => {
            to_json(&store.set_corpus(&channel, corpus).await)
        }
        PrefsAction::SetCooldown { user, secs } => {
            to_json(&store.set_user_cooldown(&user, secs).await)
        }
        PrefsAction::Silence { user } => to_json(&store.set_user_silenced(&user, true).await),
        PrefsAction::Unsilence { user } => to_json(&store.set_user_silenced(&user, false).await),
        PrefsAction::Channel { channel } => to_json(&store.channel(&channel).await),
        PrefsAction::User { user } => to_json(&store.user(&user).await),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DocentError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| DocentError::Internal(format!("failed to render preferences: {e}")))
}
