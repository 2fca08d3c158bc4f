// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached preference store with throttled reloads and graceful degradation.
//!
//! Each preference kind lives in one JSON document keyed by id. Reads are
//! served from memory; the backing document is re-read only on first access
//! or when a staleness check (at most once per `staleness_check`) sees a new
//! modification time. Nothing here returns an error: unreadable or corrupt
//! data degrades to defaults and failed writes keep the in-memory value.
//! A document that could not be read is never written back, so an outage of
//! the backing store cannot overwrite what it holds.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docent_config::DocentConfig;
use docent_core::clock::Clock;
use docent_core::traits::PreferencePersistence;
use docent_core::types::{
    ChannelPreference, ChannelPreferenceUpdate, UserPreference, UserPreferenceUpdate,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Document holding every [`UserPreference`].
pub const USERS_KEY: &str = "users.json";

/// Document holding every [`ChannelPreference`].
pub const CHANNELS_KEY: &str = "channels.json";

/// Cached copy of one persisted document.
struct Document<T> {
    key: &'static str,
    entries: HashMap<String, T>,
    loaded: bool,
    /// The last load attempt could not read the backing document.
    load_failed: bool,
    /// Modification time of the backing document when last loaded or written.
    version: Option<DateTime<Utc>>,
    last_checked: Option<DateTime<Utc>>,
}

/// Result of reading one backing document.
enum Load<T> {
    /// Decoded entries; empty for a missing or corrupt document.
    Ready(HashMap<String, T>),
    /// The read itself failed; the document's contents are unknown.
    Unavailable,
}

impl<T> Document<T> {
    fn new(key: &'static str) -> Self {
        Self {
            key,
            entries: HashMap::new(),
            loaded: false,
            load_failed: false,
            version: None,
            last_checked: None,
        }
    }
}

/// Per-user and per-channel settings, cached over a persistence collaborator.
pub struct PreferenceStore {
    persistence: Arc<dyn PreferencePersistence>,
    clock: Arc<dyn Clock>,
    ambient_enabled: bool,
    staleness_check: Duration,
    users: Mutex<Document<UserPreference>>,
    channels: Mutex<Document<ChannelPreference>>,
}

impl PreferenceStore {
    /// Creates a store. New users start silenced when `ambient_enabled` is false.
    pub fn new(
        persistence: Arc<dyn PreferencePersistence>,
        clock: Arc<dyn Clock>,
        ambient_enabled: bool,
        staleness_check: Duration,
    ) -> Self {
        Self {
            persistence,
            clock,
            ambient_enabled,
            staleness_check,
            users: Mutex::new(Document::new(USERS_KEY)),
            channels: Mutex::new(Document::new(CHANNELS_KEY)),
        }
    }

    pub fn from_config(
        config: &DocentConfig,
        persistence: Arc<dyn PreferencePersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            persistence,
            clock,
            config.ambient.enabled,
            config.preferences.staleness_check(),
        )
    }

    /// Preferences for `user_id`, created with defaults on first lookup.
    pub async fn user(&self, user_id: &str) -> UserPreference {
        let mut doc = self.users.lock().await;
        self.refresh(&mut doc).await;
        let now = self.clock.now();
        let ambient_enabled = self.ambient_enabled;
        doc.entries
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreference::new_default(ambient_enabled, now))
            .clone()
    }

    /// Preferences for `channel_id`, created with defaults on first lookup.
    pub async fn channel(&self, channel_id: &str) -> ChannelPreference {
        let mut doc = self.channels.lock().await;
        self.refresh(&mut doc).await;
        let now = self.clock.now();
        doc.entries
            .entry(channel_id.to_string())
            .or_insert_with(|| ChannelPreference::new_default(now))
            .clone()
    }

    /// Applies a partial update and persists the user document.
    pub async fn update_user(&self, user_id: &str, update: UserPreferenceUpdate) -> UserPreference {
        let mut doc = self.users.lock().await;
        self.refresh(&mut doc).await;
        let now = self.clock.now();
        let ambient_enabled = self.ambient_enabled;
        let pref = doc
            .entries
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreference::new_default(ambient_enabled, now));

        if let Some(silenced) = update.silenced {
            pref.silenced = silenced;
        }
        if let Some(cooldown) = update.custom_cooldown_secs {
            pref.custom_cooldown_secs = cooldown;
        }
        if let Some((channel, at)) = update.last_response {
            pref.last_response_at.insert(channel, at);
        }
        pref.updated_at = now;
        let updated = pref.clone();

        self.persist(&mut doc).await;
        updated
    }

    /// Applies a partial update and persists the channel document.
    pub async fn update_channel(
        &self,
        channel_id: &str,
        update: ChannelPreferenceUpdate,
    ) -> ChannelPreference {
        let mut doc = self.channels.lock().await;
        self.refresh(&mut doc).await;
        let now = self.clock.now();
        let pref = doc
            .entries
            .entry(channel_id.to_string())
            .or_insert_with(|| ChannelPreference::new_default(now));

        if let Some(subscribed) = update.subscribed {
            pref.subscribed = subscribed;
        }
        if let Some(corpus_id) = update.corpus_id {
            pref.corpus_id = corpus_id;
        }
        pref.updated_at = now;
        let updated = pref.clone();

        self.persist(&mut doc).await;
        updated
    }

    /// Subscribes a channel, optionally binding a corpus in the same write.
    pub async fn subscribe_channel(
        &self,
        channel_id: &str,
        corpus_id: Option<String>,
    ) -> ChannelPreference {
        let update = ChannelPreferenceUpdate {
            subscribed: Some(true),
            corpus_id: corpus_id.map(Some),
        };
        let pref = self.update_channel(channel_id, update).await;
        info!(channel = channel_id, corpus = ?pref.corpus_id, "channel subscribed");
        pref
    }

    pub async fn unsubscribe_channel(&self, channel_id: &str) -> ChannelPreference {
        let update = ChannelPreferenceUpdate {
            subscribed: Some(false),
            corpus_id: None,
        };
        let pref = self.update_channel(channel_id, update).await;
        info!(channel = channel_id, "channel unsubscribed");
        pref
    }

    /// Binds (`Some`) or unbinds (`None`) the channel's knowledge corpus.
    pub async fn set_corpus(
        &self,
        channel_id: &str,
        corpus_id: Option<String>,
    ) -> ChannelPreference {
        let update = ChannelPreferenceUpdate {
            subscribed: None,
            corpus_id: Some(corpus_id),
        };
        let pref = self.update_channel(channel_id, update).await;
        info!(channel = channel_id, corpus = ?pref.corpus_id, "channel corpus changed");
        pref
    }

    /// Sets (`Some`) or clears (`None`) a user's cooldown override.
    pub async fn set_user_cooldown(
        &self,
        user_id: &str,
        cooldown_secs: Option<u64>,
    ) -> UserPreference {
        let update = UserPreferenceUpdate {
            custom_cooldown_secs: Some(cooldown_secs),
            ..UserPreferenceUpdate::default()
        };
        let pref = self.update_user(user_id, update).await;
        info!(user = user_id, cooldown_secs = ?cooldown_secs, "user cooldown changed");
        pref
    }

    pub async fn set_user_silenced(&self, user_id: &str, silenced: bool) -> UserPreference {
        let update = UserPreferenceUpdate {
            silenced: Some(silenced),
            ..UserPreferenceUpdate::default()
        };
        let pref = self.update_user(user_id, update).await;
        info!(user = user_id, silenced, "user ambient opt-out changed");
        pref
    }

    /// Records an ambient reply to `user_id` in `channel_id` at `at`.
    pub async fn record_response(
        &self,
        channel_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> UserPreference {
        let update = UserPreferenceUpdate {
            last_response: Some((channel_id.to_string(), at)),
            ..UserPreferenceUpdate::default()
        };
        self.update_user(user_id, update).await
    }

    /// Reloads `doc` from persistence when it is unloaded or has changed.
    ///
    /// After a failed read the document stays unloaded and the read is
    /// retried on the next check.
    async fn refresh<T>(&self, doc: &mut Document<T>)
    where
        T: DeserializeOwned,
    {
        let now = self.clock.now();
        if (doc.loaded || doc.load_failed)
            && let Some(checked) = doc.last_checked
            && now.signed_duration_since(checked).to_std().unwrap_or_default() < self.staleness_check
        {
            return;
        }
        doc.last_checked = Some(now);

        let modified = match self.persistence.last_modified(doc.key).await {
            Ok(modified) => modified,
            Err(e) => {
                warn!(key = doc.key, category = e.category(), error = %e, "preference staleness check failed");
                if doc.loaded {
                    return;
                }
                None
            }
        };
        if doc.loaded && modified == doc.version {
            return;
        }

        match self.load(doc.key).await {
            Load::Ready(entries) => {
                doc.entries = entries;
                doc.version = modified;
                doc.loaded = true;
                doc.load_failed = false;
                debug!(key = doc.key, entries = doc.entries.len(), "preferences loaded");
            }
            // A loaded cache keeps serving its last known contents.
            Load::Unavailable => doc.load_failed = !doc.loaded,
        }
    }

    /// Reads and decodes one document. A corrupt document is backed up and
    /// treated as empty.
    async fn load<T>(&self, key: &str) -> Load<T>
    where
        T: DeserializeOwned,
    {
        let bytes = match self.persistence.read(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Load::Ready(HashMap::new()),
            Err(e) => {
                warn!(key, category = e.category(), error = %e, "failed to read preferences, using defaults");
                return Load::Unavailable;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entries) => Load::Ready(entries),
            Err(e) => {
                error!(key, error = %e, "corrupt preference document, using defaults");
                self.backup_corrupt(key, &bytes).await;
                Load::Ready(HashMap::new())
            }
        }
    }

    async fn backup_corrupt(&self, key: &str, bytes: &[u8]) {
        let backup_key = format!(
            "{key}.corrupt-{}",
            self.clock.now().format("%Y%m%dT%H%M%S%.3fZ")
        );
        match self.persistence.write(&backup_key, bytes).await {
            Ok(()) => warn!(key, backup = %backup_key, "corrupt preference document backed up"),
            Err(e) => {
                error!(key, category = e.category(), error = %e, "failed to back up corrupt preference document");
            }
        }
    }

    /// Writes `doc` back. On failure the in-memory value stays authoritative.
    async fn persist<T>(&self, doc: &mut Document<T>)
    where
        T: Serialize,
    {
        if !doc.loaded {
            warn!(
                key = doc.key,
                "preferences were never read from storage, keeping update in memory only"
            );
            return;
        }

        let bytes = match serde_json::to_vec_pretty(&doc.entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(key = doc.key, error = %e, "failed to encode preferences");
                return;
            }
        };

        if let Err(e) = self.persistence.write(doc.key, &bytes).await {
            warn!(key = doc.key, category = e.category(), error = %e, "failed to persist preferences, keeping in-memory value");
            return;
        }

        // Our own write must not look like an external change.
        match self.persistence.last_modified(doc.key).await {
            Ok(modified) => doc.version = modified,
            Err(e) => debug!(key = doc.key, error = %e, "could not read back modification time"),
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("ambient_enabled", &self.ambient_enabled)
            .field("staleness_check", &self.staleness_check)
            .finish_non_exhaustive()
    }
}
