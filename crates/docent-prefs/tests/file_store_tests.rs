// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preference store over real files.

use std::sync::Arc;
use std::time::Duration;

use docent_core::clock::SystemClock;
use docent_prefs::{CHANNELS_KEY, FilePersistence, PreferenceStore, USERS_KEY};

fn open(dir: &std::path::Path) -> PreferenceStore {
    PreferenceStore::new(
        Arc::new(FilePersistence::new(dir)),
        Arc::new(SystemClock),
        true,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let store = open(dir.path());
    store.subscribe_channel("C1", Some("vs_123".into())).await;
    store.set_user_cooldown("U1", Some(0)).await;
    drop(store);

    let reopened = open(dir.path());
    let channel = reopened.channel("C1").await;
    assert!(channel.subscribed);
    assert_eq!(channel.corpus_id.as_deref(), Some("vs_123"));
    assert_eq!(reopened.user("U1").await.custom_cooldown_secs, Some(0));
}

#[tokio::test]
async fn corrupt_file_is_preserved_next_to_original() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CHANNELS_KEY), "]]garbage").unwrap();

    let store = open(dir.path());
    assert!(!store.channel("C1").await.subscribed);

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("channels.json.corrupt-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        "]]garbage"
    );

    // The next write replaces the corrupt document with a valid one.
    store.subscribe_channel("C1", None).await;
    let raw = std::fs::read_to_string(dir.path().join(CHANNELS_KEY)).unwrap();
    assert!(raw.contains("\"subscribed\": true"));
}

#[tokio::test]
async fn unknown_users_are_not_written_on_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    store.user("U404").await;
    assert!(!dir.path().join(USERS_KEY).exists());
}
