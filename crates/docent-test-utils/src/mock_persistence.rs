// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory preference persistence.
//!
//! Every write bumps a revision counter that doubles as the document's
//! modification time, so staleness checks see each write as a change.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use docent_core::error::DocentError;
use docent_core::traits::{Adapter, PreferencePersistence};
use docent_core::types::{AdapterType, HealthStatus};

/// A mock key/value persistence collaborator.
pub struct MockPersistence {
    docs: Mutex<HashMap<String, (Vec<u8>, DateTime<Utc>)>>,
    revision: AtomicI64,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockPersistence {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            revision: AtomicI64::new(0),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Stores raw bytes under `key`, bypassing the write counter and failure toggle.
    pub async fn insert_raw(&self, key: &str, contents: impl Into<Vec<u8>>) {
        let modified = self.next_revision();
        self.docs
            .lock()
            .await
            .insert(key.to_string(), (contents.into(), modified));
    }

    pub async fn contents(&self, key: &str) -> Option<Vec<u8>> {
        self.docs.lock().await.get(key).map(|(bytes, _)| bytes.clone())
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.docs.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of successful writes through the collaborator interface.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn next_revision(&self) -> DateTime<Utc> {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(revision)
    }
}

impl Default for MockPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockPersistence {
    fn name(&self) -> &str {
        "mock-persistence"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::PreferencePersistence
    }

    async fn health_check(&self) -> Result<HealthStatus, DocentError> {
        if self.fail_writes.load(Ordering::SeqCst) || self.fail_reads.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded("injected failures active".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocentError> {
        Ok(())
    }
}

#[async_trait]
impl PreferencePersistence for MockPersistence {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, DocentError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DocentError::persistence(
                format!("read {key}"),
                std::io::Error::other("mock read failure"),
            ));
        }
        Ok(self.contents(key).await)
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<(), DocentError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DocentError::persistence(
                format!("write {key}"),
                std::io::Error::other("mock write failure"),
            ));
        }
        let modified = self.next_revision();
        self.docs
            .lock()
            .await
            .insert(key.to_string(), (contents.to_vec(), modified));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn last_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, DocentError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DocentError::persistence(
                format!("stat {key}"),
                std::io::Error::other("mock read failure"),
            ));
        }
        Ok(self.docs.lock().await.get(key).map(|(_, modified)| *modified))
    }
}
