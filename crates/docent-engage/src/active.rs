// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks threads the assistant is currently engaged in.
//!
//! A thread becomes active when the assistant posts a public reply in it and
//! stays active for a fixed TTL after its last reply. Records are stored as
//! RFC 3339 timestamps in a [`StateStore`] so the tracker works the same over
//! an in-process map or a shared cache with native expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docent_core::clock::Clock;
use docent_core::traits::StateStore;
use tracing::{debug, warn};

/// Engagement record per (channel, thread root).
pub struct ActiveConversationTracker {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ActiveConversationTracker {
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    fn key(channel_id: &str, thread_root: &str) -> String {
        format!("active:{channel_id}:{thread_root}")
    }

    /// True if the assistant replied in this thread within the TTL.
    ///
    /// Fails closed: when the store cannot be read, the thread is reported
    /// as not active.
    pub async fn is_active(&self, channel_id: &str, thread_root: &str) -> bool {
        let key = Self::key(channel_id, thread_root);
        let value = match self.store.get(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return false,
            Err(e) => {
                warn!(
                    channel = channel_id,
                    thread_root,
                    category = e.category(),
                    error = %e,
                    "active-thread check failed, treating thread as inactive"
                );
                return false;
            }
        };

        let last_activity = match DateTime::parse_from_rfc3339(&value) {
            Ok(at) => at.with_timezone(&Utc),
            Err(e) => {
                warn!(channel = channel_id, thread_root, error = %e, "unreadable active-thread record");
                return false;
            }
        };

        // Stores with coarse expiry may still hand back a stale record.
        let elapsed = self
            .clock
            .now()
            .signed_duration_since(last_activity)
            .to_std()
            .unwrap_or_default();
        elapsed <= self.ttl
    }

    /// Marks (or refreshes) the thread as active. Failures are logged only.
    pub async fn mark_active(&self, channel_id: &str, thread_root: &str) {
        let key = Self::key(channel_id, thread_root);
        let now = self.clock.now().to_rfc3339();
        match self.store.set(&key, now, Some(self.ttl)).await {
            Ok(()) => debug!(channel = channel_id, thread_root, "thread marked active"),
            Err(e) => warn!(
                channel = channel_id,
                thread_root,
                category = e.category(),
                error = %e,
                "failed to mark thread active, follow-ups will need a mention"
            ),
        }
    }

    /// Ends engagement in a thread before its TTL runs out.
    pub async fn deactivate(&self, channel_id: &str, thread_root: &str) {
        let key = Self::key(channel_id, thread_root);
        if let Err(e) = self.store.delete(&key).await {
            warn!(channel = channel_id, thread_root, error = %e, "failed to deactivate thread");
        }
    }
}

impl std::fmt::Debug for ActiveConversationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveConversationTracker")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use docent_core::clock::ManualClock;
    use docent_core::error::DocentError;

    use super::*;
    use crate::memory::MemoryStateStore;

    const TTL: Duration = Duration::from_secs(2 * 60 * 60);

    fn tracker() -> (ActiveConversationTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryStateStore::new(clock.clone()));
        (ActiveConversationTracker::new(store, clock.clone(), TTL), clock)
    }

    /// Store that is always unreachable.
    struct Unreachable;

    #[async_trait]
    impl StateStore for Unreachable {
        async fn get(&self, _key: &str) -> Result<Option<String>, DocentError> {
            Err(DocentError::Internal("connection refused".into()))
        }
        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Option<Duration>,
        ) -> Result<(), DocentError> {
            Err(DocentError::Internal("connection refused".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), DocentError> {
            Err(DocentError::Internal("connection refused".into()))
        }
    }

    /// Store that never expires anything on its own.
    struct NoExpiry(dashmap::DashMap<String, String>);

    #[async_trait]
    impl StateStore for NoExpiry {
        async fn get(&self, key: &str) -> Result<Option<String>, DocentError> {
            Ok(self.0.get(key).map(|v| v.clone()))
        }
        async fn set(
            &self,
            key: &str,
            value: String,
            _ttl: Option<Duration>,
        ) -> Result<(), DocentError> {
            self.0.insert(key.to_string(), value);
            Ok(())
        }
        async fn delete(&self, key: &str) -> Result<(), DocentError> {
            self.0.remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn unknown_thread_is_inactive() {
        let (tracker, _) = tracker();
        assert!(!tracker.is_active("C1", "1.0").await);
    }

    #[tokio::test]
    async fn active_within_ttl_inactive_after() {
        let (tracker, clock) = tracker();
        tracker.mark_active("C1", "1.0").await;

        clock.advance(Duration::from_secs(30 * 60));
        assert!(tracker.is_active("C1", "1.0").await);

        clock.advance(Duration::from_secs(150 * 60));
        assert!(!tracker.is_active("C1", "1.0").await);
    }

    #[tokio::test]
    async fn mark_refreshes_ttl() {
        let (tracker, clock) = tracker();
        tracker.mark_active("C1", "1.0").await;
        clock.advance(Duration::from_secs(90 * 60));
        tracker.mark_active("C1", "1.0").await;
        clock.advance(Duration::from_secs(90 * 60));
        assert!(tracker.is_active("C1", "1.0").await);
    }

    #[tokio::test]
    async fn threads_are_scoped_by_channel() {
        let (tracker, _) = tracker();
        tracker.mark_active("C1", "1.0").await;
        assert!(!tracker.is_active("C2", "1.0").await);
        assert!(!tracker.is_active("C1", "2.0").await);
    }

    #[tokio::test]
    async fn deactivate_ends_engagement() {
        let (tracker, _) = tracker();
        tracker.mark_active("C1", "1.0").await;
        tracker.deactivate("C1", "1.0").await;
        assert!(!tracker.is_active("C1", "1.0").await);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn unreachable_store_fails_closed() {
        let clock = Arc::new(ManualClock::default());
        let tracker = ActiveConversationTracker::new(Arc::new(Unreachable), clock, TTL);

        tracker.mark_active("C1", "1.0").await;
        assert!(!tracker.is_active("C1", "1.0").await);
        assert!(logs_contain("failed to mark thread active"));
        assert!(logs_contain("treating thread as inactive"));
    }

    #[tokio::test]
    async fn ttl_enforced_even_without_store_expiry() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(NoExpiry(dashmap::DashMap::new()));
        let tracker = ActiveConversationTracker::new(store, clock.clone(), TTL);

        tracker.mark_active("C1", "1.0").await;
        clock.advance(TTL + Duration::from_secs(1));
        assert!(!tracker.is_active("C1", "1.0").await);
    }
}
