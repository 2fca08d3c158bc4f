// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-(channel, user) throttle for ambient replies.
//!
//! Direct address and active-thread follow-ups never consult this engine.

use std::sync::Arc;
use std::time::Duration;

use docent_core::clock::Clock;
use docent_prefs::PreferenceStore;
use tracing::debug;

/// Decides whether an unsolicited reply to a user in a channel is allowed now.
///
/// Last-response timestamps live in the user's preferences, so the throttle
/// survives restarts and is shared by every instance reading the same store.
pub struct CooldownEngine {
    prefs: Arc<PreferenceStore>,
    clock: Arc<dyn Clock>,
    default_cooldown: Duration,
}

impl CooldownEngine {
    pub fn new(prefs: Arc<PreferenceStore>, clock: Arc<dyn Clock>, default_cooldown: Duration) -> Self {
        Self {
            prefs,
            clock,
            default_cooldown,
        }
    }

    /// True if no ambient reply went to `user_id` in `channel_id` within the
    /// user's effective cooldown. A zero cooldown always allows.
    pub async fn allowed(&self, channel_id: &str, user_id: &str) -> bool {
        let pref = self.prefs.user(user_id).await;
        let threshold = pref
            .custom_cooldown_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_cooldown);
        if threshold.is_zero() {
            return true;
        }

        let Some(last) = pref.last_response_at.get(channel_id) else {
            return true;
        };

        // A timestamp in the future (clock skew between instances) counts as zero elapsed.
        let elapsed = self
            .clock
            .now()
            .signed_duration_since(*last)
            .to_std()
            .unwrap_or_default();
        let allowed = elapsed >= threshold;
        if !allowed {
            debug!(
                channel = channel_id,
                user = user_id,
                elapsed_secs = elapsed.as_secs(),
                threshold_secs = threshold.as_secs(),
                "ambient reply throttled"
            );
        }
        allowed
    }

    /// Records an ambient reply to `user_id` in `channel_id` at the current time.
    pub async fn record_response(&self, channel_id: &str, user_id: &str) {
        self.prefs
            .record_response(channel_id, user_id, self.clock.now())
            .await;
    }
}

impl std::fmt::Debug for CooldownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownEngine")
            .field("prefs", &self.prefs)
            .field("default_cooldown", &self.default_cooldown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use docent_core::clock::ManualClock;
    use docent_prefs::FilePersistence;

    use super::*;

    struct Fixture {
        engine: CooldownEngine,
        prefs: Arc<PreferenceStore>,
        clock: Arc<ManualClock>,
        _dir: tempfile::TempDir,
    }

    fn fixture(default_secs: u64) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let prefs = Arc::new(PreferenceStore::new(
            Arc::new(FilePersistence::new(dir.path())),
            clock.clone(),
            true,
            Duration::from_secs(5),
        ));
        let engine = CooldownEngine::new(
            prefs.clone(),
            clock.clone(),
            Duration::from_secs(default_secs),
        );
        Fixture {
            engine,
            prefs,
            clock,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn allows_without_prior_response() {
        let f = fixture(300);
        assert!(f.engine.allowed("C1", "U1").await);
    }

    #[tokio::test]
    async fn throttles_until_default_elapses() {
        let f = fixture(300);
        f.engine.record_response("C1", "U1").await;

        f.clock.advance(Duration::from_secs(299));
        assert!(!f.engine.allowed("C1", "U1").await);
        f.clock.advance(Duration::from_secs(1));
        assert!(f.engine.allowed("C1", "U1").await);
    }

    #[tokio::test]
    async fn cooldown_is_per_channel_and_user() {
        let f = fixture(300);
        f.engine.record_response("C1", "U1").await;
        assert!(!f.engine.allowed("C1", "U1").await);
        assert!(f.engine.allowed("C2", "U1").await);
        assert!(f.engine.allowed("C1", "U2").await);
    }

    #[tokio::test]
    async fn custom_cooldown_overrides_default() {
        let f = fixture(300);
        f.prefs.set_user_cooldown("U1", Some(60)).await;
        f.engine.record_response("C1", "U1").await;

        f.clock.advance(Duration::from_secs(10));
        assert!(!f.engine.allowed("C1", "U1").await);
        f.clock.advance(Duration::from_secs(50));
        assert!(f.engine.allowed("C1", "U1").await);
    }

    #[tokio::test]
    async fn zero_cooldown_always_allows() {
        let f = fixture(300);
        f.prefs.set_user_cooldown("U1", Some(0)).await;
        f.engine.record_response("C1", "U1").await;
        assert!(f.engine.allowed("C1", "U1").await);
    }

    #[tokio::test]
    async fn future_timestamp_counts_as_just_replied() {
        let f = fixture(60);
        let future = f.clock.now() + chrono::TimeDelta::seconds(30);
        f.prefs.record_response("C1", "U1", future).await;
        assert!(!f.engine.allowed("C1", "U1").await);
    }
}
