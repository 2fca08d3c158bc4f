// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live conversation state backing the classifier.

use std::sync::Arc;

use async_trait::async_trait;
use docent_engage::{ActiveConversationTracker, CooldownEngine};
use docent_prefs::PreferenceStore;
use docent_router::ConversationState;

/// [`ConversationState`] over the preference store, cooldown engine and
/// active-thread tracker.
pub struct EngagementState {
    prefs: Arc<PreferenceStore>,
    cooldown: Arc<CooldownEngine>,
    threads: Arc<ActiveConversationTracker>,
}

impl EngagementState {
    pub fn new(
        prefs: Arc<PreferenceStore>,
        cooldown: Arc<CooldownEngine>,
        threads: Arc<ActiveConversationTracker>,
    ) -> Self {
        Self {
            prefs,
            cooldown,
            threads,
        }
    }
}

#[async_trait]
impl ConversationState for EngagementState {
    async fn is_thread_active(&self, channel_id: &str, thread_root: &str) -> bool {
        self.threads.is_active(channel_id, thread_root).await
    }

    async fn channel_subscribed(&self, channel_id: &str) -> bool {
        self.prefs.channel(channel_id).await.subscribed
    }

    async fn cooldown_allows(&self, channel_id: &str, user_id: &str) -> bool {
        self.cooldown.allowed(channel_id, user_id).await
    }

    async fn user_silenced(&self, user_id: &str) -> bool {
        self.prefs.user(user_id).await.silenced
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docent_core::clock::ManualClock;
    use docent_engage::MemoryStateStore;
    use docent_test_utils::MockPersistence;

    use super::*;

    fn state() -> (EngagementState, Arc<PreferenceStore>, Arc<ActiveConversationTracker>) {
        let clock = Arc::new(ManualClock::default());
        let prefs = Arc::new(PreferenceStore::new(
            Arc::new(MockPersistence::new()),
            clock.clone(),
            true,
            Duration::from_secs(5),
        ));
        let cooldown = Arc::new(CooldownEngine::new(
            prefs.clone(),
            clock.clone(),
            Duration::from_secs(60),
        ));
        let threads = Arc::new(ActiveConversationTracker::new(
            Arc::new(MemoryStateStore::new(clock.clone())),
            clock,
            Duration::from_secs(3600),
        ));
        (
            EngagementState::new(prefs.clone(), cooldown, threads.clone()),
            prefs,
            threads,
        )
    }

    #[tokio::test]
    async fn reflects_preferences() {
        let (state, prefs, _) = state();
        assert!(!state.channel_subscribed("C1").await);
        assert!(!state.user_silenced("U1").await);

        prefs.subscribe_channel("C1", None).await;
        prefs.set_user_silenced("U1", true).await;

        assert!(state.channel_subscribed("C1").await);
        assert!(state.user_silenced("U1").await);
    }

    #[tokio::test]
    async fn reflects_cooldown_and_threads() {
        let (state, prefs, threads) = state();
        assert!(state.cooldown_allows("C1", "U1").await);
        assert!(!state.is_thread_active("C1", "1.0").await);

        prefs
            .record_response("C1", "U1", chrono::DateTime::UNIX_EPOCH)
            .await;
        threads.mark_active("C1", "1.0").await;

        assert!(!state.cooldown_allows("C1", "U1").await);
        assert!(state.is_thread_active("C1", "1.0").await);
    }
}
