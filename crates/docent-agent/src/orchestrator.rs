// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event orchestration.
//!
//! [`Orchestrator::dispatch`] accepts an event and returns at once; the reply
//! is produced on a tracked background task. Every accepted event ends in a
//! logged [`Disposition`], and nothing on these paths is fatal.

use std::sync::Arc;
use std::time::Duration;

use docent_config::DocentConfig;
use docent_core::clock::Clock;
use docent_core::error::DocentError;
use docent_core::traits::{ChatPlatform, GenerationBackend, PreferencePersistence, StateStore};
use docent_core::types::{
    FeedbackSubmission, HealthStatus, HistoryTurn, InboundEvent, MessageId, OutcomeStatus,
    ReplyAction, Role,
};
use docent_engage::{ActiveConversationTracker, CooldownEngine, MemoryStateStore};
use docent_prefs::PreferenceStore;
use docent_router::{Classification, DirectTrigger, EventClassifier, IgnoreReason};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::delivery::{DeliveryFormatter, Destination};
use crate::generator::ResponseGenerator;
use crate::state::EngagementState;
use crate::suppression::{ConfidenceFilter, SuppressReason};

/// External collaborators the orchestrator is wired to.
pub struct Collaborators {
    pub platform: Arc<dyn ChatPlatform>,
    pub backend: Arc<dyn GenerationBackend>,
    pub persistence: Arc<dyn PreferencePersistence>,
    /// Backing store for active-thread records.
    pub state: Arc<dyn StateStore>,
    pub clock: Arc<dyn Clock>,
}

/// Terminal state of one handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ignored(IgnoreReason),
    /// A generated answer was delivered in `segments` messages.
    Replied { segments: usize },
    /// A direct request got the fixed message for this outcome instead of an answer.
    Fallback(OutcomeStatus),
    /// The channel has no corpus, so the "not trained" message was sent
    /// instead of generating: publicly for direct requests, privately for
    /// ambient ones.
    NotTrained,
    Suppressed(SuppressReason),
    FeedbackPrompted,
    /// Delivery failed; `category` is the error category that caused it.
    Failed { category: &'static str },
}

impl Disposition {
    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignored(_) => "ignored",
            Self::Replied { .. } => "replied",
            Self::Fallback(_) => "fallback",
            Self::NotTrained => "not_trained",
            Self::Suppressed(_) => "suppressed",
            Self::FeedbackPrompted => "feedback_prompted",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Wires classification, generation, suppression and delivery together.
///
/// Cheap to clone; clones share state, the task tracker and the shutdown token.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

struct Inner {
    config: DocentConfig,
    platform: Arc<dyn ChatPlatform>,
    persistence: Arc<dyn PreferencePersistence>,
    prefs: Arc<PreferenceStore>,
    cooldown: Arc<CooldownEngine>,
    threads: Arc<ActiveConversationTracker>,
    state: EngagementState,
    classifier: EventClassifier,
    generator: ResponseGenerator,
    filter: ConfidenceFilter,
    formatter: DeliveryFormatter,
}

impl Orchestrator {
    /// Builds an orchestrator from `config` and its collaborators.
    ///
    /// The assistant's own user id comes from `assistant.bot_user_id` when
    /// set, otherwise from the platform. Failing to resolve it is the only
    /// error returned here.
    pub async fn new(config: DocentConfig, collaborators: Collaborators) -> Result<Self, DocentError> {
        let Collaborators {
            platform,
            backend,
            persistence,
            state,
            clock,
        } = collaborators;

        let bot_user_id = match &config.assistant.bot_user_id {
            Some(id) => id.clone(),
            None => platform.resolve_bot_identity().await?,
        };

        let prefs = Arc::new(PreferenceStore::from_config(
            &config,
            persistence.clone(),
            clock.clone(),
        ));
        let cooldown = Arc::new(CooldownEngine::new(
            prefs.clone(),
            clock.clone(),
            config.ambient.default_cooldown(),
        ));
        let threads = Arc::new(ActiveConversationTracker::new(
            state,
            clock,
            config.threads.active_ttl(),
        ));

        info!(
            assistant = config.assistant.name.as_str(),
            bot_user_id = bot_user_id.as_str(),
            platform = platform.name(),
            backend = backend.name(),
            "orchestrator initialized"
        );

        let inner = Inner {
            state: EngagementState::new(prefs.clone(), cooldown.clone(), threads.clone()),
            classifier: EventClassifier::from_config(bot_user_id, &config),
            generator: ResponseGenerator::from_config(&config, backend),
            filter: ConfidenceFilter::from_config(&config),
            formatter: DeliveryFormatter::from_config(&config),
            config,
            platform,
            persistence,
            prefs,
            cooldown,
            threads,
        };

        Ok(Self {
            inner: Arc::new(inner),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &DocentConfig {
        &self.inner.config
    }

    pub fn bot_user_id(&self) -> &str {
        self.inner.classifier.address().bot_user_id()
    }

    /// Preference store, for administrative operations.
    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.inner.prefs
    }

    /// Active-thread tracker, for administrative operations.
    pub fn threads(&self) -> &Arc<ActiveConversationTracker> {
        &self.inner.threads
    }

    /// Accepts `event` and handles it on a background task.
    ///
    /// Returns immediately so the platform can be acknowledged before any
    /// generation happens.
    pub fn dispatch(&self, event: InboundEvent) -> JoinHandle<Disposition> {
        if self.tracker.is_closed() {
            warn!(channel = %event.channel_id, ts = %event.timestamp, "event accepted during shutdown");
        }
        let inner = self.inner.clone();
        self.tracker.spawn(async move { inner.handle(&event).await })
    }

    /// Handles `event` to completion on the current task.
    pub async fn handle(&self, event: InboundEvent) -> Disposition {
        self.inner.handle(&event).await
    }

    /// Starts removing expired entries from `store` every
    /// `threads.sweep_interval_secs` until [`shutdown`](Self::shutdown).
    pub fn start_sweeper(&self, store: Arc<MemoryStateStore>) -> JoinHandle<()> {
        store.spawn_sweeper(
            self.inner.config.threads.sweep_interval(),
            self.cancel.child_token(),
        )
    }

    /// Number of dispatched events still being handled.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Re-posts a private ambient reply publicly in `thread_root` and marks
    /// the thread active.
    pub async fn promote_private_reply(
        &self,
        channel_id: &str,
        thread_root: &str,
        text: &str,
    ) -> Result<Vec<MessageId>, DocentError> {
        let inner = &self.inner;
        let destination = Destination::PublicThread {
            channel_id: channel_id.to_string(),
            thread_root: thread_root.to_string(),
        };
        let posted = inner
            .formatter
            .deliver(inner.platform.as_ref(), text, &destination, None)
            .await?;
        inner.threads.mark_active(channel_id, thread_root).await;
        info!(channel = channel_id, thread_root, "private reply promoted to thread");
        Ok(posted)
    }

    /// Records a submitted feedback form.
    pub fn record_feedback(&self, submission: &FeedbackSubmission) {
        info!(
            channel = %submission.channel_id,
            message_ts = %submission.message_timestamp,
            feedback_category = %submission.category,
            details = submission.details.as_deref().unwrap_or_default(),
            "feedback received"
        );
    }

    /// Health of every external collaborator, by name.
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        let inner = &self.inner;
        let checks = [
            (inner.platform.name(), inner.platform.health_check().await),
            (
                inner.generator.backend().name(),
                inner.generator.backend().health_check().await,
            ),
            (inner.persistence.name(), inner.persistence.health_check().await),
        ];
        checks
            .into_iter()
            .map(|(name, result)| {
                let status = result.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
                (name.to_string(), status)
            })
            .collect()
    }

    /// Stops accepting work and waits up to `timeout` for in-flight events.
    ///
    /// Returns true if every task finished in time. The state sweeper and
    /// the collaborators are shut down either way.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(count = pending, "waiting for in-flight events to complete");
        }

        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        if drained {
            info!("all in-flight events drained");
        } else {
            warn!(
                remaining = self.tracker.len(),
                "drain timeout reached, abandoning remaining events"
            );
        }

        self.cancel.cancel();

        let inner = &self.inner;
        for (name, result) in [
            (inner.platform.name(), inner.platform.shutdown().await),
            (
                inner.generator.backend().name(),
                inner.generator.backend().shutdown().await,
            ),
            (inner.persistence.name(), inner.persistence.shutdown().await),
        ] {
            if let Err(e) = result {
                warn!(collaborator = name, error = %e, "collaborator shutdown failed");
            }
        }
        drained
    }
}

impl Inner {
    async fn handle(&self, event: &InboundEvent) -> Disposition {
        let classification = self.classifier.classify(event, &self.state).await;
        let disposition = match classification {
            Classification::Ignore(reason) => Disposition::Ignored(reason),
            Classification::FeedbackPrompt { message_timestamp } => {
                self.prompt_feedback(event, &message_timestamp).await
            }
            Classification::DirectReply {
                thread_root,
                trigger,
            } => self.reply_direct(event, &thread_root, trigger).await,
            Classification::AmbientReply => self.reply_ambient(event).await,
        };

        if let Disposition::Ignored(reason) = &disposition {
            debug!(channel = %event.channel_id, ts = %event.timestamp, %reason, "event ignored");
        } else {
            info!(
                channel = %event.channel_id,
                user = %event.user_id,
                ts = %event.timestamp,
                disposition = disposition.label(),
                detail = ?disposition,
                "event handled"
            );
        }
        disposition
    }

    async fn reply_direct(
        &self,
        event: &InboundEvent,
        thread_root: &str,
        trigger: DirectTrigger,
    ) -> Disposition {
        let messages = &self.config.messages;
        let channel_id = event.channel_id.as_str();
        let destination = Destination::PublicThread {
            channel_id: channel_id.to_string(),
            thread_root: thread_root.to_string(),
        };

        let Some(corpus_id) = self.prefs.channel(channel_id).await.corpus_id else {
            return match self.send(&messages.not_trained, &destination, None).await {
                Ok(_) => Disposition::NotTrained,
                Err(e) => self.delivery_failed(channel_id, thread_root, None, e).await,
            };
        };

        let placeholder = if self.config.delivery.show_thinking {
            match self
                .platform
                .post_public_reply(channel_id, thread_root, &messages.thinking)
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(
                        channel = channel_id,
                        thread_root,
                        category = e.category(),
                        error = %e,
                        "failed to post thinking placeholder"
                    );
                    None
                }
            }
        } else {
            None
        };

        let history = self.thread_history(event).await;
        debug!(channel = channel_id, thread_root, %trigger, turns = history.len(), "answering direct request");

        let outcome = self
            .generator
            .generate(&self.classifier.prompt_text(event), &corpus_id, history)
            .await;

        let (text, status) = match (outcome.status, outcome.usable_text()) {
            (OutcomeStatus::Ok, Some(text)) => (text, OutcomeStatus::Ok),
            (OutcomeStatus::Truncated, _) => {
                (messages.truncated_reply.as_str(), OutcomeStatus::Truncated)
            }
            (OutcomeStatus::BackendError, _) => {
                (messages.backend_error.as_str(), OutcomeStatus::BackendError)
            }
            _ => (messages.empty_reply.as_str(), OutcomeStatus::Empty),
        };

        match self.send(text, &destination, placeholder.as_ref()).await {
            Ok(posted) if status == OutcomeStatus::Ok => {
                self.threads.mark_active(channel_id, thread_root).await;
                Disposition::Replied {
                    segments: posted.len(),
                }
            }
            Ok(_) => Disposition::Fallback(status),
            Err(e) => {
                self.delivery_failed(channel_id, thread_root, placeholder.as_ref(), e)
                    .await
            }
        }
    }

    async fn reply_ambient(&self, event: &InboundEvent) -> Disposition {
        let channel_id = event.channel_id.as_str();
        let Some(corpus_id) = self.prefs.channel(channel_id).await.corpus_id else {
            return self.not_trained_privately(event).await;
        };

        let outcome = self
            .generator
            .generate(&self.classifier.prompt_text(event), &corpus_id, Vec::new())
            .await;
        let text = match self.filter.evaluate(&outcome) {
            Ok(text) => text,
            Err(reason) => return Disposition::Suppressed(reason),
        };

        let destination = Destination::Private {
            channel_id: channel_id.to_string(),
            user_id: event.user_id.clone(),
            actions: vec![ReplyAction::PromoteToThread {
                thread_root: event.timestamp.clone(),
            }],
        };
        match self.send(text, &destination, None).await {
            Ok(posted) => {
                self.cooldown.record_response(channel_id, &event.user_id).await;
                Disposition::Replied {
                    segments: posted.len(),
                }
            }
            Err(e) => {
                error!(
                    channel = channel_id,
                    user = %event.user_id,
                    category = e.category(),
                    error = %e,
                    "ambient reply delivery failed, dropping"
                );
                Disposition::Failed {
                    category: e.category(),
                }
            }
        }
    }

    /// Tells the author privately that the channel has no corpus yet. The
    /// notice counts against the cooldown like any ambient reply.
    async fn not_trained_privately(&self, event: &InboundEvent) -> Disposition {
        let destination = Destination::Private {
            channel_id: event.channel_id.clone(),
            user_id: event.user_id.clone(),
            actions: Vec::new(),
        };
        match self
            .send(&self.config.messages.not_trained, &destination, None)
            .await
        {
            Ok(_) => {
                self.cooldown
                    .record_response(&event.channel_id, &event.user_id)
                    .await;
                Disposition::NotTrained
            }
            Err(e) => {
                error!(
                    channel = %event.channel_id,
                    user = %event.user_id,
                    category = e.category(),
                    error = %e,
                    "not-trained notice delivery failed, dropping"
                );
                Disposition::Failed {
                    category: e.category(),
                }
            }
        }
    }

    async fn prompt_feedback(&self, event: &InboundEvent, message_timestamp: &str) -> Disposition {
        let destination = Destination::Private {
            channel_id: event.channel_id.clone(),
            user_id: event.user_id.clone(),
            actions: vec![ReplyAction::OpenFeedbackForm {
                message_timestamp: message_timestamp.to_string(),
            }],
        };
        match self
            .send(&self.config.messages.feedback_prompt, &destination, None)
            .await
        {
            Ok(_) => Disposition::FeedbackPrompted,
            Err(e) => {
                error!(
                    channel = %event.channel_id,
                    user = %event.user_id,
                    category = e.category(),
                    error = %e,
                    "feedback prompt delivery failed"
                );
                Disposition::Failed {
                    category: e.category(),
                }
            }
        }
    }

    /// Prior turns of the event's thread, empty for root messages or when
    /// the platform read fails.
    async fn thread_history(&self, event: &InboundEvent) -> Vec<HistoryTurn> {
        let Some(root) = event.thread_root() else {
            return Vec::new();
        };
        let history = self
            .platform
            .read_thread_history(
                &event.channel_id,
                root,
                &event.timestamp,
                self.config.threads.history_turns,
            )
            .await;
        match history {
            // The thinking placeholder is not part of the conversation.
            Ok(turns) => turns
                .into_iter()
                .filter(|turn| {
                    !(turn.role == Role::Assistant && turn.text == self.config.messages.thinking)
                })
                .collect(),
            Err(e) => {
                warn!(
                    channel = %event.channel_id,
                    thread_root = root,
                    category = e.category(),
                    error = %e,
                    "failed to read thread history, answering without it"
                );
                Vec::new()
            }
        }
    }

    async fn send(
        &self,
        text: &str,
        destination: &Destination,
        placeholder: Option<&MessageId>,
    ) -> Result<Vec<MessageId>, DocentError> {
        self.formatter
            .deliver(self.platform.as_ref(), text, destination, placeholder)
            .await
    }

    /// Logs a failed public delivery and makes one attempt to tell the user.
    async fn delivery_failed(
        &self,
        channel_id: &str,
        thread_root: &str,
        placeholder: Option<&MessageId>,
        cause: DocentError,
    ) -> Disposition {
        error!(
            channel = channel_id,
            thread_root,
            category = cause.category(),
            error = %cause,
            "reply delivery failed"
        );

        let notice = &self.config.messages.delivery_failed;
        let retry = match placeholder {
            Some(id) => self.platform.update_message(channel_id, id, notice).await,
            None => self
                .platform
                .post_public_reply(channel_id, thread_root, notice)
                .await
                .map(drop),
        };
        if let Err(e) = retry {
            warn!(
                channel = channel_id,
                thread_root,
                category = e.category(),
                error = %e,
                "failed to post delivery failure notice, giving up"
            );
        }

        Disposition::Failed {
            category: cause.category(),
        }
    }
}
