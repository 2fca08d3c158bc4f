// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting and posting replies within the platform's per-message limit.
//!
//! Long text is cut into contiguous slices at the best boundary before the
//! limit: paragraph break, then line break, then sentence end, then any
//! whitespace. Only a single word longer than the limit is split mid-word.
//! Separators stay attached to the end of the preceding slice, so the slices
//! concatenate back to the original text exactly. Continuation segments get a
//! part label in front; the first segment is posted as-is.

use docent_config::DocentConfig;
use docent_core::error::DocentError;
use docent_core::traits::ChatPlatform;
use docent_core::types::{MessageId, ReplyAction};
use tracing::debug;

/// Smallest segment limit the formatter accepts.
pub const MIN_LIMIT: usize = 32;

/// Where a reply goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Visible to everyone in the thread rooted at `thread_root`.
    PublicThread {
        channel_id: String,
        thread_root: String,
    },
    /// Visible only to `user_id`. `actions` are attached to the last segment.
    Private {
        channel_id: String,
        user_id: String,
        actions: Vec<ReplyAction>,
    },
}

/// Byte index at which to cut `text` so the head holds at most `max_chars` characters.
///
/// Returns `text.len()` when the whole text fits. Otherwise the result is
/// always greater than zero so repeated splitting makes progress.
pub fn split_point(text: &str, max_chars: usize) -> usize {
    let max_chars = max_chars.max(1);
    let Some((window_end, _)) = text.char_indices().nth(max_chars) else {
        return text.len();
    };
    let window = &text[..window_end];

    if let Some(pos) = window.rfind("\n\n") {
        return pos + 2;
    }
    if let Some(pos) = window.rfind('\n') {
        return pos + 1;
    }
    if let Some(end) = last_sentence_end(window) {
        return end;
    }
    if let Some((pos, c)) = window
        .char_indices()
        .rev()
        .find(|(pos, c)| c.is_whitespace() && *pos > 0)
    {
        return pos + c.len_utf8();
    }
    window_end
}

/// End of the whitespace following the last `.`, `!` or `?` in `window`.
fn last_sentence_end(window: &str) -> Option<usize> {
    let mut best = None;
    let mut chars = window.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && let Some(&(ws_pos, ws)) = chars.peek()
            && ws.is_whitespace()
        {
            best = Some(ws_pos + ws.len_utf8());
        }
    }
    best
}

/// Splits and posts replies.
#[derive(Debug, Clone)]
pub struct DeliveryFormatter {
    segment_limit: usize,
}

impl DeliveryFormatter {
    pub fn new(segment_limit: usize) -> Self {
        Self {
            segment_limit: segment_limit.max(MIN_LIMIT),
        }
    }

    pub fn from_config(config: &DocentConfig) -> Self {
        Self::new(config.delivery.segment_limit)
    }

    /// Contiguous slices of `text`; concatenated they equal `text`.
    ///
    /// Continuation slices leave room for the widest label of the final
    /// segment count.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Labels widen with the count, so re-split until the reserve holds.
        let mut reserve = label_width(2);
        loop {
            let segments = self.split_reserving(text, reserve);
            let needed = label_width(segments.len());
            if needed <= reserve {
                return segments;
            }
            reserve = needed;
        }
    }

    fn split_reserving<'a>(&self, text: &'a str, reserve: usize) -> Vec<&'a str> {
        let mut segments = Vec::new();
        let mut rest = text;
        let mut limit = self.segment_limit;
        while !rest.is_empty() {
            let cut = split_point(rest, limit);
            let (head, tail) = rest.split_at(cut);
            segments.push(head);
            rest = tail;
            limit = self.segment_limit.saturating_sub(reserve).max(1);
        }
        segments
    }

    /// Segments ready to post, continuation labels included.
    pub fn render(&self, text: &str) -> Vec<String> {
        let segments = self.split(text);
        let total = segments.len();
        segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                if i == 0 {
                    segment.to_string()
                } else {
                    format!("{}{segment}", part_label(i + 1, total))
                }
            })
            .collect()
    }

    /// Posts `text` to `destination`, segment by segment, in order.
    ///
    /// For public replies, a `placeholder` message is replaced with the first
    /// segment instead of posting a new one. Stops at the first failed call.
    pub async fn deliver(
        &self,
        platform: &dyn ChatPlatform,
        text: &str,
        destination: &Destination,
        placeholder: Option<&MessageId>,
    ) -> Result<Vec<MessageId>, DocentError> {
        let segments = self.render(text);
        let last = segments.len().saturating_sub(1);
        let mut posted = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let id = match destination {
                Destination::PublicThread {
                    channel_id,
                    thread_root,
                } => match placeholder.filter(|_| i == 0) {
                    Some(id) => {
                        platform.update_message(channel_id, id, segment).await?;
                        id.clone()
                    }
                    None => {
                        platform
                            .post_public_reply(channel_id, thread_root, segment)
                            .await?
                    }
                },
                Destination::Private {
                    channel_id,
                    user_id,
                    actions,
                } => {
                    let actions: &[ReplyAction] = if i == last { actions } else { &[] };
                    platform
                        .post_private_reply(channel_id, user_id, segment, actions)
                        .await?
                }
            };
            posted.push(id);
        }

        debug!(segments = posted.len(), chars = text.chars().count(), "reply delivered");
        Ok(posted)
    }
}

/// Label prepended to continuation segment `index` (1-based) of `total`.
pub fn part_label(index: usize, total: usize) -> String {
    format!("(part {index}/{total})\n")
}

/// Characters taken by the widest label of a `total`-segment reply.
pub fn label_width(total: usize) -> usize {
    part_label(total, total).chars().count()
}

#[cfg(test)]
mod tests {
    use docent_test_utils::MockPlatform;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn short_text_is_one_segment() {
        let f = DeliveryFormatter::new(100);
        assert_eq!(f.split("Short answer."), vec!["Short answer."]);
        assert_eq!(f.render("Short answer."), vec!["Short answer."]);
    }

    #[test]
    fn prefers_paragraph_break() {
        let text = "First paragraph.\n\nSecond paragraph that is longer.";
        assert_eq!(split_point(text, 30), "First paragraph.\n\n".len());
    }

    #[test]
    fn falls_back_to_line_break() {
        let text = "First line\nSecond line that is longer";
        assert_eq!(split_point(text, 20), "First line\n".len());
    }

    #[test]
    fn falls_back_to_sentence_end() {
        let text = "One. Two words here and then more words";
        assert_eq!(split_point(text, 20), "One. ".len());
    }

    #[test]
    fn falls_back_to_whitespace() {
        let text = "OneLongWordThen another word";
        assert_eq!(split_point(text, 20), "OneLongWordThen ".len());
    }

    #[test]
    fn hard_splits_overlong_word() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(split_point(text, 10), 10);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "ééééé ééééé";
        assert_eq!(split_point(text, 8), "ééééé ".len());
        assert_eq!(split_point("ééé", 8), "ééé".len());
    }

    #[test]
    fn continuation_segments_are_labeled() {
        let f = DeliveryFormatter::new(40);
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";
        let rendered = f.render(text);
        assert!(rendered.len() >= 2);
        assert!(!rendered[0].starts_with("(part"));
        let total = rendered.len();
        for (i, segment) in rendered.iter().enumerate().skip(1) {
            assert!(segment.starts_with(&part_label(i + 1, total)));
            assert!(segment.chars().count() <= 40);
        }
    }

    #[test]
    fn label_width_grows_with_digits() {
        assert_eq!(label_width(9), "(part 9/9)\n".len());
        assert_eq!(label_width(1000), "(part 1000/1000)\n".len());
        assert_eq!(label_width(1000), 17);
    }

    #[test]
    fn thousand_part_reply_still_fits_limit() {
        let f = DeliveryFormatter::new(MIN_LIMIT);
        let text = "abcd ".repeat(4_000);

        let rendered = f.render(&text);
        assert!(rendered.len() >= 1000, "got {} segments", rendered.len());
        for segment in &rendered {
            assert!(segment.chars().count() <= MIN_LIMIT, "{segment:?}");
        }
        assert_eq!(f.split(&text).concat(), text);
    }

    #[tokio::test]
    async fn public_delivery_replaces_placeholder_then_posts() {
        let platform = MockPlatform::new("U0BOT");
        let placeholder = MessageId("ph.1".into());
        let f = DeliveryFormatter::new(40);
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";
        let destination = Destination::PublicThread {
            channel_id: "C1".into(),
            thread_root: "1.0".into(),
        };

        let ids = f
            .deliver(&platform, text, &destination, Some(&placeholder))
            .await
            .unwrap();

        assert_eq!(ids[0], placeholder);
        let updates = platform.updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(platform.public_replies().await.len(), ids.len() - 1);
    }

    #[tokio::test]
    async fn private_delivery_attaches_actions_to_last_segment() {
        let platform = MockPlatform::new("U0BOT");
        let f = DeliveryFormatter::new(40);
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";
        let action = ReplyAction::PromoteToThread {
            thread_root: "1.0".into(),
        };
        let destination = Destination::Private {
            channel_id: "C1".into(),
            user_id: "U1".into(),
            actions: vec![action.clone()],
        };

        f.deliver(&platform, text, &destination, None).await.unwrap();

        let private = platform.private_replies().await;
        assert!(private.len() >= 2);
        let (last, rest) = private.split_last().unwrap();
        assert_eq!(last.actions, vec![action]);
        assert!(rest.iter().all(|reply| reply.actions.is_empty()));
    }

    #[tokio::test]
    async fn delivery_stops_at_first_failure() {
        let platform = MockPlatform::new("U0BOT");
        platform.fail_next_posts(1);
        let f = DeliveryFormatter::new(100);
        let destination = Destination::PublicThread {
            channel_id: "C1".into(),
            thread_root: "1.0".into(),
        };
        let err = f
            .deliver(&platform, "hello", &destination, None)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "delivery");
        assert!(platform.public_replies().await.is_empty());
    }

    proptest! {
        #[test]
        fn split_then_rejoin_reconstructs_text(
            text in "[a-zA-Zé .!?\n]{0,2000}",
            limit in MIN_LIMIT..400usize,
        ) {
            let f = DeliveryFormatter::new(limit);
            let segments = f.split(&text);
            prop_assert_eq!(segments.concat(), text.clone());
            let reserve = label_width(segments.len());
            for (i, segment) in segments.iter().enumerate() {
                let allowed = if i == 0 { limit } else { limit - reserve };
                prop_assert!(segment.chars().count() <= allowed);
                prop_assert!(!segment.is_empty());
            }
        }

        #[test]
        fn rendered_segments_fit_limit(
            text in "[a-z ]{0,3000}",
            limit in 100usize..400,
        ) {
            let f = DeliveryFormatter::new(limit);
            for segment in f.render(&text) {
                prop_assert!(segment.chars().count() <= limit);
            }
        }
    }
}
