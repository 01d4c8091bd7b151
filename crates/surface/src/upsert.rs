//! Reconciles rendered frames against the bounded set of messages already
//! posted for the current turn.
//!
//! Each frame is split into segments; segment `i` is bound to message slot
//! `i` for the whole turn. A slot with no message yet gets one created, a
//! slot whose content changed gets edited, and an identical slot is left
//! alone. Slots are never deleted mid-turn, and in practice content only
//! grows, so later frames never shrink the slot set.

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, trace},
};

use crate::{
    chunk,
    error::{Error, Result},
    plugin::{ChatSurface, MessageHandle},
};

fn default_max_message_len() -> usize {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertConfig {
    /// Hard per-message length ceiling imposed by the surface. Values
    /// too small for fence bookkeeping are raised by the splitter.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl Default for UpsertConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
        }
    }
}

#[derive(Debug, Default)]
struct MessageSlot {
    handle: Option<MessageHandle>,
    last_content: String,
}

/// Pushes successive frames of one response turn to a [`ChatSurface`],
/// creating and editing messages as the content evolves.
pub struct Upserter<'a> {
    surface: &'a dyn ChatSurface,
    config: UpsertConfig,
    slots: Vec<MessageSlot>,
}

impl<'a> Upserter<'a> {
    #[must_use]
    pub fn new(surface: &'a dyn ChatSurface, config: UpsertConfig) -> Self {
        Self {
            surface,
            config,
            slots: Vec::new(),
        }
    }

    /// Number of message slots allocated so far.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Handle of slot `index`, if a message was posted for it.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<&MessageHandle> {
        self.slots.get(index).and_then(|slot| slot.handle.as_ref())
    }

    /// Reconcile one rendered frame with the posted messages.
    ///
    /// Applying a frame identical to the previous one performs no surface
    /// calls. A first frame with empty text posts nothing. Errors from the
    /// surface abort the frame; already-applied segments stay applied and
    /// the next frame retries from its own content.
    pub async fn apply(&mut self, text: &str) -> Result<()> {
        let segments = chunk::split_message(text, self.config.max_message_len);
        for (index, segment) in segments.iter().enumerate() {
            let content = chunk::seal_fences(segment);
            self.upsert_slot(index, &content).await?;
        }
        Ok(())
    }

    async fn upsert_slot(&mut self, index: usize, content: &str) -> Result<()> {
        let surface = self.surface;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, MessageSlot::default);
        }
        let slot = &mut self.slots[index];

        let Some(handle) = &slot.handle else {
            if content.is_empty() {
                trace!(slot = index, "skipping empty slot with no message");
                return Ok(());
            }
            let handle = surface
                .create(content)
                .await
                .map_err(|reason| Error::Create { slot: index, reason })?;
            debug!(slot = index, %handle, len = content.len(), "created message");
            slot.handle = Some(handle);
            slot.last_content = content.to_string();
            return Ok(());
        };

        if slot.last_content == content {
            trace!(slot = index, "content unchanged, skipping edit");
            return Ok(());
        }

        surface
            .edit(handle, content)
            .await
            .map_err(|reason| Error::Edit { slot: index, reason })?;
        debug!(slot = index, %handle, len = content.len(), "edited message");
        slot.last_content = content.to_string();
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        std::sync::Mutex,
        async_trait::async_trait,
    };

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Create(String),
        Edit(String, String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<Call>>,
        next_id: Mutex<u32>,
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl ChatSurface for RecordingSurface {
        async fn create(&self, content: &str) -> anyhow::Result<MessageHandle> {
            self.calls.lock().unwrap().push(Call::Create(content.to_string()));
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            Ok(MessageHandle::new(format!("msg-{next}")))
        }

        async fn edit(&self, handle: &MessageHandle, content: &str) -> anyhow::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Edit(handle.as_str().to_string(), content.to_string()));
            Ok(())
        }
    }

    struct FailingSurface;

    #[async_trait]
    impl ChatSurface for FailingSurface {
        async fn create(&self, _content: &str) -> anyhow::Result<MessageHandle> {
            anyhow::bail!("surface unavailable")
        }

        async fn edit(&self, _handle: &MessageHandle, _content: &str) -> anyhow::Result<()> {
            anyhow::bail!("surface unavailable")
        }
    }

    /// Creates succeed; edits fail while `fail_edits` is set.
    #[derive(Default)]
    struct FlakyEditSurface {
        inner: RecordingSurface,
        fail_edits: Mutex<bool>,
    }

    #[async_trait]
    impl ChatSurface for FlakyEditSurface {
        async fn create(&self, content: &str) -> anyhow::Result<MessageHandle> {
            self.inner.create(content).await
        }

        async fn edit(&self, handle: &MessageHandle, content: &str) -> anyhow::Result<()> {
            if *self.fail_edits.lock().unwrap() {
                anyhow::bail!("rate limited")
            }
            self.inner.edit(handle, content).await
        }
    }

    fn upserter(surface: &dyn ChatSurface) -> Upserter<'_> {
        Upserter::new(surface, UpsertConfig::default())
    }

    #[tokio::test]
    async fn creates_then_edits_then_skips() {
        let surface = RecordingSurface::default();
        let mut up = upserter(&surface);

        up.apply("Hel").await.unwrap();
        up.apply("Hello").await.unwrap();
        up.apply("Hello").await.unwrap();

        assert_eq!(
            surface.calls(),
            vec![
                Call::Create("Hel".into()),
                Call::Edit("msg-1".into(), "Hello".into()),
            ]
        );
        assert_eq!(up.slot_count(), 1);
    }

    #[tokio::test]
    async fn empty_first_frame_posts_nothing() {
        let surface = RecordingSurface::default();
        let mut up = upserter(&surface);

        up.apply("").await.unwrap();

        assert!(surface.calls().is_empty());
        assert_eq!(up.handle(0), None);
    }

    #[tokio::test]
    async fn overflow_allocates_additional_slots() {
        let surface = RecordingSurface::default();
        let mut up = Upserter::new(&surface, UpsertConfig { max_message_len: 20 });

        up.apply("aaaaaaaaaa\nbbbbbbbbbb\ncccccccccc").await.unwrap();

        let calls = surface.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(up.slot_count(), 3);
        assert!(matches!(&calls[0], Call::Create(c) if c == "aaaaaaaaaa"));
    }

    #[tokio::test]
    async fn only_changed_slots_are_edited() {
        let surface = RecordingSurface::default();
        let mut up = Upserter::new(&surface, UpsertConfig { max_message_len: 20 });

        up.apply("stable line\nsecond part").await.unwrap();
        surface.calls();
        up.apply("stable line\nsecond part two").await.unwrap();

        // Slot 0 is unchanged; only slot 1 sees an edit.
        assert_eq!(
            surface.calls(),
            vec![Call::Edit("msg-2".into(), "second part two".into())]
        );
    }

    #[tokio::test]
    async fn streamed_open_fence_is_sealed_per_frame() {
        let surface = RecordingSurface::default();
        let mut up = upserter(&surface);

        up.apply("```py\nx = 1").await.unwrap();
        up.apply("```py\nx = 1\ny = 2\n```").await.unwrap();

        assert_eq!(
            surface.calls(),
            vec![
                Call::Create("```py\nx = 1```".into()),
                Call::Edit("msg-1".into(), "```py\nx = 1\ny = 2\n```".into()),
            ]
        );
    }

    #[tokio::test]
    async fn create_failure_surfaces_the_slot() {
        let surface = FailingSurface;
        let mut up = Upserter::new(&surface, UpsertConfig::default());
        let err = up.apply("hello").await.unwrap_err();
        assert!(matches!(err, Error::Create { slot: 0, .. }));
        assert_eq!(err.slot(), 0);
    }

    #[tokio::test]
    async fn edit_failure_keeps_the_slot_retryable() {
        let surface = FlakyEditSurface::default();
        let mut up = upserter(&surface);

        up.apply("Hel").await.unwrap();
        *surface.fail_edits.lock().unwrap() = true;
        let err = up.apply("Hello").await.unwrap_err();
        assert!(matches!(err, Error::Edit { slot: 0, .. }));

        // The failed content was not remembered, so the next frame
        // retries the edit instead of treating it as already applied.
        *surface.fail_edits.lock().unwrap() = false;
        up.apply("Hello").await.unwrap();
        assert_eq!(
            surface.inner.calls(),
            vec![
                Call::Create("Hel".into()),
                Call::Edit("msg-1".into(), "Hello".into()),
            ]
        );
    }
}
