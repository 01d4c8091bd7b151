//! Drives one response turn end to end.

use {
    async_trait::async_trait,
    futures::{Stream, StreamExt},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use {
    scribe_providers::{ProviderEvent, UsageMetadata, aggregate},
    scribe_render::{ModelDescriptor, RenderConfig, RenderedFrame, rendered_frames},
    scribe_surface::{ChatSurface, UpsertConfig, Upserter},
};

use crate::error::{Context, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub upsert: UpsertConfig,
}

/// Final result of a finished turn, as recorded in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub output: String,
    pub usage: Option<UsageMetadata>,
}

/// Persistence collaborator that receives a turn's final output once the
/// terminal frame has been delivered.
#[async_trait]
pub trait TurnStore: Send + Sync {
    async fn record_turn(&self, output: &str, usage: Option<&UsageMetadata>) -> anyhow::Result<()>;
}

/// Run one turn: aggregate `events` into snapshots, render them at the
/// configured rate, and reconcile every frame against `surface`.
///
/// The terminal frame always reaches the surface, so no message is left
/// showing a progress glyph even when the provider stream ends abruptly.
/// A surface failure aborts the turn with the offending slot; messages
/// already posted stay as they are.
pub async fn run_turn<S>(
    events: S,
    model: ModelDescriptor,
    config: TurnConfig,
    surface: &dyn ChatSurface,
    store: &dyn TurnStore,
) -> Result<TurnOutcome>
where
    S: Stream<Item = ProviderEvent> + Send + 'static,
{
    let snapshots = aggregate(events);
    let mut frames = rendered_frames(snapshots, model, config.render);

    let mut upserter = Upserter::new(surface, config.upsert);
    let mut last: Option<RenderedFrame> = None;
    while let Some(frame) = frames.next().await {
        upserter.apply(&frame.text).await?;
        last = Some(frame);
    }

    let (output, usage) = match last {
        Some(frame) => (frame.snapshot.output, frame.snapshot.metadata),
        None => (String::new(), None),
    };

    store
        .record_turn(&output, usage.as_ref())
        .await
        .context("recording turn")?;
    debug!(
        slots = upserter.slot_count(),
        output_len = output.len(),
        "turn finished"
    );

    Ok(TurnOutcome { output, usage })
}
