use std::{pin::Pin, time::Duration};

use {
    futures::{Stream, StreamExt},
    tokio::time::Instant,
    tracing::debug,
};

use scribe_providers::ResponseState;

use crate::{
    config::RenderConfig,
    model::ModelDescriptor,
    render::{RenderedFrame, render},
};

// ── Throttled renderer ──────────────────────────────────────────────────────

/// Turn a snapshot sequence into a rate-limited frame sequence.
///
/// Intermediate snapshots are lossy: while the flush gate is closed the
/// latest snapshot supersedes the buffered one, and only the newest is
/// rendered when the gate opens. Entirely empty snapshots are
/// skipped without resetting the timer (provider warm-up). The first
/// renderable snapshot and the terminal snapshot bypass the gate, so a
/// turn always starts promptly and always converges on its final text.
///
/// Throttling is a wall-clock timestamp check inside the consuming
/// loop, with no timer task. A snapshot buffered while the gate is closed
/// is flushed by the terminal snapshot that the aggregator guarantees.
pub fn rendered_frames<S>(
    snapshots: S,
    model: ModelDescriptor,
    config: RenderConfig,
) -> Pin<Box<dyn Stream<Item = RenderedFrame> + Send>>
where
    S: Stream<Item = ResponseState> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        futures::pin_mut!(snapshots);
        let interval = Duration::from_millis(config.flush_interval_ms);
        let mut last_flush: Option<Instant> = None;
        let mut pending: Option<ResponseState> = None;

        while let Some(snapshot) = snapshots.next().await {
            let terminal = !snapshot.generating;
            if snapshot.is_empty() && !terminal {
                debug!("empty snapshot, skipping render");
                continue;
            }
            pending = Some(snapshot);

            let now = Instant::now();
            let gate_open = match last_flush {
                None => true,
                Some(at) => now.duration_since(at) >= interval,
            };
            if terminal || gate_open {
                if let Some(snapshot) = pending.take() {
                    let text = render(&snapshot, &model, &config);
                    last_flush = Some(now);
                    yield RenderedFrame { text, snapshot };
                }
                if terminal {
                    return;
                }
            }
        }

        // Upstream ended without a terminal snapshot (the aggregator
        // normally prevents this). Flush whatever is buffered.
        if let Some(snapshot) = pending.take() {
            debug!("snapshot stream ended while a frame was still buffered");
            let text = render(&snapshot, &model, &config);
            yield RenderedFrame { text, snapshot };
        }
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ModelDescriptor {
        ModelDescriptor {
            id: "gpt-5".into(),
            label: "GPT-5".into(),
            cost: crate::model::CostTable::default(),
        }
    }

    fn config(flush_interval_ms: u64) -> RenderConfig {
        RenderConfig {
            flush_interval_ms,
            ..RenderConfig::default()
        }
    }

    fn snapshot(output: &str, generating: bool) -> ResponseState {
        let mut snap = ResponseState::default();
        snap.output.push_str(output);
        snap.generating = generating;
        snap
    }

    #[tokio::test]
    async fn first_and_terminal_frames_bypass_the_gate() {
        // All snapshots arrive at the same paused instant; only the
        // first renderable one and the terminal one make it through.
        let snapshots = tokio_stream::iter(vec![
            snapshot("a", true),
            snapshot("ab", true),
            snapshot("abc", true),
            snapshot("abcd", false),
        ]);
        let frames: Vec<RenderedFrame> =
            rendered_frames(snapshots, model(), config(60_000)).collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].text, "a⬤");
        assert_eq!(frames[1].text, "abcd");
    }

    #[tokio::test]
    async fn zero_interval_renders_every_snapshot() {
        let snapshots = tokio_stream::iter(vec![
            snapshot("a", true),
            snapshot("ab", true),
            snapshot("ab", false),
        ]);
        let frames: Vec<RenderedFrame> =
            rendered_frames(snapshots, model(), config(0)).collect().await;
        assert_eq!(frames.len(), 3);
    }

    #[tokio::test]
    async fn empty_snapshots_are_skipped_without_opening_the_gate() {
        let snapshots = tokio_stream::iter(vec![
            ResponseState::default(),
            ResponseState::default(),
            snapshot("ready", true),
            snapshot("ready", false),
        ]);
        let frames: Vec<RenderedFrame> =
            rendered_frames(snapshots, model(), config(60_000)).collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].text, "ready⬤");
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_spaced_by_at_least_the_interval() {
        let snapshots = async_stream::stream! {
            for i in 1..=8u32 {
                yield snapshot(&"x".repeat(i as usize), true);
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            yield snapshot("final", false);
        };
        let mut frames = Vec::new();
        let mut stamps = Vec::new();
        let mut stream = rendered_frames(snapshots, model(), config(1_000));
        while let Some(frame) = stream.next().await {
            stamps.push(Instant::now());
            frames.push(frame);
        }

        // First frame immediate, then one per elapsed interval, then the
        // terminal frame regardless of timing.
        assert!(frames.len() >= 3);
        assert_eq!(frames.last().unwrap().text, "final");
        for pair in stamps[..stamps.len() - 1].windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(1_000));
        }
    }

    #[tokio::test]
    async fn terminal_empty_snapshot_still_emitted() {
        // A turn that dies before producing content still converges.
        let snapshots = tokio_stream::iter(vec![snapshot("", false)]);
        let frames: Vec<RenderedFrame> =
            rendered_frames(snapshots, model(), config(1_000)).collect().await;
        assert_eq!(frames.len(), 1);
        assert!(frames[0].text.is_empty());
        assert!(!frames[0].snapshot.generating);
    }
}
