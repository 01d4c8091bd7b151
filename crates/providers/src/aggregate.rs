use std::pin::Pin;

use {
    futures::{Stream, StreamExt},
    tracing::{debug, warn},
};

use crate::{
    event::{ItemCompletion, ProviderEvent},
    state::{ResponseState, StreamItem, UsageMetadata},
};

// ── Stream aggregator ───────────────────────────────────────────────────────

/// Fold a provider event sequence into a lazy sequence of snapshots.
///
/// Single-pass and non-restartable: one snapshot is yielded per input
/// event (dropped events re-emit the previous snapshot unchanged), and
/// the sequence ends after exactly one terminal snapshot with
/// `generating == false`. If the upstream ends without a completion
/// event (connection drop, caller abort), an implicit terminal
/// snapshot is synthesized from the accumulated state so downstream
/// consumers always converge.
pub fn aggregate<S>(events: S) -> Pin<Box<dyn Stream<Item = ResponseState> + Send>>
where
    S: Stream<Item = ProviderEvent> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        futures::pin_mut!(events);
        let mut state = ResponseState::default();

        while let Some(event) = events.next().await {
            apply(&mut state, event);
            let terminal = !state.generating;
            yield state.clone();
            if terminal {
                return;
            }
        }

        debug!("provider stream ended without a completion event");
        finish(&mut state);
        yield state;
    })
}

/// Force-close the accumulated state for an implicit terminal snapshot.
fn finish(state: &mut ResponseState) {
    for item in state.items.iter_mut().flatten() {
        item.finish();
    }
    state.generating = false;
}

fn apply(state: &mut ResponseState, event: ProviderEvent) {
    match event {
        ProviderEvent::OutputDelta(text) => state.output.push_str(&text),
        ProviderEvent::OutputDone(text) => {
            replace_authoritative(&mut state.output, text, "output");
        },
        ProviderEvent::RefusalDelta(text) => state.refusal.push_str(&text),
        ProviderEvent::RefusalDone(text) => {
            replace_authoritative(&mut state.refusal, text, "refusal");
        },
        ProviderEvent::ItemAdded { slot, kind } => {
            // A reused index is a new logical item; overwrite.
            *state.slot_mut(slot) = Some(StreamItem::new(kind));
        },
        ProviderEvent::ItemDone { slot, done } => apply_item_done(state, slot, done),
        // Deltas carry their kind implicitly, so a delta addressing an
        // absent slot allocates the item rather than being dropped.
        ProviderEvent::ReasoningDelta { slot, text } => {
            let item = state.slot_mut(slot);
            match item {
                Some(StreamItem::Reasoning { text: buf, .. }) => buf.push_str(&text),
                None => {
                    *item = Some(StreamItem::Reasoning {
                        text,
                        generating: true,
                    });
                },
                Some(_) => debug!(slot, "reasoning delta for non-reasoning slot, dropping"),
            }
        },
        ProviderEvent::ReasoningDone { slot, text } => {
            match state.items.get_mut(slot) {
                Some(Some(StreamItem::Reasoning { text: buf, .. })) => {
                    replace_authoritative(buf, text, "reasoning");
                },
                _ => debug!(slot, "reasoning done for absent slot, dropping"),
            }
        },
        ProviderEvent::CodeDelta { slot, code } => {
            let item = state.slot_mut(slot);
            match item {
                Some(StreamItem::CodeExecution { code: buf, .. }) => buf.push_str(&code),
                None => {
                    *item = Some(StreamItem::CodeExecution {
                        code,
                        output: String::new(),
                        generating: true,
                    });
                },
                Some(_) => debug!(slot, "code delta for non-code slot, dropping"),
            }
        },
        ProviderEvent::CodeDone { slot, code } => {
            match state.items.get_mut(slot) {
                Some(Some(StreamItem::CodeExecution { code: buf, .. })) => {
                    replace_authoritative(buf, code, "code");
                },
                _ => debug!(slot, "code done for absent slot, dropping"),
            }
        },
        ProviderEvent::Completed(usage) => {
            state.metadata = Some(UsageMetadata::from_raw(&usage));
            finish(state);
        },
    }
}

fn apply_item_done(state: &mut ResponseState, slot: usize, done: ItemCompletion) {
    let Some(Some(item)) = state.items.get_mut(slot) else {
        warn!(slot, "item done for unknown slot, dropping");
        return;
    };
    match (&mut *item, done) {
        (StreamItem::Reasoning { generating, .. }, ItemCompletion::Reasoning) => {
            *generating = false;
        },
        (
            StreamItem::Searching { query, generating },
            ItemCompletion::WebSearch { query: final_query },
        ) => {
            *query = final_query;
            *generating = false;
        },
        (
            StreamItem::CodeExecution {
                output, generating, ..
            },
            ItemCompletion::CodeExecution { logs },
        ) => {
            *output = logs.join("\n");
            *generating = false;
        },
        _ => warn!(slot, "item completion kind does not match slot, dropping"),
    }
}

/// Replace accumulated delta text with the authoritative done value.
///
/// The done value is preferred unconditionally; divergence from the
/// accumulated deltas is logged but not treated as an error.
fn replace_authoritative(accumulated: &mut String, done: String, field: &'static str) {
    if !done.starts_with(accumulated.as_str()) {
        debug!(
            field,
            accumulated_len = accumulated.len(),
            done_len = done.len(),
            "authoritative done value does not extend accumulated deltas"
        );
    }
    *accumulated = done;
}
