//! Provider event model and the stream aggregator.
//!
//! Converts a provider's raw event sequence into a lazy sequence of
//! immutable [`state::ResponseState`] snapshots. The wire decoder in
//! [`sse`] maps OpenAI Responses-API SSE payloads onto the typed
//! [`event::ProviderEvent`] vocabulary the aggregator consumes.

pub mod aggregate;
pub mod event;
pub mod sse;
pub mod state;

pub use {
    aggregate::aggregate,
    event::{CompletionUsage, ItemCompletion, ItemKind, ProviderEvent},
    state::{ResponseState, StreamItem, UsageMetadata},
};
