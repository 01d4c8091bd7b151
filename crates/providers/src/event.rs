// ── Provider events ─────────────────────────────────────────────────────────

/// Events emitted by the provider during a streaming response.
///
/// Slots are sparse, provider-assigned indices: a later index may start
/// before an earlier one completes, and once created a slot's kind never
/// changes. Deltas addressing an absent slot allocate the item (the
/// delta kind implies the item kind); done events addressing an absent
/// slot are dropped rather than treated as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Append a fragment to the final answer text.
    OutputDelta(String),
    /// Authoritative final answer text (replaces the accumulated deltas).
    OutputDone(String),
    /// Append a fragment to the refusal text.
    RefusalDelta(String),
    /// Authoritative final refusal text.
    RefusalDone(String),
    /// A sub-activity started at `slot`. A reused index means a new
    /// logical item and overwrites whatever was there.
    ItemAdded { slot: usize, kind: ItemKind },
    /// A sub-activity finished; carries its variant-specific final fields.
    ItemDone { slot: usize, done: ItemCompletion },
    /// Append reasoning text to the item at `slot`.
    ReasoningDelta { slot: usize, text: String },
    /// Authoritative final reasoning text for the item at `slot`.
    ReasoningDone { slot: usize, text: String },
    /// Append code to the code-execution item at `slot`.
    CodeDelta { slot: usize, code: String },
    /// Authoritative final code for the code-execution item at `slot`.
    CodeDone { slot: usize, code: String },
    /// The response finished; sole source of usage metadata.
    Completed(CompletionUsage),
}

/// Kind of sub-activity announced by an item-added event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Reasoning,
    WebSearch,
    CodeExecution,
}

/// Variant-specific final fields carried by an item-done event.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemCompletion {
    Reasoning,
    WebSearch { query: String },
    CodeExecution { logs: Vec<String> },
}

/// Raw usage counts from the provider's completion event.
///
/// `output_tokens` still includes reasoning tokens and `input_tokens`
/// still includes cached tokens here; the aggregator separates them
/// when deriving [`crate::state::UsageMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionUsage {
    pub model_id: String,
    pub web_search_enabled: bool,
    pub input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub total_tokens: u64,
}
