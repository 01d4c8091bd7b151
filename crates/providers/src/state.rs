use serde::{Deserialize, Serialize};

use crate::event::{CompletionUsage, ItemKind};

// ── Structured response state ───────────────────────────────────────────────

/// One concurrently-tracked sub-activity of the model's turn.
///
/// The `generating` flag flips `true → false` at most once and never
/// reverses; the variant of a slot never changes for the lifetime of
/// the logical item.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Reasoning { text: String, generating: bool },
    Searching { query: String, generating: bool },
    CodeExecution { code: String, output: String, generating: bool },
}

impl StreamItem {
    /// Fresh item for an item-added event, empty fields, generating.
    #[must_use]
    pub fn new(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Reasoning => Self::Reasoning {
                text: String::new(),
                generating: true,
            },
            ItemKind::WebSearch => Self::Searching {
                query: String::new(),
                generating: true,
            },
            ItemKind::CodeExecution => Self::CodeExecution {
                code: String::new(),
                output: String::new(),
                generating: true,
            },
        }
    }

    #[must_use]
    pub fn generating(&self) -> bool {
        match self {
            Self::Reasoning { generating, .. }
            | Self::Searching { generating, .. }
            | Self::CodeExecution { generating, .. } => *generating,
        }
    }

    pub(crate) fn finish(&mut self) {
        match self {
            Self::Reasoning { generating, .. }
            | Self::Searching { generating, .. }
            | Self::CodeExecution { generating, .. } => *generating = false,
        }
    }
}

/// Token accounting from the terminal completion event.
///
/// `output_tokens` excludes `reasoning_tokens` and `input_tokens`
/// excludes `cached_input_tokens`; the raw provider counts bundle
/// them, the aggregator reports them separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub model_id: String,
    pub web_search_enabled: bool,
    pub input_tokens: u64,
    pub cached_input_tokens: u64,
    pub reasoning_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl UsageMetadata {
    /// Derive display metadata from raw provider usage counts.
    #[must_use]
    pub fn from_raw(raw: &CompletionUsage) -> Self {
        Self {
            model_id: raw.model_id.clone(),
            web_search_enabled: raw.web_search_enabled,
            input_tokens: raw.input_tokens.saturating_sub(raw.cached_input_tokens),
            cached_input_tokens: raw.cached_input_tokens,
            reasoning_tokens: raw.reasoning_tokens,
            output_tokens: raw.output_tokens.saturating_sub(raw.reasoning_tokens),
            total_tokens: raw.total_tokens,
        }
    }
}

/// Accumulated snapshot of one streaming response.
///
/// Items are addressed by sparse provider-assigned slot indices, stored
/// arena-style so indices stay stable; gaps are never repacked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseState {
    pub items: Vec<Option<StreamItem>>,
    pub output: String,
    pub refusal: String,
    pub generating: bool,
    pub metadata: Option<UsageMetadata>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            output: String::new(),
            refusal: String::new(),
            generating: true,
            metadata: None,
        }
    }
}

impl ResponseState {
    /// Whether there is nothing renderable yet (provider still warming up).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.refusal.is_empty() && self.iter_items().next().is_none()
    }

    /// Occupied slots in ascending slot-index order.
    pub fn iter_items(&self) -> impl Iterator<Item = (usize, &StreamItem)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }

    /// Mutable access to a slot, growing the arena as needed.
    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Option<StreamItem> {
        if slot >= self.items.len() {
            self.items.resize(slot + 1, None);
        }
        &mut self.items[slot]
    }
}
