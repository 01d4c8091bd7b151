use scribe_providers::{ResponseState, StreamItem, UsageMetadata};

use crate::{
    config::{ActivityLabels, RenderConfig},
    model::{CostTable, ModelDescriptor},
};

/// A rendered frame: display text plus the snapshot it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub text: String,
    pub snapshot: ResponseState,
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Render a snapshot to display text. Pure: same snapshot, model and
/// config always produce the same text.
#[must_use]
pub fn render(snapshot: &ResponseState, model: &ModelDescriptor, config: &RenderConfig) -> String {
    let mut text = String::new();

    let blocks: Vec<String> = snapshot
        .iter_items()
        .map(|(_, item)| item_block(item, config))
        .collect();
    if !blocks.is_empty() {
        text.push_str(&blocks.join("\n\n"));
        text.push_str("\n\n");
    }

    text.push_str(&snapshot.output);
    if !snapshot.refusal.is_empty() {
        if !snapshot.output.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&snapshot.refusal);
    }

    if snapshot.generating {
        text.push_str(&config.glyphs.progress);
    }

    if let Some(meta) = &snapshot.metadata {
        text.push_str("\n\n---\n");
        text.push_str(&usage_block(meta, model, &config.labels));
    }

    text
}

/// One activity rendered as a quoted block: glyph, bold label with its
/// generating/complete state, then the item's content.
fn item_block(item: &StreamItem, config: &RenderConfig) -> String {
    let glyphs = &config.glyphs;
    let labels = &config.labels;
    let (glyph, label, content) = match item {
        StreamItem::Reasoning { text, generating } => (
            if *generating {
                &glyphs.working
            } else {
                &glyphs.reasoning
            },
            &labels.reasoning,
            // A horizontal rule inside the quote would break the block.
            text.replace("---", "⸻"),
        ),
        StreamItem::Searching { query, generating } => (
            if *generating {
                &glyphs.working
            } else {
                &glyphs.searching
            },
            &labels.searching,
            query.clone(),
        ),
        StreamItem::CodeExecution {
            code,
            output,
            generating,
        } => (
            if *generating { &glyphs.working } else { &glyphs.code },
            &labels.code_execution,
            if output.is_empty() {
                code.clone()
            } else {
                format!("{code}\n{output}")
            },
        ),
    };

    let state = if item.generating() {
        &labels.in_progress
    } else {
        &labels.complete
    };
    let content = content.trim();
    let block = if content.is_empty() {
        format!("{glyph} **{label} {state}**")
    } else {
        format!("{glyph} **{label} {state}**: {content}")
    };
    quote_block(&block)
}

/// Re-prefix every line of a block as a quoted line.
fn quote_block(text: &str) -> String {
    text.trim()
        .split('\n')
        .map(|line| format!("> {}", line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn usage_block(meta: &UsageMetadata, model: &ModelDescriptor, labels: &ActivityLabels) -> String {
    let input_cost = CostTable::dollars(meta.input_tokens, model.cost.input);
    let cached_cost = CostTable::dollars(meta.cached_input_tokens, model.cost.cached_input);
    let reasoning_cost = CostTable::dollars(meta.reasoning_tokens, model.cost.output);
    let output_cost = CostTable::dollars(meta.output_tokens, model.cost.output);
    let total_cost = input_cost + cached_cost + reasoning_cost + output_cost;

    let mut out = String::new();
    out.push_str(&format!("> **{}**", model.label));
    if meta.web_search_enabled {
        out.push_str(&format!(" {}", labels.web_search_enabled));
    }
    out.push('\n');
    out.push_str(&usage_line(
        &labels.input,
        meta.input_tokens,
        input_cost,
        labels,
    ));
    if meta.cached_input_tokens > 0 {
        out.push_str(&usage_line(
            &labels.cached,
            meta.cached_input_tokens,
            cached_cost,
            labels,
        ));
    }
    if meta.reasoning_tokens > 0 {
        out.push_str(&usage_line(
            &labels.reasoning_tokens,
            meta.reasoning_tokens,
            reasoning_cost,
            labels,
        ));
    }
    out.push_str(&usage_line(
        &labels.output,
        meta.output_tokens,
        output_cost,
        labels,
    ));
    out.push_str(&format!(
        "> {}: {} {} (${total_cost:.4})",
        labels.total,
        format_thousands(meta.total_tokens),
        labels.tokens,
    ));
    out
}

fn usage_line(label: &str, tokens: u64, cost: f64, labels: &ActivityLabels) -> String {
    format!(
        "> {label}: {} {} (${cost:.4})\n",
        format_thousands(tokens),
        labels.tokens,
    )
}

/// Format an integer with thousands separators ("1234567" → "1,234,567").
#[must_use]
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
