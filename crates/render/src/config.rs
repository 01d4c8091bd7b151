use serde::{Deserialize, Serialize};

/// Renderer configuration, threaded into the pipeline explicitly so the
/// core stays free of ambient globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Minimum interval between rendered frames (ms). The first
    /// renderable frame and the terminal frame bypass this gate.
    pub flush_interval_ms: u64,
    pub glyphs: GlyphSet,
    pub labels: ActivityLabels,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 1_000,
            glyphs: GlyphSet::default(),
            labels: ActivityLabels::default(),
        }
    }
}

/// Glyphs used in rendered frames. Hosts typically override these with
/// surface-specific emoji (e.g. an animated loading emoji id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphSet {
    /// Trailing liveness marker while the answer is still generating.
    pub progress: String,
    /// Prefix for an activity block that is still in progress.
    pub working: String,
    /// Prefix for a completed reasoning block.
    pub reasoning: String,
    /// Prefix for a completed web-search block.
    pub searching: String,
    /// Prefix for a completed code-execution block.
    pub code: String,
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self {
            progress: "⬤".into(),
            working: "⏳".into(),
            reasoning: "💡".into(),
            searching: "🌐".into(),
            code: "🖥️".into(),
        }
    }
}

/// Localizable labels for activity blocks and the usage summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLabels {
    pub reasoning: String,
    pub searching: String,
    pub code_execution: String,
    /// State suffix while an activity is generating.
    pub in_progress: String,
    /// State suffix once an activity is done.
    pub complete: String,
    pub web_search_enabled: String,
    pub input: String,
    pub cached: String,
    pub reasoning_tokens: String,
    pub output: String,
    pub total: String,
    pub tokens: String,
}

impl Default for ActivityLabels {
    fn default() -> Self {
        Self {
            reasoning: "Reasoning".into(),
            searching: "Searching the web".into(),
            code_execution: "Running code".into(),
            in_progress: "in progress".into(),
            complete: "complete".into(),
            web_search_enabled: "(web search enabled)".into(),
            input: "Input".into(),
            cached: "Cached".into(),
            reasoning_tokens: "Reasoning".into(),
            output: "Output".into(),
            total: "Total".into(),
            tokens: "tokens".into(),
        }
    }
}
