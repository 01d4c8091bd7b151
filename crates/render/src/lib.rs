//! Throttled rendering of response snapshots to chat-surface text.
//!
//! The renderer turns each [`scribe_providers::ResponseState`] into a
//! human-readable frame (activity blocks, running answer text, and a
//! terminal usage/cost summary), while [`throttle`] gates how often
//! frames are emitted so the chat surface's edit-rate tolerance is
//! respected no matter how fast the provider streams.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod throttle;

pub use {
    catalog::ModelCatalog,
    config::{ActivityLabels, GlyphSet, RenderConfig},
    error::{Error, Result},
    model::{CostTable, ModelDescriptor},
    render::{RenderedFrame, render},
    throttle::rendered_frames,
};
