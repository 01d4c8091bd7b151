//! Message-surface side of the pipeline: the [`ChatSurface`] trait a chat
//! frontend implements, fence-aware message splitting, and the [`Upserter`]
//! that reconciles rendered frames against the messages already posted.

pub mod chunk;
pub mod error;
pub mod plugin;
pub mod upsert;

pub use {
    chunk::{fence_open, seal_fences, split_message},
    error::{Error, Result},
    plugin::{ChatSurface, MessageHandle},
    upsert::{UpsertConfig, Upserter},
};
