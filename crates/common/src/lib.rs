//! Error-context machinery shared by the scribe crates.
//!
//! Each crate keeps its own `thiserror` enum; implementing
//! [`FromMessage`] for it and invoking [`impl_context!`] alongside adds
//! `.context()`/`.with_context()` on `Result` and `Option` scoped to
//! that crate's error type.

pub mod error;

pub use error::FromMessage;
