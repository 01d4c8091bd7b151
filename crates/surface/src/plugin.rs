use async_trait::async_trait;

/// Opaque identifier for a message the surface has posted.
///
/// The pipeline never inspects the contents; it only hands the handle back
/// to the same surface when editing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub String);

impl MessageHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A destination that can post and edit messages in place.
///
/// Implementations wrap a concrete chat frontend (a Telegram chat, a Discord
/// thread, a web session). Both operations are fallible; the caller decides
/// whether a failed edit aborts the turn.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Post a new message and return its handle.
    async fn create(&self, content: &str) -> anyhow::Result<MessageHandle>;

    /// Replace the full content of an existing message.
    async fn edit(&self, handle: &MessageHandle, content: &str) -> anyhow::Result<()>;
}
