use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("creating message for slot {slot}: {reason}")]
    Create { slot: usize, reason: anyhow::Error },

    #[error("editing message for slot {slot}: {reason}")]
    Edit { slot: usize, reason: anyhow::Error },
}

impl Error {
    /// Index of the message slot the failed surface call addressed.
    #[must_use]
    pub fn slot(&self) -> usize {
        match self {
            Self::Create { slot, .. } | Self::Edit { slot, .. } => *slot,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
