/// Convenience result type used across the replay engine.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    /// Input artifacts that cannot be turned into a consistent step deck.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A cell with this name is already live.
    #[error("duplicate cell name '{0}'")]
    DuplicateName(String),

    /// No live cell carries this name.
    #[error("unknown cell name '{0}'")]
    UnknownName(String),

    /// The geometry buffer has no free slot left.
    #[error("geometry buffer full (capacity {capacity})")]
    BufferFull {
        /// Slot capacity the buffer was created with.
        capacity: usize,
    },

    /// `step()` was called after the last step was replayed.
    #[error("step deck exhausted")]
    DeckExhausted,

    /// Internal bookkeeping disagreed with itself (a bug, not bad input).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The frame encoder could not be started.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// The frame encoder failed while consuming frames.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, usually I/O with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplayError {
    /// Build a [`ReplayError::MalformedInput`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Build a [`ReplayError::Invariant`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`ReplayError::EncoderUnavailable`].
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build a [`ReplayError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReplayError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReplayError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors caused by the input artifacts rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MalformedInput(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
