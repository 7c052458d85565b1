/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors produced while building a timeline, loading assets, or rendering a video.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A configuration or argument value is out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// The score could not be read or interpreted.
    #[error("score error: {0}")]
    Score(String),

    /// An asset could not be decoded into a usable frame sequence.
    #[error("asset error: {0}")]
    Asset(String),

    /// The render loop failed to produce a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The encoder sink failed to accept or finalize frames.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level failure (I/O, decoding libraries).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn score(msg: impl Into<String>) -> Self {
        Self::Score(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
