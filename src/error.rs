use thiserror::Error;

/// Everything that can go wrong outside of normal play.
///
/// Wrong clicks, wrong guesses and card mismatches are game outcomes, not
/// errors, and never show up here.
#[derive(Debug, Error)]
pub enum GameError
{
    #[error("could not fetch an image for '{query}': {reason}")]
    ImageFetch
    {
        query: String,
        reason: String,
    },

    #[error("failed to load image {url}: {reason}")]
    ImageLoad
    {
        url: String,
        reason: String,
    },

    #[error("score storage error: {0}")]
    Storage(#[source] std::io::Error),

    #[error("score data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl GameError
{
    /// Image problems are shown on a retry panel instead of ending the game.
    pub fn is_retryable(&self) -> bool
    {
        matches!(self, GameError::ImageFetch { .. } | GameError::ImageLoad { .. })
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
