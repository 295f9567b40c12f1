/// Result alias that carries [`PlayerError`].
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors surfaced by the player screen.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The bundled track could not be turned into a playable handle.
    #[error("failed to load track: {0}")]
    ResourceLoad(#[from] ResourceLoadError),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Why the audio asset never became playable.
#[derive(Debug, thiserror::Error)]
pub enum ResourceLoadError {
    /// The asset bytes are missing or not a decodable audio stream.
    #[error("could not decode audio asset: {0}")]
    Decode(String),
    /// The host audio output could not be opened.
    #[error("audio backend unavailable: {0}")]
    Backend(String),
}
