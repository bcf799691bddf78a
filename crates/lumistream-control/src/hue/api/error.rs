use thiserror::Error;

#[derive(Error, Debug)]
pub enum HueError {
    #[error("Bridge discovery failed")]
    DiscoveryFailed,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
