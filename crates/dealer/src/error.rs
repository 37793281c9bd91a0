use roulette_core::RunError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealerError {
    #[error("a dealer turn is already in flight")]
    InFlight,
    #[error("run error: {0}")]
    Run(#[from] RunError),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for DealerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for DealerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
