use crate::{Difficulty, Position};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board configuration: {hazards} hazards on a {size}x{size} grid")]
    InvalidConfiguration { size: usize, hazards: usize },
    #[error("Hazard position {0:?} is out of bounds")]
    HazardOutOfBounds(Position),
    #[error("Unknown difficulty '{0}'")]
    UnknownDifficulty(String),
    #[error("Difficulty '{0}' requires an active subscription")]
    PremiumLocked(Difficulty),
}

/// Failure of a score sink. Never changes the outcome of a game.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Score receiver has been dropped")]
    Disconnected,
    #[error("Failed to write score record: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode score record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription store unavailable: {0}")]
    Unavailable(String),
}
