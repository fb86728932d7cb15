use crate::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grid size and hazard count of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub size: usize,
    pub hazards: usize,
    pub premium: bool,
}

impl DifficultyConfig {
    /// `None` when the cell count does not fit in a `usize`.
    pub const fn total_cells(&self) -> Option<usize> {
        self.size.checked_mul(self.size)
    }

    pub fn validate(self) -> Result<Self, GameError> {
        let fits = matches!(self.total_cells(), Some(total) if self.hazards < total);
        if self.size == 0 || !fits {
            return Err(GameError::InvalidConfiguration {
                size: self.size,
                hazards: self.hazards,
            });
        }
        Ok(self)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Average,
    Expert,
    Genius,
    Insanity,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Average,
        Difficulty::Expert,
        Difficulty::Genius,
        Difficulty::Insanity,
    ];

    pub const fn config(self) -> DifficultyConfig {
        let (size, hazards, premium) = match self {
            Difficulty::Easy => (10, 10, false),
            Difficulty::Average => (15, 30, false),
            Difficulty::Expert => (30, 99, false),
            Difficulty::Genius => (50, 250, true),
            Difficulty::Insanity => (80, 650, true),
        };
        DifficultyConfig {
            size,
            hazards,
            premium,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Average => "average",
            Difficulty::Expert => "expert",
            Difficulty::Genius => "genius",
            Difficulty::Insanity => "insanity",
        }
    }

    pub const fn is_premium(self) -> bool {
        self.config().premium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownDifficulty(s.to_string()))
    }
}
