pub mod assist;
pub mod board;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod position;
pub mod report;
pub mod subscription;

pub use assist::{apply_assist, grant_charge, AssistOutcome, ASSIST_BATCH};
pub use board::{Board, Cell};
pub use difficulty::{Difficulty, DifficultyConfig};
pub use error::{GameError, ReportError, SubscriptionError};
pub use game::{CellView, FlagOutcome, GameSession, MoveKind, Outcome, RevealOutcome};
pub use position::Position;
pub use report::{ChannelReporter, Leaderboard, LogReporter, ScoreRecord, ScoreReporter};
pub use subscription::{unlock_difficulty, MemorySubscriptions, SubscriptionStore};
