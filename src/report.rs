//! Score reporting for finished games.
//!
//! A [`GameSession`](crate::GameSession) hands one [`ScoreRecord`] to its [`ScoreReporter`] when it
//! reaches a terminal outcome. Submission is fire-and-forget: errors are logged by the session and
//! never change the outcome.

use crate::{Difficulty, ReportError};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::sync::mpsc;

pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const PLAYER_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub time_seconds: u32,
    pub moves: u32,
    pub completed: bool,
}

pub trait ScoreReporter {
    /// Must not block on the sink.
    fn submit(&self, record: ScoreRecord) -> Result<(), ReportError>;
}

/// Writes each record to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ScoreReporter for LogReporter {
    fn submit(&self, record: ScoreRecord) -> Result<(), ReportError> {
        log::info!("Score submitted: {}", serde_json::to_string(&record)?);
        Ok(())
    }
}

/// Forwards records over an unbounded channel to whoever persists them.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::Sender<ScoreRecord>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::Receiver<ScoreRecord>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ScoreReporter for ChannelReporter {
    fn submit(&self, record: ScoreRecord) -> Result<(), ReportError> {
        self.sender
            .send(record)
            .map_err(|_| ReportError::Disconnected)
    }
}

/// In-memory score history, oldest first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Leaderboard {
    records: Vec<ScoreRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads records written by [`Leaderboard::write_json_lines`]. Blank lines are skipped.
    pub fn from_json_lines<R: BufRead>(reader: R) -> Result<Self, ReportError> {
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(Self { records })
    }

    pub fn record(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    /// Moves every record currently queued on `receiver` into the board and returns them.
    pub fn drain(&mut self, receiver: &mpsc::Receiver<ScoreRecord>) -> Vec<ScoreRecord> {
        let received: Vec<_> = receiver.try_iter().collect();
        self.records.extend(received.iter().cloned());
        received
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fastest games first, optionally restricted to one tier.
    pub fn top(&self, limit: usize, difficulty: Option<Difficulty>) -> Vec<&ScoreRecord> {
        let mut matching: Vec<_> = self
            .records
            .iter()
            .filter(|r| difficulty.map_or(true, |d| r.difficulty == d))
            .collect();
        matching.sort_by_key(|r| r.time_seconds);
        matching.truncate(limit);
        matching
    }

    /// Most recent first.
    pub fn for_player(&self, player_name: &str) -> Vec<&ScoreRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.player_name == player_name)
            .take(PLAYER_HISTORY_LIMIT)
            .collect()
    }

    pub fn write_json_lines<W: Write>(
        writer: &mut W,
        records: &[ScoreRecord],
    ) -> Result<(), ReportError> {
        for record in records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
