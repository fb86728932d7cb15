use crate::{
    Board, Difficulty, GameError, LogReporter, Position, ScoreRecord, ScoreReporter,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Whether a reveal is charged to the player's move counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Player,
    Assist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    /// Number of cells opened, including flood-filled ones.
    Revealed(usize),
    Lost,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

/// What a renderer may show for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Hazard,
}

/// One game from difficulty selection to a terminal outcome.
///
/// All commands on a finished session, on revealed or flagged targets, and on out-of-range
/// positions are silent no-ops. "Play again" consumes the session through [`GameSession::restart`].
///
/// Losing reveals every hazard that is not flagged. Flagged hazards stay hidden under their flag,
/// so renderers should treat a flag on a lost board as marking a hazard.
pub struct GameSession {
    difficulty: Difficulty,
    player_name: String,
    board: Board,
    move_count: u32,
    elapsed_seconds: u32,
    has_started: bool,
    outcome: Outcome,
    reporter: Box<dyn ScoreReporter>,
}

impl GameSession {
    pub fn new<R: Rng + ?Sized>(
        difficulty: Difficulty,
        player_name: impl Into<String>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let config = difficulty.config().validate()?;
        let board = Board::generate(config.size, config.hazards, rng)?;
        Ok(Self::from_board(difficulty, player_name, board))
    }

    /// Starts a session on a prepared board. `difficulty` only labels the score record.
    pub fn from_board(
        difficulty: Difficulty,
        player_name: impl Into<String>,
        board: Board,
    ) -> Self {
        Self {
            difficulty,
            player_name: player_name.into(),
            board,
            move_count: 0,
            elapsed_seconds: 0,
            has_started: false,
            outcome: Outcome::InProgress,
            reporter: Box::new(LogReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: impl ScoreReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Fresh board for the same tier and player; the reporter carries over.
    pub fn restart<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Self, GameError> {
        let Self {
            difficulty,
            player_name,
            reporter,
            ..
        } = self;
        let mut session = Self::new(difficulty, player_name, rng)?;
        session.reporter = reporter;
        Ok(session)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Gate for the external clock.
    pub fn timer_running(&self) -> bool {
        self.has_started && !self.is_finished()
    }

    /// Advances the clock by one second if it is running.
    pub fn tick(&mut self) -> bool {
        if self.timer_running() {
            self.elapsed_seconds += 1;
            true
        } else {
            false
        }
    }

    pub fn hazards_remaining(&self) -> isize {
        self.board.hazard_count() as isize - self.board.flagged_count() as isize
    }

    pub fn cell_view(&self, pos: Position) -> Option<CellView> {
        self.board.get(pos).map(|cell| match cell {
            c if c.is_flagged() => CellView::Flagged,
            c if !c.is_revealed() => CellView::Hidden,
            c if c.is_hazard() => CellView::Hazard,
            c => CellView::Revealed(c.proximity()),
        })
    }

    /// A player click on `pos`.
    pub fn reveal(&mut self, pos: Position) -> RevealOutcome {
        self.reveal_as(pos, MoveKind::Player)
    }

    pub fn reveal_as(&mut self, pos: Position, kind: MoveKind) -> RevealOutcome {
        if self.is_finished() {
            return RevealOutcome::NoChange;
        }
        let Some(&cell) = self.board.get(pos) else {
            return RevealOutcome::NoChange;
        };
        if cell.is_revealed() || cell.is_flagged() {
            return RevealOutcome::NoChange;
        }

        self.has_started = true;
        if kind == MoveKind::Player {
            self.move_count += 1;
        }
        if let Some(target) = self.board.get_mut(pos) {
            target.revealed = true;
        }

        if cell.is_hazard() {
            self.board.reveal_unflagged_hazards();
            self.finish(Outcome::Lost);
            return RevealOutcome::Lost;
        }

        let mut opened = 1;
        if cell.proximity() == 0 {
            opened += self.flood_fill(pos);
        }

        if self.board.is_cleared() {
            self.finish(Outcome::Won);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed(opened)
        }
    }

    /// Opens the zero region around `origin` and its numbered border. `origin` must already be
    /// revealed with zero proximity. A revealed cell is never pushed twice, so the walk is bounded
    /// by the number of cells.
    fn flood_fill(&mut self, origin: Position) -> usize {
        let size = self.board.size();
        let mut stack = vec![origin];
        let mut opened = 0;

        while let Some(current) = stack.pop() {
            for neighbor in current.neighbors(size) {
                let Some(cell) = self.board.get_mut(neighbor) else {
                    continue;
                };
                if cell.revealed || cell.flagged {
                    continue;
                }
                debug_assert!(!cell.hazard, "zero-proximity cell next to a hazard");
                cell.revealed = true;
                opened += 1;
                if cell.proximity == 0 {
                    stack.push(neighbor);
                }
            }
        }

        log::debug!("Flood fill from {origin:?} opened {opened} cells");
        opened
    }

    pub fn toggle_flag(&mut self, pos: Position) -> FlagOutcome {
        if self.is_finished() {
            return FlagOutcome::NoChange;
        }
        let Some(cell) = self.board.get_mut(pos) else {
            return FlagOutcome::NoChange;
        };
        if cell.revealed {
            return FlagOutcome::NoChange;
        }

        cell.flagged = !cell.flagged;
        let outcome = if cell.flagged {
            FlagOutcome::Flagged
        } else {
            FlagOutcome::Unflagged
        };
        self.has_started = true;
        outcome
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.is_finished() {
            return;
        }
        self.outcome = outcome;

        let record = self.score_record();
        log::info!(
            "Game over on {} for {}: {:?} after {} moves in {}s",
            record.difficulty,
            record.player_name,
            outcome,
            record.moves,
            record.time_seconds
        );
        if let Err(err) = self.reporter.submit(record) {
            log::warn!("Failed to submit score: {err}");
        }
    }

    fn score_record(&self) -> ScoreRecord {
        let player_name = if self.player_name.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            self.player_name.clone()
        };
        ScoreRecord {
            player_name,
            difficulty: self.difficulty,
            time_seconds: self.elapsed_seconds,
            moves: self.move_count,
            completed: self.outcome == Outcome::Won,
        }
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("difficulty", &self.difficulty)
            .field("player_name", &self.player_name)
            .field("move_count", &self.move_count)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .field("has_started", &self.has_started)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelReporter, ReportError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(size: usize, hazards: &[(usize, usize)]) -> GameSession {
        let hazards: Vec<Position> = hazards.iter().copied().map(Position::from).collect();
        let board = Board::from_hazards(size, &hazards).unwrap();
        GameSession::from_board(Difficulty::Easy, "tester", board)
    }

    fn assert_no_flagged_reveals(session: &GameSession) {
        for (pos, cell) in session.board().cells() {
            assert!(!(cell.is_revealed() && cell.is_flagged()), "{pos:?}");
        }
    }

    struct FailingReporter;

    impl ScoreReporter for FailingReporter {
        fn submit(&self, _: ScoreRecord) -> Result<(), ReportError> {
            Err(ReportError::Disconnected)
        }
    }

    #[test]
    fn test_new_session_uses_tier_config() {
        let mut rng = StdRng::seed_from_u64(5);
        let session = GameSession::new(Difficulty::Average, "p", &mut rng).unwrap();

        assert_eq!(session.size(), 15);
        assert_eq!(session.board().hazard_count(), 30);
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert!(!session.has_started());
        assert!(!session.timer_running());
    }

    #[test]
    fn test_reveal_numbered_cell_does_not_expand() {
        let mut game = session(3, &[(0, 0)]);

        assert_eq!(game.reveal(Position::new(1, 1)), RevealOutcome::Revealed(1));
        assert_eq!(game.board().revealed_count(), 1);
        assert_eq!(game.move_count(), 1);
        assert!(game.has_started());
        assert_eq!(game.cell_view(Position::new(1, 1)), Some(CellView::Revealed(1)));
    }

    #[test]
    fn test_flood_fill_opens_zero_region_and_border() {
        let mut game = session(4, &[(3, 3)]);

        assert_eq!(game.reveal(Position::new(0, 0)), RevealOutcome::Won);
        assert_eq!(game.board().revealed_count(), 15);
        assert_eq!(game.cell_view(Position::new(2, 2)), Some(CellView::Revealed(1)));
        assert_eq!(game.cell_view(Position::new(3, 3)), Some(CellView::Hidden));
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_flood_fill_stops_at_flags() {
        let mut game = session(5, &[(4, 4)]);
        game.toggle_flag(Position::new(0, 2));

        let outcome = game.reveal(Position::new(0, 0));

        assert!(matches!(outcome, RevealOutcome::Revealed(_)));
        assert_eq!(game.cell_view(Position::new(0, 2)), Some(CellView::Flagged));
        assert_eq!(game.board().revealed_count(), 23);
        assert_no_flagged_reveals(&game);
    }

    #[test]
    fn test_reveal_hazard_loses_and_shows_hazards() {
        let mut game = session(3, &[(0, 0), (2, 2)]);
        game.toggle_flag(Position::new(2, 2));

        assert_eq!(game.reveal(Position::new(0, 0)), RevealOutcome::Lost);
        assert_eq!(game.outcome(), Outcome::Lost);
        assert_eq!(game.cell_view(Position::new(0, 0)), Some(CellView::Hazard));
        assert_eq!(game.cell_view(Position::new(2, 2)), Some(CellView::Flagged));
        assert_eq!(game.cell_view(Position::new(1, 1)), Some(CellView::Hidden));
        assert_no_flagged_reveals(&game);
    }

    #[test]
    fn test_lost_session_is_frozen() {
        let mut game = session(3, &[(0, 0)]);
        game.reveal(Position::new(0, 0));
        let revealed = game.board().revealed_count();

        assert_eq!(game.reveal(Position::new(2, 2)), RevealOutcome::NoChange);
        assert_eq!(game.toggle_flag(Position::new(2, 2)), FlagOutcome::NoChange);
        assert!(!game.tick());
        assert_eq!(game.board().revealed_count(), revealed);
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_already_revealed_is_noop() {
        let mut game = session(3, &[(0, 0)]);
        game.reveal(Position::new(1, 1));
        let moves = game.move_count();

        assert_eq!(game.reveal(Position::new(1, 1)), RevealOutcome::NoChange);
        assert_eq!(game.move_count(), moves);
        assert_eq!(game.toggle_flag(Position::new(1, 1)), FlagOutcome::NoChange);
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut game = session(3, &[(0, 0)]);

        assert_eq!(game.reveal(Position::new(3, 0)), RevealOutcome::NoChange);
        assert_eq!(game.toggle_flag(Position::new(0, 7)), FlagOutcome::NoChange);
        assert_eq!(game.cell_view(Position::new(3, 3)), None);
        assert!(!game.has_started());
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn test_flag_toggles_and_starts_clock() {
        let mut game = session(3, &[(0, 0)]);

        assert_eq!(game.toggle_flag(Position::new(0, 0)), FlagOutcome::Flagged);
        assert!(game.has_started());
        assert_eq!(game.hazards_remaining(), 0);
        assert_eq!(game.move_count(), 0);

        assert_eq!(game.toggle_flag(Position::new(0, 0)), FlagOutcome::Unflagged);
        assert_eq!(game.hazards_remaining(), 1);
    }

    #[test]
    fn test_tick_is_gated() {
        let mut game = session(3, &[(0, 0)]);
        assert!(!game.tick());
        assert_eq!(game.elapsed_seconds(), 0);

        game.reveal(Position::new(1, 1));
        assert!(game.tick());
        assert!(game.tick());
        assert_eq!(game.elapsed_seconds(), 2);
    }

    #[test]
    fn test_terminal_outcome_is_reported_once() {
        let (reporter, receiver) = ChannelReporter::new();
        let mut game = session(2, &[(0, 0)]).with_reporter(reporter);

        game.reveal(Position::new(1, 1));
        game.tick();
        game.reveal(Position::new(0, 1));
        assert_eq!(game.reveal(Position::new(1, 0)), RevealOutcome::Won);
        game.reveal(Position::new(0, 0));

        let records: Vec<_> = receiver.try_iter().collect();
        assert_eq!(
            records,
            vec![ScoreRecord {
                player_name: "tester".to_string(),
                difficulty: Difficulty::Easy,
                time_seconds: 1,
                moves: 3,
                completed: true,
            }]
        );
    }

    #[test]
    fn test_loss_is_reported_as_incomplete() {
        let (reporter, receiver) = ChannelReporter::new();
        let board = Board::from_hazards(2, &[Position::new(0, 0)]).unwrap();
        let mut game =
            GameSession::from_board(Difficulty::Expert, "  ", board).with_reporter(reporter);

        game.reveal(Position::new(0, 0));

        let record = receiver.try_recv().unwrap();
        assert_eq!(record.player_name, "Anonymous");
        assert_eq!(record.difficulty, Difficulty::Expert);
        assert!(!record.completed);
    }

    #[test]
    fn test_reporter_failure_does_not_change_outcome() {
        let mut game = session(2, &[]).with_reporter(FailingReporter);
        assert_eq!(game.reveal(Position::new(0, 0)), RevealOutcome::Won);
        assert_eq!(game.outcome(), Outcome::Won);
    }

    #[test]
    fn test_restart_builds_fresh_session() {
        let mut rng = StdRng::seed_from_u64(11);
        let (reporter, receiver) = ChannelReporter::new();
        let mut game = GameSession::new(Difficulty::Easy, "again", &mut rng)
            .unwrap()
            .with_reporter(reporter);
        let hazard = game.board().hazard_positions().next().unwrap();
        game.reveal(hazard);
        assert!(game.is_finished());

        let mut fresh = game.restart(&mut rng).unwrap();
        assert_eq!(fresh.outcome(), Outcome::InProgress);
        assert_eq!(fresh.player_name(), "again");
        assert_eq!(fresh.move_count(), 0);
        assert_eq!(fresh.board().revealed_count(), 0);

        let hazard = fresh.board().hazard_positions().next().unwrap();
        fresh.reveal(hazard);
        assert_eq!(receiver.try_iter().count(), 2);
    }
}
