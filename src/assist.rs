use crate::{GameSession, MoveKind, Position};
use rand::seq::SliceRandom;
use rand::Rng;

/// Cells opened by a single assist.
pub const ASSIST_BATCH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistOutcome {
    pub charges: u32,
    /// Cells newly revealed, flood fill included.
    pub revealed: usize,
}

/// Reveals up to [`ASSIST_BATCH`] random hidden safe cells for one charge.
///
/// Flagged cells are not candidates. Nothing is spent when there are no charges, the game is over,
/// or no candidate is left. Assist reveals never count as moves but can win the game.
pub fn apply_assist<R: Rng + ?Sized>(
    session: &mut GameSession,
    charges: u32,
    rng: &mut R,
) -> AssistOutcome {
    let unchanged = AssistOutcome {
        charges,
        revealed: 0,
    };
    if charges == 0 || session.is_finished() {
        return unchanged;
    }

    let candidates: Vec<Position> = session
        .board()
        .cells()
        .filter(|(_, cell)| !cell.is_hazard() && !cell.is_revealed() && !cell.is_flagged())
        .map(|(pos, _)| pos)
        .collect();
    if candidates.is_empty() {
        return unchanged;
    }

    let before = session.board().revealed_count();
    let batch = ASSIST_BATCH.min(candidates.len());
    for &pos in candidates.choose_multiple(rng, batch) {
        session.reveal_as(pos, MoveKind::Assist);
    }
    let revealed = session.board().revealed_count() - before;

    log::debug!("Assist revealed {revealed} cells, {} charges left", charges - 1);
    AssistOutcome {
        charges: charges - 1,
        revealed,
    }
}

/// One more charge, as earned from a reward.
pub fn grant_charge(charges: u32) -> u32 {
    charges.saturating_add(1)
}
