use std::fmt::{Display, Formatter};

use derive_more::{Add, AddAssign, Neg, Sub, SubAssign};

pub mod chess;

/// Sum of the phase weights of all non-pawn, non-king pieces in the starting position.
pub const MAX_PHASE: i32 = 24;

/// A middlegame total, an endgame total and the number of phase units, all from white's perspective.
///
/// This is used both for the evaluation of a whole position and for the change caused by a single move;
/// adding the change of a move to the evaluation of a position gives exactly the evaluation of the
/// resulting position because nothing is tapered until [`PhasedScore::score`] is called.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Add, AddAssign, Sub, SubAssign, Neg)]
pub struct PhasedScore {
    pub mg: i32,
    pub eg: i32,
    pub phase: i32,
}

impl PhasedScore {
    pub const fn new(mg: i32, eg: i32, phase: i32) -> Self {
        Self { mg, eg, phase }
    }

    /// The continuous game phase in `[0, 1]`: 1 with all non-pawn material on the board, 0 without any.
    /// Extra material from promotions doesn't push this above 1.
    pub fn phase(self) -> f64 {
        self.phase.clamp(0, MAX_PHASE) as f64 / MAX_PHASE as f64
    }

    /// The tapered score, `phase * mg + (1 - phase) * eg`. Positive values are good for white.
    pub fn score(self) -> f64 {
        let phase = self.phase();
        phase * self.mg as f64 + (1.0 - phase) * self.eg as f64
    }
}

impl Display for PhasedScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{score:.1} (mg {mg}, eg {eg}, phase {phase:.3})",
            score = self.score(),
            mg = self.mg,
            eg = self.eg,
            phase = self.phase()
        )
    }
}
