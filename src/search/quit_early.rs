use shakmaty::Color;

/// Lines are only abandoned this many plies away from the root.
pub const QUIT_EARLY_MIN_DEPTH: usize = 4;

const MIDGAME_THRESHOLD: f64 = 1500.0;
const ENDGAME_THRESHOLD: f64 = 700.0;

/// Decides whether the side to move has fallen so far behind the evaluation at the root
/// that the line isn't worth exploring any further.
///
/// The allowed loss is tapered by the phase at the root: material is worth relatively more
/// in the endgame, so the threshold is lower there.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuitEarly {
    root_score: f64,
    root_phase: f64,
}

impl QuitEarly {
    pub fn new(root_score: f64, root_phase: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&root_phase));
        Self {
            root_score,
            root_phase,
        }
    }

    pub fn threshold(&self) -> f64 {
        MIDGAME_THRESHOLD * self.root_phase + ENDGAME_THRESHOLD * (1.0 - self.root_phase)
    }

    /// `current_score` is from white's perspective, like all scores.
    pub fn should_quit_early(&self, current_score: f64, side_to_move: Color) -> bool {
        let sign = match side_to_move {
            Color::White => 1.0,
            Color::Black => -1.0,
        };
        (self.root_score - current_score) * sign > self.threshold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color::{Black, White};

    #[test]
    fn threshold_test() {
        assert_eq!(QuitEarly::new(0.0, 1.0).threshold(), 1500.0);
        assert_eq!(QuitEarly::new(0.0, 0.0).threshold(), 700.0);
        assert_eq!(QuitEarly::new(123.0, 0.5).threshold(), 1100.0);
    }

    #[test]
    fn midgame_test() {
        let quit = QuitEarly::new(0.0, 1.0);
        assert!(quit.should_quit_early(-1600.0, White));
        assert!(!quit.should_quit_early(-1400.0, White));
        assert!(!quit.should_quit_early(-1500.0, White));
        // black is the one ahead in these positions
        assert!(!quit.should_quit_early(-1600.0, Black));
        assert!(quit.should_quit_early(1600.0, Black));
        assert!(!quit.should_quit_early(1400.0, Black));
        assert!(!quit.should_quit_early(5000.0, White));
    }

    #[test]
    fn endgame_test() {
        let quit = QuitEarly::new(200.0, 0.0);
        assert!(quit.should_quit_early(-501.0, White));
        assert!(!quit.should_quit_early(-499.0, White));
        assert!(quit.should_quit_early(901.0, Black));
        assert!(!quit.should_quit_early(899.0, Black));
    }
}
