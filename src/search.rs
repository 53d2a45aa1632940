use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use clap::ValueEnum;
use itertools::Itertools;
use shakmaty::{Color, Move};
use static_assertions::const_assert;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

use crate::eval::PhasedScore;
use crate::games::chess::{move_to_uci, Chessboard};
use crate::search::budget::BudgetSearch;
use crate::search::move_order::{PriorWeighted, Unordered};
use crate::search::quit_early::QUIT_EARLY_MIN_DEPTH;
use crate::search::repetition::REPETITION_DEPTHS;

pub mod budget;
pub mod move_order;
pub mod quit_early;
pub mod repetition;
pub mod statistics;

/// Magnitude of the score of the worst possible outcome for either side, before scaling.
pub const LOSS_MAGNITUDE: f64 = 1_000_000_000.0;
/// A real loss ranks below everything, including a line that was cut off.
pub const LOSS_MULTIPLIER: f64 = 1.1;
pub const CROSS_MULTIPLIER: f64 = -1.0;

pub const DEFAULT_BUDGET: u64 = 800_000;

// the root is never abandoned or served from the cache
const_assert!(QUIT_EARLY_MIN_DEPTH > 0);
const_assert!(*REPETITION_DEPTHS.start() > 0);

/// The worst score `color` could get, from white's perspective.
pub fn worst_score(color: Color) -> f64 {
    match color {
        Color::White => -LOSS_MAGNITUDE,
        Color::Black => LOSS_MAGNITUDE,
    }
}

fn loss_score(color: Color) -> f64 {
    worst_score(color) * LOSS_MULTIPLIER
}

/// The result of searching a single node, before the parent has turned it into a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Eval {
    /// All searched children with their scores, best move for the side to move first.
    SubmoveList(Vec<(Move, f64)>),
    /// The budget ran out and the position was evaluated statically.
    LeafEval(f64),
    /// The root has exactly one legal move, so nothing was searched.
    Forced(Move),
    /// This color has been checkmated or is so far behind that the line was abandoned.
    Loss(Color),
    Draw,
    /// This color found a move that's at least as good as what the opponent can already force elsewhere,
    /// so the opponent won't allow this position and the remaining moves weren't searched.
    AlphaBetaCross(Color),
}

impl Eval {
    /// The score from white's perspective.
    ///
    /// Returns `None` for [`Eval::Forced`], which only exists at the root, and for an empty move list.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Eval::SubmoveList(moves) => moves.first().map(|(_, score)| *score),
            Eval::LeafEval(score) => Some(*score),
            Eval::Forced(_) => None,
            Eval::Loss(color) => Some(loss_score(*color)),
            Eval::Draw => Some(0.0),
            Eval::AlphaBetaCross(color) => Some(worst_score(*color) * CROSS_MULTIPLIER),
        }
    }
}

impl Display for Eval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Eval::SubmoveList(moves) => write!(
                f,
                "[{}]",
                moves
                    .iter()
                    .map(|(mov, score)| format!("{0} {score:.1}", move_to_uci(mov)))
                    .join(", ")
            ),
            Eval::LeafEval(score) => write!(f, "leaf {score:.1}"),
            Eval::Forced(mov) => write!(f, "forced {}", move_to_uci(mov)),
            Eval::Loss(color) => write!(f, "loss for {color:?}"),
            Eval::Draw => write!(f, "draw"),
            Eval::AlphaBetaCross(color) => write!(f, "cross ({color:?} to move)"),
        }
    }
}

/// `Ordering::Greater` iff `a` is better than `b` for `color`.
pub fn compare_scores(a: f64, b: f64, color: Color) -> Ordering {
    match color {
        Color::White => a.total_cmp(&b),
        Color::Black => b.total_cmp(&a),
    }
}

/// Like [`compare_scores`]. A [`Eval::Forced`] can't be compared, which is an error.
pub fn compare_evals(
    board: &Chessboard,
    a: &Eval,
    b: &Eval,
    color: Color,
) -> Result<Ordering, SearchError> {
    let scalar = |eval: &Eval| {
        eval.scalar().ok_or_else(|| SearchError::ForcedScalarized {
            fen: board.as_fen(),
        })
    };
    Ok(compare_scores(scalar(a)?, scalar(b)?, color))
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SearchError {
    #[error("No legal moves in non-terminal position '{fen}'")]
    NoLegalMoves { fen: String },
    #[error("Tried to compare a forced move or an empty move list in position '{fen}'")]
    ForcedScalarized { fen: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub eval: Eval,
    /// Number of statically evaluated positions. Terminal positions and cached results don't count.
    pub positions_explored: u64,
    /// One line per searched root move, only if [`SearchConfig::trace`] is set.
    pub trace: Option<Vec<String>>,
}

impl SearchResult {
    pub fn best_move(&self) -> Option<&Move> {
        best_move_of_eval(&self.eval)
    }
}

/// The move the search would play. `None` if the root is terminal or nothing was searched.
pub fn best_move_of_eval(eval: &Eval) -> Option<&Move> {
    match eval {
        Eval::SubmoveList(moves) => moves.first().map(|(mov, _)| mov),
        Eval::Forced(mov) => Some(mov),
        Eval::LeafEval(_) | Eval::Loss(_) | Eval::Draw | Eval::AlphaBetaCross(_) => None,
    }
}

/// Passed by value from a node to its children.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SearchParams {
    /// Gets split evenly between the children.
    pub move_budget: u64,
    /// Each one lets a child with an empty budget be expanded anyway.
    pub ply_extensions: u32,
    pub check_extensions: u32,
    /// Best score white can force so far, anywhere on the path to this node.
    pub white_best: f64,
    pub black_best: f64,
    pub depth: usize,
    /// Running evaluation of this node, updated incrementally with every move.
    pub score: PhasedScore,
}

impl SearchParams {
    pub fn root(move_budget: u64, config: &SearchConfig, score: PhasedScore) -> Self {
        Self {
            move_budget,
            ply_extensions: config.ply_extensions,
            check_extensions: config.check_extensions,
            white_best: loss_score(Color::White),
            black_best: loss_score(Color::Black),
            depth: 0,
            score,
        }
    }
}

#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, ValueEnum, StrumDisplay, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum MoveOrderKind {
    /// Search moves that did well elsewhere in the tree first.
    #[default]
    #[value(name = "prior")]
    #[strum(to_string = "prior")]
    PriorWeighted,
    /// Use the order of the move generator.
    #[strum(to_string = "unordered")]
    Unordered,
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct SearchConfig {
    pub move_order: MoveOrderKind,
    pub check_extensions: u32,
    pub ply_extensions: u32,
    pub trace: bool,
}

/// Searches the position with the default configuration.
/// The board is modified during the search but always restored before this returns.
pub fn go(board: &mut Chessboard, move_budget: u64) -> Result<SearchResult, SearchError> {
    go_with(board, move_budget, &SearchConfig::default())
}

pub fn go_with(
    board: &mut Chessboard,
    move_budget: u64,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    match config.move_order {
        MoveOrderKind::PriorWeighted => {
            BudgetSearch::<PriorWeighted>::new(*config).search(board, move_budget)
        }
        MoveOrderKind::Unordered => {
            BudgetSearch::<Unordered>::new(*config).search(board, move_budget)
        }
    }
}

#[derive(Default, Debug)]
pub struct BenchResult {
    pub positions: u64,
    pub time: Duration,
}

/// Positions used by the `bench` command and the benchmarks. They cover the opening,
/// a tactical middlegame, castling and promotions, and a simple endgame.
pub const BENCH_POSITIONS: [&str; 6] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R b KQkq - 4 8",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color::{Black, White};

    #[test]
    fn scalar_ordering_test() {
        let loss_white = Eval::Loss(White).scalar().unwrap();
        let cross_black = Eval::AlphaBetaCross(Black).scalar().unwrap();
        let cross_white = Eval::AlphaBetaCross(White).scalar().unwrap();
        let loss_black = Eval::Loss(Black).scalar().unwrap();
        assert_eq!(loss_white, -1.1e9);
        assert_eq!(loss_black, 1.1e9);
        assert_eq!(cross_white, 1e9);
        assert_eq!(cross_black, -1e9);
        // a position where black stopped early because it found a refutation is terrible for white,
        // but still better than being mated
        assert!(loss_white < cross_black);
        assert!(cross_black < -100_000.0);
        assert!(cross_white < loss_black);
        assert_eq!(Eval::Draw.scalar(), Some(0.0));
        assert_eq!(Eval::LeafEval(-3.5).scalar(), Some(-3.5));
        assert_eq!(Eval::SubmoveList(vec![]).scalar(), None);
    }

    #[test]
    fn forced_scalar_test() {
        let board = Chessboard::default();
        let mov = board.legal_moves()[0].clone();
        let forced = Eval::Forced(mov.clone());
        assert_eq!(forced.scalar(), None);
        let err = compare_evals(&board, &forced, &Eval::Draw, White).unwrap_err();
        assert_eq!(
            err,
            SearchError::ForcedScalarized {
                fen: board.as_fen()
            }
        );
        assert!(err.to_string().contains(&board.as_fen()));
        let list = Eval::SubmoveList(vec![(mov.clone(), 12.0), (mov, -3.0)]);
        assert_eq!(list.scalar(), Some(12.0));
        assert_eq!(
            compare_evals(&board, &list, &Eval::Draw, White),
            Ok(Ordering::Greater)
        );
        assert_eq!(
            compare_evals(&board, &list, &Eval::Draw, Black),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn compare_scores_test() {
        assert_eq!(compare_scores(1.0, 2.0, White), Ordering::Less);
        assert_eq!(compare_scores(1.0, 2.0, Black), Ordering::Greater);
        assert_eq!(compare_scores(-0.5, -0.5, Black), Ordering::Equal);
    }

    #[test]
    fn best_move_test() {
        let board = Chessboard::default();
        let mov = board.move_from_uci("e2e4").unwrap();
        assert_eq!(
            best_move_of_eval(&Eval::SubmoveList(vec![(mov.clone(), 0.0)])),
            Some(&mov)
        );
        assert_eq!(best_move_of_eval(&Eval::Forced(mov.clone())), Some(&mov));
        assert_eq!(best_move_of_eval(&Eval::SubmoveList(vec![])), None);
        assert_eq!(best_move_of_eval(&Eval::Draw), None);
        assert_eq!(best_move_of_eval(&Eval::Loss(White)), None);
        assert_eq!(best_move_of_eval(&Eval::AlphaBetaCross(Black)), None);
    }

    #[test]
    fn root_params_test() {
        let config = SearchConfig {
            check_extensions: 2,
            ..Default::default()
        };
        let params = SearchParams::root(100, &config, PhasedScore::default());
        assert_eq!(params.move_budget, 100);
        assert_eq!(params.check_extensions, 2);
        assert_eq!(params.ply_extensions, 0);
        assert_eq!(params.depth, 0);
        assert_eq!(params.white_best, Eval::Loss(White).scalar().unwrap());
        assert_eq!(params.black_best, Eval::Loss(Black).scalar().unwrap());
    }

    #[test]
    fn move_order_kind_test() {
        assert_eq!(MoveOrderKind::default(), MoveOrderKind::PriorWeighted);
        assert_eq!("Prior".parse::<MoveOrderKind>().unwrap(), MoveOrderKind::PriorWeighted);
        assert_eq!("unordered".parse::<MoveOrderKind>().unwrap(), MoveOrderKind::Unordered);
        assert!("random".parse::<MoveOrderKind>().is_err());
        assert_eq!(MoveOrderKind::PriorWeighted.to_string(), "prior");
    }

    #[test]
    fn bench_positions_test() {
        for fen in BENCH_POSITIONS {
            let board = Chessboard::from_fen(fen).unwrap();
            assert!(board.legal_moves().len() > 1, "{fen}");
        }
    }
}
