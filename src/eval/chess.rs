use shakmaty::{CastlingSide, Color, File, Move, Piece, Role, Square};

use crate::eval::chess::pesto_values::{EG_PSQT, EG_VALUE, MG_PSQT, MG_VALUE, PIECE_PHASE};
use crate::eval::PhasedScore;
use crate::games::chess::Chessboard;

pub mod pesto_values;

pub const NUM_PIECE_TYPES: usize = 6;

fn role_idx(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// The tables are written from white's perspective starting at a8, shakmaty squares start at a1.
fn table_idx(square: Square, color: Color) -> usize {
    let idx = usize::from(square);
    match color {
        Color::White => idx ^ 56,
        Color::Black => idx,
    }
}

/// The contribution of a single piece, negative for black pieces. The phase is never negative.
pub fn piece_score(piece: Piece, square: Square) -> PhasedScore {
    let role = role_idx(piece.role);
    let idx = table_idx(square, piece.color);
    let mg = MG_VALUE[role] + MG_PSQT[role][idx];
    let eg = EG_VALUE[role] + EG_PSQT[role][idx];
    match piece.color {
        Color::White => PhasedScore::new(mg, eg, PIECE_PHASE[role]),
        Color::Black => PhasedScore::new(-mg, -eg, PIECE_PHASE[role]),
    }
}

/// Evaluates the position from scratch.
pub fn evaluate(board: &Chessboard) -> PhasedScore {
    board
        .pieces()
        .map(|(square, piece)| piece_score(piece, square))
        .fold(PhasedScore::default(), |acc, score| acc + score)
}

pub fn game_phase(board: &Chessboard) -> f64 {
    evaluate(board).phase()
}

fn relocate(piece: Piece, from: Square, to: Square) -> PhasedScore {
    piece_score(piece, to) - piece_score(piece, from)
}

/// How the evaluation changes when `mov` is played in `board`, which must be the position before the move.
///
/// `evaluate(board) + diff(board, mov)` is always equal to the evaluation of the position after the move.
pub fn diff(board: &Chessboard, mov: &Move) -> PhasedScore {
    let us = board.active_player();
    let them = !us;
    match *mov {
        Move::Normal {
            role,
            from,
            capture,
            to,
            promotion,
        } => {
            let mut delta = piece_score(
                Piece {
                    color: us,
                    role: promotion.unwrap_or(role),
                },
                to,
            ) - piece_score(Piece { color: us, role }, from);
            if let Some(captured) = capture {
                delta -= piece_score(
                    Piece {
                        color: them,
                        role: captured,
                    },
                    to,
                );
            }
            delta
        }
        Move::EnPassant { from, to } => {
            // the captured pawn is next to the moving pawn, not on the destination square
            let captured_square = Square::from_coords(to.file(), from.rank());
            relocate(Piece { color: us, role: Role::Pawn }, from, to)
                - piece_score(
                    Piece {
                        color: them,
                        role: Role::Pawn,
                    },
                    captured_square,
                )
        }
        Move::Castle { king, rook } => {
            // shakmaty encodes castling as the king moving onto its own rook
            let side = if king < rook {
                CastlingSide::KingSide
            } else {
                CastlingSide::QueenSide
            };
            let (king_file, rook_file) = match side {
                CastlingSide::KingSide => (File::G, File::F),
                CastlingSide::QueenSide => (File::C, File::D),
            };
            let back_rank = king.rank();
            relocate(
                Piece {
                    color: us,
                    role: Role::King,
                },
                king,
                Square::from_coords(king_file, back_rank),
            ) + relocate(
                Piece {
                    color: us,
                    role: Role::Rook,
                },
                rook,
                Square::from_coords(rook_file, back_rank),
            )
        }
        // drops only exist in crazyhouse
        Move::Put { .. } => PhasedScore::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MAX_PHASE;
    use proptest::prelude::*;
    use rand::prelude::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const PROMOTIONS: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";
    const EN_PASSANT: &str = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
    const BLACK_CASTLING: &str = "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R b KQkq - 4 8";

    fn assert_diff_consistent(board: &mut Chessboard) {
        let before = evaluate(board);
        for mov in &board.legal_moves() {
            let delta = diff(board, mov);
            let after = evaluate(&board.make_move(mov));
            assert_eq!(
                before + delta,
                after,
                "incremental update for {mov:?} in {board} doesn't match"
            );
            let score_delta = after.score() - before.score();
            assert!(((before + delta).score() - before.score() - score_delta).abs() < 1e-9);
        }
    }

    #[test]
    fn startpos_test() {
        let board = Chessboard::default();
        let score = evaluate(&board);
        assert_eq!(score.mg, 0);
        assert_eq!(score.eg, 0);
        assert_eq!(score.phase, MAX_PHASE);
        assert_eq!(score.score(), 0.0);
        assert_eq!(game_phase(&board), 1.0);
    }

    #[test]
    fn mirrored_position_test() {
        // the same position with colors swapped and the board flipped
        let white = Chessboard::from_fen("4k3/8/8/8/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let black = Chessboard::from_fen("4k3/3q4/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white), -evaluate(&black) + PhasedScore::new(0, 0, 8));
        assert_eq!(evaluate(&white).phase, 4);
        assert!(evaluate(&white).score() > 900.0);
        assert!(evaluate(&black).score() < -900.0);
    }

    #[test]
    fn piece_score_test() {
        let white_pawn = Piece {
            color: Color::White,
            role: Role::Pawn,
        };
        let black_pawn = Piece {
            color: Color::Black,
            role: Role::Pawn,
        };
        // 98 is in the second row of the table, i.e. the 7th rank for white
        assert_eq!(piece_score(white_pawn, Square::A7), PhasedScore::new(82 + 98, 94 + 178, 0));
        assert_eq!(piece_score(black_pawn, Square::A2), PhasedScore::new(-82 - 98, -94 - 178, 0));
        let white_knight = Piece {
            color: Color::White,
            role: Role::Knight,
        };
        assert_eq!(piece_score(white_knight, Square::A1), PhasedScore::new(337 - 105, 281 - 29, 1));
        assert_eq!(piece_score(white_knight, Square::H8), PhasedScore::new(337 - 107, 281 - 99, 1));
    }

    #[test]
    fn special_moves_test() {
        for fen in [KIWIPETE, PROMOTIONS, EN_PASSANT, BLACK_CASTLING] {
            let mut board = Chessboard::from_fen(fen).unwrap();
            assert_diff_consistent(&mut board);
        }
    }

    #[test]
    fn promotion_phase_test() {
        let board = Chessboard::from_fen(PROMOTIONS).unwrap();
        let mov = board.move_from_uci("g2g1q").unwrap();
        assert_eq!(diff(&board, &mov).phase, 4);
        // capturing a knight while promoting to a knight doesn't change the phase
        let mov = board.move_from_uci("g2h1n").unwrap();
        assert_eq!(diff(&board, &mov).phase, 0);
    }

    #[test]
    fn en_passant_test() {
        let board = Chessboard::from_fen(EN_PASSANT).unwrap();
        let mov = board.move_from_uci("e5f6").unwrap();
        let delta = diff(&board, &mov);
        // removes a black pawn, so white's material goes up
        assert!(delta.mg > 0);
        assert_eq!(delta.phase, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn random_walk_consistency(seed in any::<u64>(), len in 0_usize..60) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Chessboard::default();
            let mut running = evaluate(&board);
            for _ in 0..len {
                let moves = board.legal_moves();
                let Some(mov) = moves.choose(&mut rng) else {
                    break;
                };
                running += diff(&board, mov);
                board.play(mov);
                prop_assert_eq!(running, evaluate(&board));
            }
        }
    }
}
