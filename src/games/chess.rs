use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use anyhow::{anyhow, bail};
use shakmaty::fen::Fen;
use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Piece, Position, Square,
};

use crate::general::common::Res;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The canonical text of a move, e.g. `e2e4`, `e7e8q` or `e1g1` (standard castling notation).
pub fn move_to_uci(mov: &Move) -> String {
    mov.to_uci(CastlingMode::Standard).to_string()
}

/// A chess position that can be changed by making moves and restored afterwards.
///
/// Move generation and all rules are delegated to `shakmaty`.
/// Making a move returns a [`MoveGuard`], which undoes the move once it goes out of scope,
/// so the position can't be left in a modified state by an early return or an error.
#[derive(Debug, Clone, Default)]
pub struct Chessboard {
    pos: Chess,
    undo: Vec<Chess>,
}

impl Chessboard {
    pub fn from_fen(fen: &str) -> Res<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|err| anyhow!("Invalid FEN '{fen}': {err}"))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| anyhow!("Illegal position '{fen}': {err}"))?;
        Ok(Self::from(pos))
    }

    pub fn as_fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn active_player(&self) -> Color {
        self.pos.turn()
    }

    pub fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    /// All occupied squares together with their pieces, starting at a1.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        let board = self.pos.board();
        board
            .occupied()
            .into_iter()
            .filter_map(move |square| board.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn is_in_check(&self) -> bool {
        self.pos.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    /// En passant counts as a capture.
    pub fn is_capture(&self, mov: &Move) -> bool {
        mov.is_capture()
    }

    /// Plays a move for the remainder of the game; it can't be undone.
    /// Use [`Self::make_move`] inside a search.
    pub fn play(&mut self, mov: &Move) {
        self.pos.play_unchecked(mov);
    }

    pub fn make_move(&mut self, mov: &Move) -> MoveGuard<'_> {
        debug_assert!(self.pos.is_legal(mov), "{mov:?} is not legal in {}", self.as_fen());
        self.undo.push(self.pos.clone());
        self.pos.play_unchecked(mov);
        MoveGuard { board: self }
    }

    fn unmake_move(&mut self) {
        if let Some(prev) = self.undo.pop() {
            self.pos = prev;
        }
    }

    /// Parses a move in UCI notation and checks that it's legal in the current position.
    pub fn move_from_uci(&self, text: &str) -> Res<Move> {
        let text = text.trim();
        if !(4..=5).contains(&text.len()) {
            bail!("'{text}' is not a move in UCI notation");
        }
        self.legal_moves()
            .into_iter()
            .find(|mov| move_to_uci(mov) == text)
            .ok_or_else(|| anyhow!("'{text}' is not a legal move in position '{}'", self.as_fen()))
    }
}

impl From<Chess> for Chessboard {
    fn from(pos: Chess) -> Self {
        Self { pos, undo: vec![] }
    }
}

impl Display for Chessboard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_fen())
    }
}

/// Returned by [`Chessboard::make_move`]. Dereferences to the board after the move
/// and restores the board from before the move when dropped.
#[derive(Debug)]
pub struct MoveGuard<'a> {
    board: &'a mut Chessboard,
}

impl Deref for MoveGuard<'_> {
    type Target = Chessboard;

    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.board.unmake_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color::{Black, White};

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    const STALEMATE: &str = "k7/8/8/8/8/8/5q2/7K w - - 0 1";

    #[test]
    fn startpos_test() {
        let board = Chessboard::default();
        assert_eq!(board.as_fen(), START_FEN);
        assert_eq!(board.active_player(), White);
        assert_eq!(board.legal_moves().len(), 20);
        assert_eq!(board.pieces().count(), 32);
        assert!(!board.is_in_check());
        assert!(!board.is_checkmate());
        assert!(!board.is_stalemate());
        assert_eq!(Chessboard::from_fen(START_FEN).unwrap().as_fen(), START_FEN);
    }

    #[test]
    fn invalid_fen_test() {
        assert!(Chessboard::from_fen("").is_err());
        assert!(Chessboard::from_fen("not a fen").is_err());
        // no kings
        assert!(Chessboard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn guard_restores_position_test() {
        let mut board = Chessboard::from_fen(KIWIPETE).unwrap();
        let moves = board.legal_moves();
        assert_eq!(moves.len(), 48);
        for mov in &moves {
            {
                let mut child = board.make_move(mov);
                assert_ne!(child.as_fen(), KIWIPETE);
                assert_eq!(child.active_player(), Black);
                for reply in child.legal_moves().iter().take(3) {
                    let grandchild = child.make_move(reply);
                    assert_eq!(grandchild.active_player(), White);
                }
            }
            assert_eq!(board.as_fen(), KIWIPETE);
        }
    }

    #[test]
    fn play_is_permanent_test() {
        let mut board = Chessboard::default();
        let mov = board.move_from_uci("e2e4").unwrap();
        board.play(&mov);
        assert_eq!(board.active_player(), Black);
        assert_eq!(
            board.as_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn uci_move_test() {
        let board = Chessboard::from_fen(KIWIPETE).unwrap();
        for mov in &board.legal_moves() {
            let text = move_to_uci(mov);
            assert_eq!(&board.move_from_uci(&text).unwrap(), mov);
        }
        assert!(board.move_from_uci("e1g1").is_ok());
        assert!(board.move_from_uci("e2e5").is_err());
        assert!(board.move_from_uci("e9e4").is_err());
        assert!(board.move_from_uci("").is_err());
        assert!(board.move_from_uci("castle").is_err());
    }

    #[test]
    fn capture_and_check_test() {
        let mut board =
            Chessboard::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let ep = board.move_from_uci("e5f6").unwrap();
        assert!(ep.is_en_passant());
        assert!(board.is_capture(&ep));
        assert!(!board.make_move(&ep).is_in_check());
        let quiet = board.move_from_uci("d2d3").unwrap();
        assert!(!board.is_capture(&quiet));
        let check = board.move_from_uci("f1b5").unwrap();
        assert!(board.make_move(&check).is_in_check());
        assert_eq!(
            board.as_fen(),
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
        );
    }

    #[test]
    fn terminal_positions_test() {
        let mate = Chessboard::from_fen(FOOLS_MATE).unwrap();
        assert!(mate.is_checkmate());
        assert!(mate.is_in_check());
        assert!(!mate.is_stalemate());
        assert!(mate.legal_moves().is_empty());

        let stalemate = Chessboard::from_fen(STALEMATE).unwrap();
        assert!(stalemate.is_stalemate());
        assert!(!stalemate.is_checkmate());
        assert!(!stalemate.is_in_check());
    }
}
