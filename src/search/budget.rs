use std::time::Instant;

use log::{debug, trace};
use shakmaty::{Color, Move};

use crate::eval::chess::{diff, evaluate};
use crate::games::chess::{move_to_uci, Chessboard};
use crate::search::move_order::MoveOrder;
use crate::search::quit_early::{QuitEarly, QUIT_EARLY_MIN_DEPTH};
use crate::search::repetition::{path_key, RepeatCache};
use crate::search::statistics::SearchCounter::*;
use crate::search::statistics::{Statistics, Summary};
use crate::search::{
    compare_scores, Eval, SearchConfig, SearchError, SearchParams, SearchResult,
};

type NodeResult = Result<(Eval, u64), SearchError>;

/// Depth-first search where the depth isn't fixed but follows from the number of legal moves:
/// every node splits its move budget evenly between its children, and a child whose share is
/// empty gets evaluated statically unless one of the extensions applies.
///
/// Each side tracks the best score it can already force somewhere on the current path.
/// Once the side to move finds a move that's at least as good for it as what the opponent can force,
/// the opponent won't enter this node, so the remaining children are skipped.
#[derive(Debug)]
pub struct BudgetSearch<O: MoveOrder> {
    config: SearchConfig,
    order: O,
    cache: RepeatCache,
    /// Moves from the root to the current node
    path: Vec<Move>,
    quit_early: QuitEarly,
    statistics: Statistics,
    root_trace: Vec<String>,
}

impl<O: MoveOrder> BudgetSearch<O> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            order: O::default(),
            cache: RepeatCache::default(),
            path: vec![],
            quit_early: QuitEarly::new(0.0, 1.0),
            statistics: Statistics::default(),
            root_trace: vec![],
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Searches `board` and returns it unchanged. All state from previous searches is discarded first.
    pub fn search(
        &mut self,
        board: &mut Chessboard,
        move_budget: u64,
    ) -> Result<SearchResult, SearchError> {
        let start_time = Instant::now();
        let root_score = evaluate(board);
        self.order = O::default();
        self.cache = RepeatCache::default();
        self.path.clear();
        self.statistics = Statistics::default();
        self.root_trace.clear();
        self.quit_early = QuitEarly::new(root_score.score(), root_score.phase());

        let params = SearchParams::root(move_budget, &self.config, root_score);
        let (eval, positions_explored) = self.search_node(board, params)?;
        debug_assert!(self.path.is_empty());

        debug!(
            "searched '{board}' with budget {move_budget} in {0}ms: {eval}, explored {positions_explored}, cached {1}",
            start_time.elapsed().as_millis(),
            self.cache.len()
        );
        debug!("{}", Summary(&self.statistics));
        let trace = self
            .config
            .trace
            .then(|| std::mem::take(&mut self.root_trace));
        Ok(SearchResult {
            eval,
            positions_explored,
            trace,
        })
    }

    fn search_node(&mut self, board: &mut Chessboard, params: SearchParams) -> NodeResult {
        let key = path_key(&self.path);
        if let Some(key) = &key {
            if let Some(eval) = self.cache.get(key) {
                self.statistics.increment(CacheHits, params.depth);
                return Ok((eval.clone(), 0));
            }
        }

        let us = board.active_player();
        if board.is_checkmate() {
            return Ok((Eval::Loss(us), 0));
        }
        if board.is_stalemate() {
            return Ok((Eval::Draw, 0));
        }
        if params.depth >= QUIT_EARLY_MIN_DEPTH
            && self.quit_early.should_quit_early(params.score.score(), us)
        {
            return Ok((Eval::Loss(us), 0));
        }

        let moves = self.order.order_moves(board);
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves {
                fen: board.as_fen(),
            });
        }
        if params.depth == 0 && moves.len() == 1 {
            return Ok((Eval::Forced(moves[0].clone()), 0));
        }
        self.statistics.increment(NodesExpanded, params.depth);
        self.statistics
            .add(MovesGenerated, params.depth, moves.len() as u64);

        let mut white_best = params.white_best;
        let mut black_best = params.black_best;
        let mut examined: Vec<(Move, f64)> = Vec::with_capacity(moves.len());
        let mut positions_explored = 0;
        let mut crossed = false;
        for mov in &moves {
            let child_params = SearchParams {
                white_best,
                black_best,
                ..params
            };
            let (score, explored) = self.explore_move(board, mov, child_params, moves.len())?;
            positions_explored += explored;
            if params.depth == 0 {
                let line = format!("{0} {score:.1} explored {explored}", move_to_uci(mov));
                trace!("{line}");
                if self.config.trace {
                    self.root_trace.push(line);
                }
            }
            examined.push((mov.clone(), score));
            match us {
                Color::White => white_best = white_best.max(score),
                Color::Black => black_best = black_best.min(score),
            }
            if white_best >= black_best {
                crossed = true;
                break;
            }
        }
        self.statistics
            .add(SiblingsExamined, params.depth, examined.len() as u64);

        // stable, so equal scores stay in search order
        examined.sort_by(|(_, a), (_, b)| compare_scores(*b, *a, us));
        let sorted_moves: Vec<Move> = examined.iter().map(|(mov, _)| mov.clone()).collect();
        self.order.update_priors(&sorted_moves);

        // the root always reports its moves, a cross there means a forced win was found
        let eval = if crossed && params.depth > 0 {
            self.statistics.increment(Crosses, params.depth);
            Eval::AlphaBetaCross(us)
        } else {
            Eval::SubmoveList(examined)
        };
        if let Some(key) = key {
            self.cache.insert(key, eval.clone());
        }
        Ok((eval, positions_explored))
    }

    /// Returns the score of the child reached by `mov` and the number of positions evaluated for it.
    fn explore_move(
        &mut self,
        board: &mut Chessboard,
        mov: &Move,
        params: SearchParams,
        num_siblings: usize,
    ) -> Result<(f64, u64), SearchError> {
        let is_capture = board.is_capture(mov);
        let child = SearchParams {
            move_budget: params.move_budget / num_siblings as u64,
            depth: params.depth + 1,
            score: params.score + diff(board, mov),
            ..params
        };
        self.path.push(mov.clone());
        let res = self.explore_child(
            &mut board.make_move(mov),
            child,
            params.move_budget,
            is_capture,
        );
        self.path.pop();
        res
    }

    /// `board` is the position after the move. `parent_budget` is the budget of the node the move was played in.
    fn explore_child(
        &mut self,
        board: &mut Chessboard,
        mut child: SearchParams,
        parent_budget: u64,
        is_capture: bool,
    ) -> Result<(f64, u64), SearchError> {
        if child.move_budget == 0 {
            if child.ply_extensions == 0 {
                if is_capture && parent_budget > 0 {
                    child.move_budget = parent_budget;
                    self.statistics.increment(CaptureExtensions, child.depth);
                } else if !is_capture && child.check_extensions > 0 && board.is_in_check() {
                    child.check_extensions -= 1;
                    child.ply_extensions += 1;
                    self.statistics.increment(CheckExtensions, child.depth);
                } else {
                    self.statistics.count_leaf();
                    if child.check_extensions < self.config.check_extensions {
                        self.statistics.increment(ExtendedLeaves, child.depth);
                    }
                    return Self::scalarize(board, Eval::LeafEval(child.score.score()), 1);
                }
            }
            if child.move_budget == 0 {
                child.ply_extensions -= 1;
                self.statistics.increment(PlyExtensions, child.depth);
            }
        }
        let (eval, explored) = self.search_node(board, child)?;
        Self::scalarize(board, eval, explored)
    }

    fn scalarize(board: &Chessboard, eval: Eval, explored: u64) -> Result<(f64, u64), SearchError> {
        let score = eval.scalar().ok_or_else(|| SearchError::ForcedScalarized {
            fen: board.as_fen(),
        })?;
        Ok((score, explored))
    }
}
