use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::time::Instant;

use anyhow::anyhow;
use colored::Colorize;

use crate::eval::chess::{evaluate, game_phase};
use crate::games::chess::{move_to_uci, Chessboard};
use crate::general::common::Res;
use crate::search::{go_with, BenchResult, SearchConfig, BENCH_POSITIONS};

/// Every `EVAL_REPLY_STEP`th reply is used for the two-ply part of the eval report.
const EVAL_REPLY_STEP: usize = 9;

pub fn open_fens(path: &str) -> Res<BufReader<File>> {
    let file = File::open(path).map_err(|err| anyhow!("Couldn't open FEN file '{path}': {err}"))?;
    Ok(BufReader::new(file))
}

/// Reads one FEN per line. Empty lines and lines starting with `#` are skipped.
fn positions<R: BufRead>(input: R) -> impl Iterator<Item = Res<(String, Chessboard)>> {
    input.lines().filter_map(|line| match line {
        Err(err) => Some(Err(err.into())),
        Ok(line) => {
            let fen = line.trim();
            if fen.is_empty() || fen.starts_with('#') {
                None
            } else {
                Some(Chessboard::from_fen(fen).map(|board| (fen.to_string(), board)))
            }
        }
    })
}

/// Searches every position and prints what the engine thinks about it.
pub fn perf<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    budget: u64,
    config: &SearchConfig,
) -> Res<()> {
    for position in positions(input) {
        let (fen, mut board) = position?;
        let initial = evaluate(&board).score();
        let res = go_with(&mut board, budget, config)?;
        let final_eval = res
            .eval
            .scalar()
            .map_or_else(|| "none".to_string(), |score| format!("{score:.3}"));
        let best_move = res
            .best_move()
            .map_or_else(|| "none".to_string(), move_to_uci);
        writeln!(output, "fen: {fen}")?;
        writeln!(output, "initial_eval: {initial:.3} final_eval: {final_eval}")?;
        writeln!(output, "best move: {best_move}")?;
        writeln!(output, "explored: {}", res.positions_explored)?;
        if let Some(trace) = res.trace {
            for line in trace {
                writeln!(output, "  {line}")?;
            }
        }
    }
    Ok(())
}

/// Prints the static eval of each position, the sum of squared evals of a sample of the positions
/// two plies later, and the game phase, as CSV.
pub fn eval_report<R: BufRead, W: Write>(input: R, output: &mut W) -> Res<()> {
    writeln!(output, "base,sum_square_diffs,phase")?;
    for position in positions(input) {
        let (_, mut board) = position?;
        let base = evaluate(&board).score();
        let phase = game_phase(&board);
        let mut sum_square_diffs = 0.0;
        for mov in &board.legal_moves() {
            let mut child = board.make_move(mov);
            for reply in child.legal_moves().iter().step_by(EVAL_REPLY_STEP) {
                let node = evaluate(&child.make_move(reply)).score();
                sum_square_diffs += node * node;
            }
        }
        writeln!(output, "{base}, {sum_square_diffs}, {phase}")?;
    }
    Ok(())
}

pub fn run_bench(budget: u64, config: &SearchConfig) -> Res<BenchResult> {
    let mut sum = BenchResult::default();
    for fen in BENCH_POSITIONS {
        let mut board = Chessboard::from_fen(fen)?;
        let start = Instant::now();
        let res = go_with(&mut board, budget, config)?;
        sum.time += start.elapsed();
        sum.positions += res.positions_explored;
    }
    Ok(sum)
}

pub fn format_bench(res: &BenchResult, budget: u64) -> String {
    let millis = res.time.as_millis().max(1);
    format!(
        "budget {budget}, positions {0}, time {1}ms, pps {2}k",
        res.positions,
        res.time.as_millis(),
        (res.positions as f64 / millis as f64).round().to_string().red()
    )
}
