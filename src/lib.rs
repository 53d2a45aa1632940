/// Chisel is a chess engine built around a budget-driven search:
/// instead of searching to a fixed depth, every node splits a budget of positions between its children.
///
/// The crate is grouped into a few broad modules:
/// - `games`: the chess rules, delegated to `shakmaty`
/// - `eval`: the static, incrementally updatable evaluation
/// - `search`: the search itself, along with move ordering and pruning heuristics
/// - `play`: the UCI engine and batch tools built on top of the search
use std::fmt::{Display, Formatter};
use std::io::{stdin, stdout};

use clap::{Parser, ValueEnum};
use log::debug;

use crate::general::common::Res;
use crate::output::{Logger, Message};
use crate::play::perf::{eval_report, format_bench, open_fens, perf, run_bench};
use crate::play::uci::Uci;
use crate::search::{MoveOrderKind, SearchConfig, DEFAULT_BUDGET};

pub mod general;

pub mod games;

pub mod search;

pub mod play;

pub mod eval;

pub mod output;

const DEFAULT_BENCH_BUDGET: u64 = 20_000;

/// A chess engine with a budget-driven search.
#[derive(Parser, Debug)]
#[command(name = "Chisel", version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(value_enum, default_value_t = Mode::Uci)]
    mode: Mode,
    /// File with one FEN per line, used by `perf` and `eval`. Reads from stdin if missing.
    file: Option<String>,
    /// Number of positions to distribute between the children of the root.
    #[arg(long, short)]
    budget: Option<u64>,
    #[arg(value_enum, long, short, default_value_t = MoveOrderKind::PriorWeighted)]
    order: MoveOrderKind,
    #[arg(long, default_value_t = 0)]
    check_extensions: u32,
    /// Write a transcript of the UCI session to this file.
    #[arg(long, short)]
    log: Option<String>,
    /// Print every root move with its score in `perf` mode.
    #[arg(long)]
    trace: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, ValueEnum, Default, Debug)]
pub enum Mode {
    /// Start the UCI loop.
    #[default]
    Uci,
    /// Search every position in a FEN file and report the results.
    Perf,
    /// Print static evaluation statistics for every position in a FEN file.
    Eval,
    /// Run and report bench, then exit.
    Bench,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Uci => write!(f, "uci"),
            Mode::Perf => write!(f, "perf"),
            Mode::Eval => write!(f, "eval"),
            Mode::Bench => write!(f, "bench"),
        }
    }
}

impl CommandLineArgs {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            move_order: self.order,
            check_extensions: self.check_extensions,
            ply_extensions: 0,
            trace: self.trace,
        }
    }
}

pub fn run_program() -> Res<()> {
    let args = CommandLineArgs::parse();
    debug!("starting in {0} mode: {args:?}", args.mode);
    let config = args.search_config();
    match args.mode {
        Mode::Uci => {
            let logger = args.log.as_deref().map(Logger::create).transpose()?;
            let mut uci = Uci::new(config, args.budget.unwrap_or(DEFAULT_BUDGET), logger);
            uci.uci_loop()
        }
        Mode::Perf => {
            let budget = args.budget.unwrap_or(DEFAULT_BUDGET);
            match &args.file {
                Some(path) => perf(open_fens(path)?, &mut stdout(), budget, &config),
                None => perf(stdin().lock(), &mut stdout(), budget, &config),
            }
        }
        Mode::Eval => match &args.file {
            Some(path) => eval_report(open_fens(path)?, &mut stdout()),
            None => eval_report(stdin().lock(), &mut stdout()),
        },
        Mode::Bench => {
            let budget = args.budget.unwrap_or(DEFAULT_BENCH_BUDGET);
            let res = run_bench(budget, &config)?;
            Message::Info.display(&format_bench(&res, budget));
            Ok(())
        }
    }
}
