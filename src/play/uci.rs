use std::io::{stdin, stdout, BufRead, Write};
use std::str::{FromStr, SplitWhitespace};

use anyhow::{anyhow, bail};
use log::{debug, error, warn};

use crate::games::chess::{move_to_uci, Chessboard};
use crate::general::common::{parse_int, parse_int_from_str, words_until, Res};
use crate::output::{Logger, Message};
use crate::search::{best_move_of_eval, go_with, MoveOrderKind, SearchConfig, DEFAULT_BUDGET};

/// Below this, `movetime` is treated as if it was this.
const MIN_MOVETIME_MS: u64 = 10_000;
const MOVETIME_BUDGET_FACTOR: f64 = 0.7;

/// What the engine answers to a single line of input.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Response {
    pub quit: bool,
    /// Lines for the GUI.
    pub output: Vec<String>,
    /// Only written to the transcript.
    pub log: Option<String>,
}

impl Response {
    fn lines(output: Vec<String>) -> Self {
        Self {
            output,
            ..Default::default()
        }
    }
}

fn option_lines() -> Vec<String> {
    let orders = MoveOrderKind::PriorWeighted.to_string();
    vec![
        "option name Move Overhead type spin default 0 min 0 max 10000".to_string(),
        "option name Threads type spin default 1 min 1 max 1".to_string(),
        "option name Hash type spin default 1 min 1 max 1".to_string(),
        "option name CheckExtensions type spin default 0 min 0 max 16".to_string(),
        format!(
            "option name MoveOrder type combo default {orders} var {orders} var {0}",
            MoveOrderKind::Unordered
        ),
    ]
}

/// A UCI engine that answers one command at a time.
///
/// Searches run synchronously, so `stop` and pondering aren't supported, and there is no time management:
/// the budget is derived from `movetime` or `nodes` only.
#[derive(Debug)]
pub struct Uci {
    board: Chessboard,
    config: SearchConfig,
    default_budget: u64,
    move_overhead: u64,
    logger: Option<Logger>,
}

impl Default for Uci {
    fn default() -> Self {
        Self::new(SearchConfig::default(), DEFAULT_BUDGET, None)
    }
}

impl Uci {
    pub fn new(config: SearchConfig, default_budget: u64, logger: Option<Logger>) -> Self {
        Self {
            board: Chessboard::default(),
            config,
            default_budget,
            move_overhead: 0,
            logger,
        }
    }

    pub fn board(&self) -> &Chessboard {
        &self.board
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn uci_loop(&mut self) -> Res<()> {
        self.run(stdin().lock(), &mut stdout())
    }

    /// Handles input until `quit` or the end of the input. Errors in a command are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Res<()> {
        for line in input.lines() {
            let line = line?;
            if let Some(logger) = &mut self.logger {
                logger.write_uci_input(line.trim_end());
            }
            match self.handle(&line) {
                Ok(response) => {
                    if response.quit {
                        return Ok(());
                    }
                    for text in &response.output {
                        writeln!(output, "{text}")?;
                        if let Some(logger) = &mut self.logger {
                            logger.write_uci_output(text);
                        }
                    }
                    output.flush()?;
                    if let (Some(logger), Some(log)) = (&mut self.logger, &response.log) {
                        logger.write_search_log(log);
                    }
                }
                Err(err) => {
                    error!("{err}");
                    if let Some(logger) = &mut self.logger {
                        logger.display_message(Message::Error, &err.to_string());
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, input: &str) -> Res<Response> {
        let mut words = input.split_whitespace();
        let Some(first_word) = words.next() else {
            return Ok(Response::default());
        };
        match first_word {
            "uci" => {
                let mut lines = vec![
                    format!("id name Chisel {}", env!("CARGO_PKG_VERSION")),
                    "id author the Chisel developers".to_string(),
                ];
                lines.extend(option_lines());
                lines.push("uciok".to_string());
                Ok(Response::lines(lines))
            }
            "isready" => Ok(Response::lines(vec!["readyok".to_string()])),
            "ucinewgame" => {
                self.board = Chessboard::default();
                Ok(Response::default())
            }
            "setoption" => self.handle_setoption(words),
            "position" => self.handle_position(words),
            "go" => self.handle_go(words),
            "quit" => Ok(Response {
                quit: true,
                ..Default::default()
            }),
            "debug" | "stop" | "ponderhit" | "register" => {
                debug!("ignoring '{}'", input.trim());
                Ok(Response::default())
            }
            x => {
                warn!("Unknown command '{x}', ignoring it");
                Ok(Response::default())
            }
        }
    }

    fn handle_setoption(&mut self, mut words: SplitWhitespace) -> Res<Response> {
        let name = words.next().unwrap_or_default();
        if name != "name" {
            bail!("Invalid option command: Expected 'name', got '{name}'");
        }
        let name = words_until(&mut words, "value");
        let value = words.collect::<Vec<_>>().join(" ");
        match name.to_lowercase().as_str() {
            "move overhead" => self.move_overhead = parse_int_from_str(&value, "move overhead")?,
            "threads" | "hash" => {
                debug!("ignoring option '{name}' ('{value}')");
            }
            "checkextensions" => {
                self.config.check_extensions = parse_int_from_str(&value, "check extensions")?
            }
            "moveorder" => {
                self.config.move_order = MoveOrderKind::from_str(&value)
                    .map_err(|_| anyhow!("Unknown move order '{value}'"))?
            }
            _ => bail!("Unknown option '{name}'"),
        }
        Ok(Response::default())
    }

    fn handle_position(&mut self, mut words: SplitWhitespace) -> Res<Response> {
        let position_word = words
            .next()
            .ok_or_else(|| anyhow!("Missing position after 'position' command"))?;
        let mut board = match position_word {
            "startpos" => {
                if let Some(word) = words.next() {
                    if word != "moves" {
                        bail!("Unrecognized word '{word}' after position command, expected either 'moves' or nothing");
                    }
                }
                Chessboard::default()
            }
            "fen" => Chessboard::from_fen(&words_until(&mut words, "moves"))?,
            x => bail!("Unrecognized position '{x}', expected 'startpos' or 'fen'"),
        };
        for text in words {
            let mov = board
                .move_from_uci(text)
                .map_err(|err| anyhow!("Couldn't parse move: {err}"))?;
            board.play(&mov);
        }
        // only replace the position once all moves were valid
        self.board = board;
        Ok(Response::default())
    }

    fn handle_go(&mut self, mut words: SplitWhitespace) -> Res<Response> {
        let mut budget = self.default_budget;
        while let Some(next_word) = words.next() {
            match next_word {
                "movetime" => {
                    let time: u64 = parse_int(&mut words, "time per move in milliseconds")?;
                    budget = (time.max(MIN_MOVETIME_MS) as f64 * MOVETIME_BUDGET_FACTOR) as u64;
                }
                "nodes" => budget = parse_int(&mut words, "node count")?,
                // always parse the int, even if it isn't used
                "wtime" | "btime" | "winc" | "binc" | "movestogo" | "depth" | "mate" => {
                    _ = parse_int::<i64>(&mut words, next_word)?;
                }
                "infinite" | "ponder" => (),
                "searchmoves" => bail!("The 'go searchmoves' option is not implemented"),
                _ => bail!("Unrecognized 'go' option: '{next_word}'"),
            }
        }
        debug!(
            "searching with budget {budget} (move overhead {0}ms is ignored)",
            self.move_overhead
        );
        let res = go_with(&mut self.board, budget, &self.config)?;
        let best = match best_move_of_eval(&res.eval) {
            Some(mov) => move_to_uci(mov),
            None => {
                warn!(
                    "No best move in '{0}' ({1}), playing the first legal move",
                    self.board, res.eval
                );
                self.board
                    .legal_moves()
                    .first()
                    .map(move_to_uci)
                    .unwrap_or_else(|| "0000".to_string())
            }
        };
        Ok(Response {
            quit: false,
            output: vec![format!("bestmove {best}")],
            log: Some(format!("explored: {}", res.positions_explored)),
        })
    }
}
