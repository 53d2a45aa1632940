pub mod perf;
pub mod uci;
