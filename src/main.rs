use chisel::run_program;

fn main() {
    // stdout belongs to the UCI protocol, so diagnostics go to stderr
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    )
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(err) = run_program() {
        log::error!("Fatal error: {err}");
        std::process::exit(1);
    }
}
