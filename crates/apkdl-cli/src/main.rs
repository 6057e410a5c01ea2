use apkdl_core::logging;

mod cli;

fn main() {
    // stdout carries the JSON result, so a broken log file must not abort the run.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr only: {:#}", err);
    }

    std::process::exit(cli::run_from_args());
}
