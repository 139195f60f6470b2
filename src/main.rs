use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod dash;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::debug!("main: {:?}", args);

    let res = dash::run(&args);
    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        if let Some(source) = std::error::Error::source(e.as_ref()) {
            eprintln!("caused by: {}", source);
        }
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
