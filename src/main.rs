mod args;
mod dash;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
    debug!("args: {:?}", args);

    if let Err(e) = dash::run_dashboard(&args) {
        error!("{:?}", e);
        eprintln!("An error occured: {}", e);
        std::process::exit(1);
    }
}
