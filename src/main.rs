mod builtins;
mod config;
mod exec;
mod jobs;
mod parser;
mod shell;
mod signals;
mod status;
mod utils;

use config::Config;
use std::env;
use std::process;

fn main() {
    // Parse command-line arguments.
    let config = Config::from_args(env::args().skip(1));
    if config.show_usage {
        utils::print_usage();
    }

    utils::init_logger(config.verbose);
    log::debug!("starting with {:?}", config);

    // Run the main shell loop; `exit` and end of input both land here.
    if let Err(err) = shell::run_shell(&config) {
        eprintln!("smallsh: {}", err);
        process::exit(1);
    }
}
