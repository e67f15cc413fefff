use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use std::process;

/// Environment variable holding an env_logger filter, e.g. `smallsh=trace`.
pub const LOG_ENV: &str = "SMALLSH_LOG";

pub fn print_usage() {
    println!("Usage: smallsh [-hvp]");
    println!("   -h   Print this help message");
    println!("   -v   Enable verbose (debug) logging");
    println!("   -p   Do not print a command prompt");
    process::exit(1);
}

/// Installs the logger. `SMALLSH_LOG` wins over the `-v` flag.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    Builder::new()
        .filter_level(level)
        .parse_env(Env::new().filter(LOG_ENV))
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {}",
                process::id(),
                record.level(),
                record.args()
            )
        })
        .init();
}
