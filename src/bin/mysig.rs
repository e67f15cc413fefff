/*
 * mysig.rs - Another handy routine for testing the shell's status tracking
 *
 * usage: mysig <n>
 * Sends signal <n> to itself.
 */

use nix::sys::signal::{self, Signal};
use nix::unistd::getpid;
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <n>", args[0]);
        process::exit(0);
    }

    let signal = args[1]
        .parse::<i32>()
        .ok()
        .and_then(|n| Signal::try_from(n).ok())
        .unwrap_or_else(|| {
            eprintln!("Error: <n> must be a signal number");
            process::exit(1);
        });

    if let Err(err) = signal::kill(getpid(), signal) {
        eprintln!("kill error: {}", err);
        process::exit(1);
    }

    // Signals such as SIGCHLD are ignored by default.
    process::exit(0);
}
