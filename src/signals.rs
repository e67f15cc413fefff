use signal_hook::consts::signal::SIGCHLD;
use signal_hook::flag;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Installs the shell's SIGCHLD handler and returns the flag it raises.
///
/// The handler only sets the flag; the job table polls it before each
/// prompt and reaps finished background children then.
pub fn install_sigchld_flag() -> io::Result<Arc<AtomicBool>> {
    let child_exited = Arc::new(AtomicBool::new(false));
    flag::register(SIGCHLD, Arc::clone(&child_exited))?;
    Ok(child_exited)
}
