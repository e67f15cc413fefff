use crate::jobs::JobList;
use crate::parser::Command;
use crate::status::ProcessStatus;
use log::debug;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, getpid, ForkResult, Pid};
use std::ffi::{CString, NulError};
use std::io::{self, Write};
use std::os::unix::io::RawFd;
use std::process;
use thiserror::Error;

/// Exit status of a child whose redirection could not be set up.
pub const REDIRECT_FAILED: i32 = 1;
/// Exit status of a child whose program image could not be replaced.
pub const EXEC_FAILED: i32 = 2;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),
    #[error("waitpid({pid}) failed: {source}")]
    Wait { pid: Pid, source: Errno },
    #[error("argument contains a NUL byte: {0}")]
    NulByte(#[from] NulError),
}

impl ExecError {
    /// Whether the shell can no longer run commands after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Fork(_))
    }
}

#[derive(Debug, Error)]
#[error("cannot open {path} for {direction}: {source}")]
struct RedirectError {
    path: String,
    direction: &'static str,
    source: Errno,
}

/// Runs an external command in a forked child.
///
/// Foreground commands are waited for and their termination is stored in
/// `status`. Background commands are recorded in `jobs` and left running.
pub fn execute_command(
    cmd: &Command,
    status: &mut ProcessStatus,
    jobs: &mut JobList,
) -> Result<(), ExecError> {
    let argv = cmd
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let Some(program) = argv.first() else {
        return Ok(());
    };
    let name = &cmd.argv[0];

    // Anything still buffered would otherwise be written twice.
    let _ = io::stdout().flush();

    debug!("forking for {:?}", cmd);
    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Child => run_child(cmd, program, &argv),
        ForkResult::Parent { child } => {
            if cmd.background {
                println!("background pid {} started: {}", child, name);
                jobs.add(child, cmd.argv.join(" "));
                return Ok(());
            }

            println!("pid {} started: {}", child, name);
            let outcome = wait_for(child)?;
            *status = outcome;
            println!("parent {}: child {} terminated ({})", getpid(), child, outcome);
            Ok(())
        }
    }
}

/// Blocks until `child` terminates.
fn wait_for(child: Pid) -> Result<ProcessStatus, ExecError> {
    loop {
        match waitpid(child, None) {
            Ok(wait_status) => {
                if let Some(status) = ProcessStatus::from_wait(wait_status) {
                    debug!("child {} finished: {}", child, status);
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(ExecError::Wait { pid: child, source }),
        }
    }
}

/// Child side of the fork. Never returns.
fn run_child(cmd: &Command, program: &CString, argv: &[CString]) -> ! {
    // The Rust runtime ignores SIGPIPE and exec would pass that on.
    if let Err(err) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        eprintln!("smallsh: cannot reset SIGPIPE: {}", err);
    }
    if let Err(err) = redirect_stdio(cmd) {
        eprintln!("smallsh: {}", err);
        process::exit(REDIRECT_FAILED);
    }
    let errno = replace_image(program, argv);
    eprintln!("smallsh: {}: {}", cmd.argv[0], errno.desc());
    process::exit(EXEC_FAILED);
}

/// Points stdin, then stdout, at the command's redirection targets.
fn redirect_stdio(cmd: &Command) -> Result<(), RedirectError> {
    if let Some(path) = &cmd.infile {
        redirect(path, "input", OFlag::O_RDONLY, STDIN_FILENO)?;
    }
    if let Some(path) = &cmd.outfile {
        redirect(
            path,
            "output",
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            STDOUT_FILENO,
        )?;
    }
    Ok(())
}

fn redirect(
    path: &str,
    direction: &'static str,
    flags: OFlag,
    target: RawFd,
) -> Result<(), RedirectError> {
    let fail = |source: Errno| RedirectError {
        path: path.to_string(),
        direction,
        source,
    };
    let fd = open(path, flags, Mode::from_bits_truncate(0o644)).map_err(fail)?;
    if fd != target {
        dup2(fd, target).map_err(fail)?;
        close(fd).map_err(fail)?;
    }
    Ok(())
}

/// Replaces the current process image. Only a failure ever comes back.
fn replace_image(program: &CString, argv: &[CString]) -> Errno {
    match execvp(program, argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    }
}
