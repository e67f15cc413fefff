use crate::builtins::handle_builtin;
use crate::config::Config;
use crate::exec::{execute_command, ExecError};
use crate::jobs::{report_finished, JobList};
use crate::parser::{parse_line, Command};
use crate::signals::install_sigchld_flag;
use crate::status::ProcessStatus;
use log::debug;
use nix::libc::EINTR;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;
use thiserror::Error;

/// Prompt printed before each line is read.
pub static PROMPT: &str = ": ";

/// What the main loop should do after a command has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("cannot set up line editor: {0}")]
    Editor(#[from] ReadlineError),
    #[error("cannot install SIGCHLD handler: {0}")]
    Signal(#[from] io::Error),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Routes a parsed command to a built-in or to an external program.
///
/// `status` holds the termination of the last foreground child; only a
/// foreground wait updates it. Errors returned here are fatal.
pub fn dispatch(
    cmd: &Command,
    status: &mut ProcessStatus,
    jobs: &mut JobList,
) -> Result<Outcome, ExecError> {
    if cmd.argv.is_empty() {
        return Ok(Outcome::Continue);
    }
    if let Some(outcome) = handle_builtin(cmd, status) {
        return Ok(outcome);
    }
    match execute_command(cmd, status, jobs) {
        Ok(()) => Ok(Outcome::Continue),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            eprintln!("smallsh: {}", err);
            Ok(Outcome::Continue)
        }
    }
}

/// Runs the main shell loop: reaps finished background jobs, prints the
/// prompt (if enabled), reads a line, parses it and dispatches it.
pub fn run_shell(config: &Config) -> Result<(), ShellError> {
    let mut editor = DefaultEditor::new()?;
    if let Some(path) = &config.history_file {
        if let Err(err) = editor.load_history(path) {
            debug!("no history loaded from {}: {}", path.display(), err);
        }
    }

    let mut jobs = JobList::new(install_sigchld_flag()?);
    let mut status = ProcessStatus::default();
    let prompt = if config.emit_prompt { PROMPT } else { "" };

    let result = loop {
        report_finished(&jobs.reap());

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            // SIGCHLD can cut a terminal read short.
            Err(ReadlineError::Errno(errno)) if errno as i32 == EINTR => continue,
            Err(ReadlineError::Eof) => {
                debug!("end of input");
                break Ok(());
            }
            Err(err) => break Err(ShellError::Editor(err)),
        };

        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("smallsh: syntax error: {}", err);
                continue;
            }
        };
        if let Err(err) = editor.add_history_entry(line.as_str()) {
            debug!("line not added to history: {}", err);
        }
        debug!("parsed {:?}", cmd);

        match dispatch(&cmd, &mut status, &mut jobs) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Exit) => break Ok(()),
            Err(err) => break Err(ShellError::Exec(err)),
        }
    };

    if !jobs.is_empty() {
        debug!("terminating {} background job(s)", jobs.len());
        jobs.terminate_all();
    }
    if let Some(path) = &config.history_file {
        if let Err(err) = editor.save_history(path) {
            debug!("history not saved to {}: {}", path.display(), err);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn dispatch_line(line: &str, status: &mut ProcessStatus) -> Outcome {
        let mut jobs = JobList::new(Arc::new(AtomicBool::new(false)));
        let cmd = parse_line(line).unwrap().unwrap();
        dispatch(&cmd, status, &mut jobs).unwrap()
    }

    #[test]
    fn test_empty_argv_is_a_no_op() {
        let mut status = ProcessStatus::Exited(3);
        assert_eq!(dispatch_line("< in.txt > out.txt &", &mut status), Outcome::Continue);
        assert_eq!(status, ProcessStatus::Exited(3));
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let mut status = ProcessStatus::default();
        assert_eq!(dispatch_line("exit", &mut status), Outcome::Exit);
    }

    #[test]
    fn test_status_keeps_previous_value() {
        let mut status = ProcessStatus::Exited(1);
        assert_eq!(dispatch_line("status", &mut status), Outcome::Continue);
        assert_eq!(status, ProcessStatus::Exited(1));
    }
}
