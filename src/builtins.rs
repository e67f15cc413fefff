use crate::parser::Command;
use crate::shell::Outcome;
use crate::status::ProcessStatus;
use log::debug;
use std::env;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdError {
    #[error("cd: cannot determine the home directory")]
    NoHome,
    #[error("cd: {path}: {source}")]
    Chdir { path: String, source: io::Error },
}

/// Checks if the command is a built-in and, if so, executes it.
/// Supported built-ins are "exit", "cd" and "status".
/// Returns `None` when the command should run as an external program.
pub fn handle_builtin(cmd: &Command, status: &ProcessStatus) -> Option<Outcome> {
    match cmd.name()? {
        "exit" => Some(Outcome::Exit),
        "cd" => {
            if let Err(err) = change_dir(&cmd.argv[1..]) {
                eprintln!("smallsh: {}", err);
            }
            Some(Outcome::Continue)
        }
        "status" => {
            println!("{}", status);
            Some(Outcome::Continue)
        }
        _ => None,
    }
}

/// Changes the working directory to the first argument, or to the home
/// directory when there is none. Extra arguments are ignored.
pub fn change_dir(args: &[String]) -> Result<(), CdError> {
    let target = cd_target(args)?;
    env::set_current_dir(&target).map_err(|source| CdError::Chdir {
        path: target.display().to_string(),
        source,
    })?;
    debug!("working directory is now {}", target.display());
    Ok(())
}

fn cd_target(args: &[String]) -> Result<PathBuf, CdError> {
    match args.first() {
        Some(path) => Ok(PathBuf::from(path)),
        None => dirs_next::home_dir().ok_or(CdError::NoHome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn command(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_exit_is_builtin() {
        let status = ProcessStatus::default();
        assert_eq!(handle_builtin(&command("exit"), &status), Some(Outcome::Exit));
        assert_eq!(
            handle_builtin(&command("exit now please"), &status),
            Some(Outcome::Exit)
        );
    }

    #[test]
    fn test_status_does_not_touch_status() {
        let status = ProcessStatus::Signaled(9);
        assert_eq!(
            handle_builtin(&command("status"), &status),
            Some(Outcome::Continue)
        );
        assert_eq!(status, ProcessStatus::Signaled(9));
    }

    #[test]
    fn test_external_commands_are_not_builtins() {
        let status = ProcessStatus::default();
        assert_eq!(handle_builtin(&command("ls -l"), &status), None);
        assert_eq!(handle_builtin(&command("Exit"), &status), None);
        assert_eq!(handle_builtin(&command("< in.txt"), &status), None);
    }

    #[test]
    fn test_cd_target_uses_first_argument() {
        let args = vec!["/tmp".to_string(), "ignored".to_string()];
        assert_eq!(cd_target(&args).unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_cd_to_missing_directory_fails() {
        let before = env::current_dir().unwrap();
        let args = vec!["/nonexistent/smallsh/dir".to_string()];
        let err = change_dir(&args).unwrap_err();
        assert!(matches!(err, CdError::Chdir { .. }));
        assert!(err.to_string().starts_with("cd: /nonexistent/smallsh/dir: "));
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
