use std::env;
use std::path::PathBuf;

/// Environment variable overriding the history file location.
pub const HISTORY_ENV: &str = "SMALLSH_HISTORY";

/// Runtime options gathered from the command line and the environment.
#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    /// Print the prompt before each read.
    pub emit_prompt: bool,
    /// Log at debug level unless `SMALLSH_LOG` says otherwise.
    pub verbose: bool,
    /// Where line history is loaded from and saved to.
    pub history_file: Option<PathBuf>,
    /// `-h` was given.
    pub show_usage: bool,
}

impl Config {
    /// Builds the configuration from command-line flags (without the
    /// program name). Unknown flags are ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Config {
            emit_prompt: true,
            verbose: false,
            history_file: default_history_file(),
            show_usage: false,
        };
        for arg in args {
            match arg.as_ref() {
                "-h" => config.show_usage = true,
                "-v" => config.verbose = true,
                "-p" => config.emit_prompt = false,
                _ => {}
            }
        }
        config
    }
}

fn default_history_file() -> Option<PathBuf> {
    match env::var_os(HISTORY_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs_next::home_dir().map(|home| home.join(".smallsh_history")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_args(Vec::<String>::new());
        assert!(config.emit_prompt);
        assert!(!config.verbose);
        assert!(!config.show_usage);
    }

    #[test]
    fn test_flags() {
        let config = Config::from_args(["-v", "-p", "--bogus"]);
        assert!(!config.emit_prompt);
        assert!(config.verbose);
        assert!(!config.show_usage);

        let config = Config::from_args(["-h"]);
        assert!(config.show_usage);
    }
}
