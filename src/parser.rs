use thiserror::Error;

/// Upper bound on the number of argument tokens in a single command.
pub const MAX_ARGS: usize = 512;

/// Represents a parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Command {
    /// Program name followed by its arguments.
    pub argv: Vec<String>,
    /// Input redirection file, if any.
    pub infile: Option<String>,
    /// Output redirection file, if any. Created or truncated on use.
    pub outfile: Option<String>,
    /// Run without waiting for the child to finish.
    pub background: bool,
}

impl Command {
    /// Creates a new, empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// The program or built-in name, if the line named one.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a file name after '{0}'")]
    MissingRedirectTarget(&'static str),
    #[error("too many arguments (at most {0})")]
    TooManyArguments(usize),
}

/// Parses one line of input into a `Command`.
///
/// Returns `Ok(None)` for blank lines and for lines whose first character
/// is `#`; the caller should simply prompt again. Tokens are separated by
/// spaces and newlines only. `<` and `>` each consume the following token
/// as a file name, and a trailing `&` marks the command as a background job.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    if line.starts_with('#') || line.trim_matches(|c: char| c == ' ' || c == '\n').is_empty() {
        return Ok(None);
    }

    let mut cmd = Command::new();
    let mut tokens = tokenize(line);

    while let Some(token) = tokens.next() {
        match token {
            "<" => {
                let file = tokens.next().ok_or(ParseError::MissingRedirectTarget("<"))?;
                cmd.infile = Some(file.to_string());
            }
            ">" => {
                let file = tokens.next().ok_or(ParseError::MissingRedirectTarget(">"))?;
                cmd.outfile = Some(file.to_string());
            }
            _ => {
                if cmd.argv.len() >= MAX_ARGS {
                    return Err(ParseError::TooManyArguments(MAX_ARGS));
                }
                cmd.argv.push(token.to_string());
            }
        }
    }

    // Only the final argument can mark a background job.
    if cmd.argv.last().map(String::as_str) == Some("&") {
        cmd.argv.pop();
        cmd.background = true;
    }

    Ok(Some(cmd))
}

fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ' ' || c == '\n')
        .filter(|token| !token.is_empty())
}
