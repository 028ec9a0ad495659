use std::fmt;
use std::path::PathBuf;

/// One line of user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    File(PathBuf),
    Url(String),
    Select(usize),
    Next,
    Prev,
    Finish,
    Share,
    Reset,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidOption { raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or `help`"),
            CommandError::Unknown(word) => write!(f, "unknown command: {word}"),
            CommandError::MissingArgument { command } => write!(f, "{command} requires an argument"),
            CommandError::InvalidOption { raw } => {
                write!(f, "invalid option `{raw}`; use a letter (A, B, ...) or a number from 1")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "file" | "open" => argument(rest, "file").map(|path| Command::File(PathBuf::from(path))),
            "url" => argument(rest, "url").map(|url| Command::Url(url.to_string())),
            "select" | "s" => parse_option(argument(rest, "select")?).map(Command::Select),
            "next" | "n" => Ok(Command::Next),
            "prev" | "p" => Ok(Command::Prev),
            "finish" => Ok(Command::Finish),
            "share" => Ok(Command::Share),
            "reset" => Ok(Command::Reset),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn argument<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest)
    }
}

/// `A`..`Z` (any case) or a 1-based number, as a 0-based option index.
fn parse_option(raw: &str) -> Result<usize, CommandError> {
    let invalid = || CommandError::InvalidOption {
        raw: raw.to_string(),
    };
    let mut chars = raw.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() {
            return Ok(usize::from(letter.to_ascii_uppercase() as u8 - b'A'));
        }
    }
    match raw.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(invalid()),
    }
}

pub const HELP: &str = "\
commands:
  file <path>     load a .docx file
  url <link>      load a .docx document from a link
  select <A|n>    answer the current question (letter or 1-based number)
  next / prev     move between questions
  finish          submit the quiz
  share           print a link that reopens this quiz
  reset           discard the quiz and start over
  show            print the current view
  quit            exit";
