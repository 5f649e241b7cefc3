use std::path::PathBuf;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Load(PathBuf),
    History,
    Save(Option<PathBuf>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Command::Quit;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Command::Ask(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "load" if !arg.is_empty() => Command::Load(PathBuf::from(arg)),
            "history" => Command::History,
            "save" if arg.is_empty() => Command::Save(None),
            "save" => Command::Save(Some(PathBuf::from(arg))),
            "help" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
  <question>       ask about the loaded file
  :load <path>     load a CSV file (a different file starts a new conversation)
  :history         show the conversation so far
  :save [path]     save the latest answer (default: result.txt)
  :help            show this help
  :quit            leave";
