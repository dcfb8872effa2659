// completion.rs

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::CommandTable;

pub const META_COMMANDS: [&str; 7] = [
    ":history", ":memory", ":output", ":status", ":clear", ":help", ":quit",
];

/// Completes reserved strokes and meta-commands for the word under the
/// cursor.
pub struct StrokeCompleter {
    names: Vec<String>,
}

impl StrokeCompleter {
    pub fn new(table: &CommandTable) -> Self {
        let mut names: Vec<String> = table
            .reserved()
            .into_iter()
            .map(|(stroke, _)| stroke.to_string())
            .collect();
        names.extend(META_COMMANDS.iter().map(|m| m.to_string()));
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Candidates starting with `prefix`; an empty prefix matches nothing.
    pub fn candidates(&self, prefix: &str) -> Vec<&str> {
        if prefix.is_empty() {
            return Vec::new();
        }
        self.names
            .iter()
            .filter(|n| n.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl Completer for StrokeCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let head = &line[..pos];
        let start = head
            .rfind(|c: char| c.is_whitespace() || c == '/')
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &head[start..];
        let completions = self
            .candidates(prefix)
            .into_iter()
            .map(|n| Pair {
                display: n.to_string(),
                replacement: format!("{} ", n),
            })
            .collect();
        Ok((start, completions))
    }
}

impl Hinter for StrokeCompleter {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for StrokeCompleter {}

impl Validator for StrokeCompleter {}

impl Helper for StrokeCompleter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryMode;

    #[test]
    fn completes_reserved_strokes_and_meta_commands() {
        let completer = StrokeCompleter::new(&CommandTable::for_mode(MemoryMode::Separate));
        assert_eq!(completer.candidates("RAO*"), ["RAO*EPT", "RAO*EUPT", "RAO*PT", "RAO*UPT"]);
        assert_eq!(completer.candidates(":h"), [":help", ":history"]);
        assert_eq!(completer.candidates("SKWR"), ["SKWR*PL"]);
        assert!(completer.candidates("").is_empty());
    }

    #[test]
    fn combined_mode_does_not_offer_paste() {
        let completer = StrokeCompleter::new(&CommandTable::for_mode(MemoryMode::Combined));
        assert!(completer.candidates("SKWR").is_empty());
    }
}
