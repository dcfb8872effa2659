// commands.rs

use std::collections::HashMap;

use itertools::Itertools;

use crate::config::MemoryMode;
use crate::stroke::StrokeId;

/// Repeat strokes. The vowel cluster is a four-bit count:
/// A = 1, O = 2, E = 4, U = 8.
pub const REPEAT_STROKES: [(&str, u8); 15] = [
    ("RA*PT", 1),
    ("RO*PT", 2),
    ("RAO*PT", 3),
    ("R*EPT", 4),
    ("RA*EPT", 5),
    ("RO*EPT", 6),
    ("RAO*EPT", 7),
    ("R*UPT", 8),
    ("RA*UPT", 9),
    ("RO*UPT", 10),
    ("RAO*UPT", 11),
    ("R*EUPT", 12),
    ("RA*EUPT", 13),
    ("RO*EUPT", 14),
    ("RAO*EUPT", 15),
];

pub const MARK_STROKE: &str = "PHA*RBG";
pub const REPEAT_TO_MARK_STROKE: &str = "R*PL";
pub const MEMORY_TOGGLE_STROKE: &str = "PO*FP";
pub const MEMORY_PASTE_STROKE: &str = "SKWR*PL";
pub const MEMORY_RESET_STROKE: &str = "R*ET";
pub const UNDO_STROKE: &str = "*";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replay the last `n` history entries, `n` in 1..=15.
    RepeatN(u8),
    Mark,
    RepeatToMark,
    MemoryToggle,
    MemoryPaste,
    MemoryReset,
    Undo,
}

impl Command {
    /// Whether the host will have produced visible output for this stroke
    /// that must be retracted before anything else happens.
    pub fn retracts_own_output(self, mark_sends_undo: bool) -> bool {
        match self {
            Command::Undo => false,
            Command::Mark => mark_sends_undo,
            _ => true,
        }
    }
}

/// Reserved strokes and the command each one triggers.
#[derive(Clone, Debug)]
pub struct CommandTable {
    commands: HashMap<StrokeId, Command>,
}

impl CommandTable {
    /// The standard layout. `Combined` memory uses the toggle stroke alone;
    /// `Separate` also reserves the paste and reset strokes.
    pub fn for_mode(mode: MemoryMode) -> Self {
        let mut commands: HashMap<StrokeId, Command> = REPEAT_STROKES
            .iter()
            .map(|&(stroke, n)| (StrokeId::new(stroke), Command::RepeatN(n)))
            .collect();
        commands.insert(MARK_STROKE.into(), Command::Mark);
        commands.insert(REPEAT_TO_MARK_STROKE.into(), Command::RepeatToMark);
        commands.insert(MEMORY_TOGGLE_STROKE.into(), Command::MemoryToggle);
        commands.insert(UNDO_STROKE.into(), Command::Undo);
        if mode == MemoryMode::Separate {
            commands.insert(MEMORY_PASTE_STROKE.into(), Command::MemoryPaste);
            commands.insert(MEMORY_RESET_STROKE.into(), Command::MemoryReset);
        }
        Self { commands }
    }

    pub fn lookup(&self, stroke: &StrokeId) -> Option<Command> {
        self.commands.get(stroke).copied()
    }

    /// The stroke that asks the host to undo its last output.
    pub fn undo_stroke(&self) -> StrokeId {
        StrokeId::new(UNDO_STROKE)
    }

    /// Reserved strokes in a stable order, for completion and help text.
    pub fn reserved(&self) -> Vec<(&StrokeId, Command)> {
        self.commands
            .iter()
            .map(|(stroke, command)| (stroke, *command))
            .sorted_by(|a, b| a.0.cmp(b.0))
            .collect()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::for_mode(MemoryMode::default())
    }
}

/// Spell the repeat stroke for a count in 1..=15.
pub fn repeat_stroke_for(count: u8) -> Option<&'static str> {
    REPEAT_STROKES
        .iter()
        .find(|&&(_, n)| n == count)
        .map(|&(stroke, _)| stroke)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vowel_bits(stroke: &str) -> u8 {
        let mut count = 0;
        for (vowel, bit) in [('A', 1), ('O', 2), ('E', 4), ('U', 8)] {
            if stroke.contains(vowel) {
                count |= bit;
            }
        }
        count
    }

    #[test]
    fn repeat_counts_follow_the_vowel_bits() {
        for (stroke, n) in REPEAT_STROKES {
            assert_eq!(vowel_bits(stroke), n, "stroke {}", stroke);
        }
        let counts: Vec<u8> = REPEAT_STROKES.iter().map(|&(_, n)| n).collect();
        assert_eq!(counts, (1..=15).collect::<Vec<u8>>());
    }

    #[test]
    fn combined_mode_leaves_paste_and_reset_unreserved() {
        let table = CommandTable::for_mode(MemoryMode::Combined);
        assert_eq!(table.lookup(&"PO*FP".into()), Some(Command::MemoryToggle));
        assert_eq!(table.lookup(&"SKWR*PL".into()), None);
        assert_eq!(table.lookup(&"R*ET".into()), None);
        assert_eq!(table.lookup(&"KAT".into()), None);
    }

    #[test]
    fn separate_mode_reserves_all_memory_strokes() {
        let table = CommandTable::for_mode(MemoryMode::Separate);
        assert_eq!(table.lookup(&"SKWR*PL".into()), Some(Command::MemoryPaste));
        assert_eq!(table.lookup(&"R*ET".into()), Some(Command::MemoryReset));
        assert_eq!(table.lookup(&"*".into()), Some(Command::Undo));
        assert_eq!(table.lookup(&"RAO*EUPT".into()), Some(Command::RepeatN(15)));
        assert_eq!(table.reserved().len(), 15 + 6);
    }

    #[test]
    fn repeat_stroke_lookup() {
        assert_eq!(repeat_stroke_for(1), Some("RA*PT"));
        assert_eq!(repeat_stroke_for(12), Some("R*EUPT"));
        assert_eq!(repeat_stroke_for(0), None);
        assert_eq!(repeat_stroke_for(16), None);
    }

    #[test]
    fn only_undo_and_silent_mark_keep_their_output() {
        assert!(!Command::Undo.retracts_own_output(true));
        assert!(!Command::Mark.retracts_own_output(false));
        assert!(Command::Mark.retracts_own_output(true));
        assert!(Command::RepeatN(3).retracts_own_output(false));
        assert!(Command::MemoryToggle.retracts_own_output(false));
    }
}
