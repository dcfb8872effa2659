// parser.rs

/// Split a typed line into strokes. Strokes are separated by whitespace or
/// by `/`, the usual outline separator, so `KAT/-S TPH` yields three strokes.
/// A lone `/` run produces nothing; empty pieces are dropped.
pub fn split_strokes(line: &str) -> Vec<String> {
    line.split(|c: char| c.is_whitespace() || c == '/')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Meta-commands typed at the prompt start with `:` and are never strokes.
pub fn meta_command(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix(':').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_slash_and_whitespace() {
        assert_eq!(split_strokes("KAT/-S  TPH\tRA*PT"), ["KAT", "-S", "TPH", "RA*PT"]);
    }

    #[test]
    fn undo_star_survives_splitting() {
        assert_eq!(split_strokes("*"), ["*"]);
        assert!(split_strokes(" // ").is_empty());
    }

    #[test]
    fn meta_commands_are_recognised() {
        assert_eq!(meta_command(" :history "), Some("history"));
        assert_eq!(meta_command("KAT"), None);
    }
}
