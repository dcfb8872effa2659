// util.rs

use std::io::Write;

pub fn writeln_ignore_broken_pipe<W: Write, S: AsRef<str>>(mut w: W, s: S) -> std::io::Result<()> {
    match writeln!(w, "{}", s.as_ref()) {
        Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Print a line to stdout, dropping the output if the reader went away.
pub fn say<S: AsRef<str>>(s: S) {
    let _ = writeln_ignore_broken_pipe(std::io::stdout(), s);
    let _ = std::io::stdout().flush();
}
