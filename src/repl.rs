// repl.rs

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};

use crate::completion::StrokeCompleter;
use crate::engine::Dispatch;
use crate::host::SimulatedHost;
use crate::parser::{meta_command, split_strokes};
use crate::store::{HistoryStore, MemoryStore};
use crate::util::say;

const HELP: &str = "\
Type strokes separated by spaces or '/'. The line shows what the host would
have output afterwards. Meta-commands:
  :history   numbered stroke history
  :memory    strokes recorded in memory
  :output    current output
  :status    mark, recording state and options
  :clear     forget the current output
  :help      this text
  :quit      leave";

pub fn start_repl<H: HistoryStore, M: MemoryStore>(host: &SimulatedHost<H, M>) -> anyhow::Result<()> {
    let config = Config::builder().completion_type(CompletionType::List).build();
    let mut rl: Editor<StrokeCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(StrokeCompleter::new(host.engine().table())));
    loop {
        match rl.readline("steno> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if let Some(meta) = meta_command(trimmed) {
                    if !run_meta(meta, host) {
                        break;
                    }
                    continue;
                }
                for stroke in split_strokes(trimmed) {
                    if let Dispatch::Command(command) = host.receive(&stroke) {
                        say(format!("  [{}: {:?}]", stroke, command));
                    }
                }
                say(host.rendered());
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Run a meta-command; returns `false` when the loop should end.
fn run_meta<H: HistoryStore, M: MemoryStore>(meta: &str, host: &SimulatedHost<H, M>) -> bool {
    let engine = host.engine();
    match meta {
        "quit" | "q" | "exit" => return false,
        "history" => {
            for (i, stroke) in engine.history().iter().enumerate() {
                say(format!("{:>5}  {}", i + 1, stroke));
            }
        }
        "memory" => {
            for (i, stroke) in engine.memory().iter().enumerate() {
                say(format!("{:>5}  {}", i + 1, stroke));
            }
        }
        "output" => say(host.rendered()),
        "clear" => host.clear_output(),
        "status" => {
            let options = engine.options();
            say(format!(
                "history {}/{}  mark {}  recording {}  memory {}",
                engine.history().len(),
                options.max_history,
                engine.mark().map_or_else(|| "-".to_string(), |m| m.to_string()),
                if engine.is_recording() { "on" } else { "off" },
                engine.memory().len(),
            ));
            say(format!(
                "memory mode {}  undo policy {}  mark undo {}",
                options.memory_mode, options.undo_policy, options.mark_sends_undo
            ));
        }
        "help" => say(HELP),
        other => say(format!("{}: unknown meta-command (try :help)", other)),
    }
    true
}
