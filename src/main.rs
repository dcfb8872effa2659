use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use steno_repeat::config::checked_max_history;
use steno_repeat::store::ensure_state_dir;
use steno_repeat::{
    logging, repl, Config, ConfigError, LineFileStore, MemoryMode, RepeatEngine, SimulatedHost,
    UndoPolicy,
};

/// Try out the repeat commands on typed strokes.
#[derive(Parser, Debug)]
#[command(name = "steno-repeat", version)]
struct Args {
    /// Directory holding history, memory and the debug log.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[arg(long)]
    max_history: Option<usize>,

    /// `combined` or `separate`.
    #[arg(long)]
    memory_mode: Option<MemoryMode>,

    /// `single` or `double`.
    #[arg(long)]
    undo_policy: Option<UndoPolicy>,

    /// Do not write the debug log.
    #[arg(long)]
    no_debug_log: bool,

    /// Leave the history file alone at startup.
    #[arg(long)]
    keep_history_file: bool,
}

impl Args {
    fn apply(self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(dir) = self.state_dir {
            config.state_dir = dir;
        }
        if let Some(max) = self.max_history {
            config.options.max_history = checked_max_history("--max-history", max)?;
        }
        if let Some(mode) = self.memory_mode {
            config.options.memory_mode = mode;
        }
        if let Some(policy) = self.undo_policy {
            config.options.undo_policy = policy;
        }
        if self.no_debug_log {
            config.debug_log = false;
        }
        if self.keep_history_file {
            config.options.clear_history_on_start = false;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    args.apply(&mut config)?;

    ensure_state_dir(&config.state_dir).context("creating state directory")?;
    if config.debug_log {
        if let Err(e) = logging::init(&config.debug_log_path()) {
            eprintln!("debug log disabled: {e:#}");
        }
    }

    let engine = RepeatEngine::new(
        config.options.clone(),
        LineFileStore::new(config.history_path()),
        LineFileStore::new(config.memory_path()),
    );
    engine.start();
    let host = SimulatedHost::new(engine);
    let result = repl::start_repl(&host);
    host.engine().stop();
    result
}
