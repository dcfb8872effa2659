// lib.rs

pub mod commands;
pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod host;
pub mod logging;
pub mod parser;
pub mod repl;
pub mod replay;
pub mod store;
pub mod stroke;
pub mod util;

pub use commands::{Command, CommandTable};
pub use config::{Config, EngineOptions, MemoryMode, UndoPolicy};
pub use engine::{Dispatch, RepeatEngine};
pub use error::{ConfigError, StoreError};
pub use history::{History, MAX_HISTORY};
pub use host::SimulatedHost;
pub use replay::{ReplayGuard, ReplayPort};
pub use store::{HistoryStore, InMemoryStore, LineFileStore, MemoryStore};
pub use stroke::{RtfcreCodec, StrokeCodec, StrokeId};
