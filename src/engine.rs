// engine.rs

// Replaying strokes calls back into the host, which calls `handle` again for
// every injected stroke. Those nested calls are dropped by the replay guard,
// and `state` is never borrowed while the port is being driven.

use std::cell::{Cell, RefCell};

use tracing::{debug, info, trace, warn};

use crate::commands::{Command, CommandTable};
use crate::config::{EngineOptions, MemoryMode};
use crate::error::StoreError;
use crate::history::History;
use crate::replay::{ReplayGuard, ReplayPort};
use crate::store::{HistoryStore, MemoryStore};
use crate::stroke::StrokeId;

/// What `handle` did with a stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Arrived while a replay was running, or was blank, and was ignored.
    Suppressed,
    /// Ordinary stroke, appended to history (and memory when recording).
    Recorded,
    /// Reserved stroke, interpreted as a command.
    Command(Command),
}

#[derive(Debug)]
struct EngineState {
    history: History,
    mark: Option<usize>,
    recording: bool,
    memory: Vec<StrokeId>,
    /// The memory file missed a write and must be rewritten in full.
    memory_dirty: bool,
}

pub struct RepeatEngine<H, M> {
    options: EngineOptions,
    table: CommandTable,
    history_store: H,
    memory_store: M,
    state: RefCell<EngineState>,
    replaying: Cell<bool>,
}

impl<H: HistoryStore, M: MemoryStore> RepeatEngine<H, M> {
    pub fn new(options: EngineOptions, history_store: H, memory_store: M) -> Self {
        let table = CommandTable::for_mode(options.memory_mode);
        let state = EngineState {
            history: History::new(options.max_history),
            mark: None,
            recording: false,
            memory: Vec::new(),
            memory_dirty: false,
        };
        Self {
            options,
            table,
            history_store,
            memory_store,
            state: RefCell::new(state),
            replaying: Cell::new(false),
        }
    }

    /// Hydrate history and memory from the stores.
    ///
    /// History is read before the history file is wiped, so prior content
    /// survives in memory and is written back on the next save.
    pub fn start(&self) {
        info!("=== repeat engine started ===");
        let loaded = self.history_store.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load history");
            Vec::new()
        });
        if self.options.clear_history_on_start {
            match self.history_store.clear() {
                Ok(()) => debug!("cleared history file on startup"),
                Err(e) => warn!(error = %e, "failed to clear history file"),
            }
        }
        let memory = self.memory_store.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load memory");
            Vec::new()
        });

        let mut state = self.state.borrow_mut();
        state.history = History::hydrate(self.options.max_history, loaded);
        state.memory = memory;
        state.mark = None;
        state.recording = false;
        state.memory_dirty = false;
        info!(
            history = state.history.len(),
            memory = state.memory.len(),
            "loaded stroke state"
        );
    }

    /// Flush history one last time.
    pub fn stop(&self) {
        info!("=== repeat engine stopped ===");
        let mut state = self.state.borrow_mut();
        self.save_history(&mut state.history);
    }

    /// Process one stroke observed by the host.
    pub fn handle<P: ReplayPort + ?Sized>(&self, stroke: &StrokeId, port: &mut P) -> Dispatch {
        if self.replaying.get() {
            trace!(stroke = %stroke, "ignoring stroke produced by replay");
            return Dispatch::Suppressed;
        }
        debug!(stroke = %stroke, "received stroke");
        if stroke.as_str().trim().is_empty() {
            debug!("ignoring blank stroke");
            return Dispatch::Suppressed;
        }

        let Some(command) = self.table.lookup(stroke) else {
            self.record(stroke);
            return Dispatch::Recorded;
        };
        debug!(stroke = %stroke, ?command, "command stroke");

        match command {
            Command::RepeatN(n) => self.repeat_last(port, usize::from(n)),
            Command::Mark => self.set_mark(port),
            Command::RepeatToMark => self.repeat_to_mark(port),
            Command::Undo => self.undo_history(),
            Command::MemoryToggle => match self.options.memory_mode {
                MemoryMode::Combined => self.memory_cycle(port),
                MemoryMode::Separate => self.memory_toggle(port),
            },
            Command::MemoryPaste => self.memory_paste(port),
            Command::MemoryReset => self.memory_reset(port),
        }
        Dispatch::Command(command)
    }

    fn record(&self, stroke: &StrokeId) {
        let state = &mut *self.state.borrow_mut();
        if state.recording {
            state.memory.push(stroke.clone());
            self.persist_memory_append(state, stroke);
            debug!(stroke = %stroke, len = state.memory.len(), "stroke saved to memory");
        }
        if let Some(evicted) = state.history.push(stroke.clone()) {
            trace!(stroke = %evicted, "evicted oldest stroke");
        }
        self.save_history(&mut state.history);
        debug!(len = state.history.len(), "stroke added to history");
    }

    fn repeat_last<P: ReplayPort + ?Sized>(&self, port: &mut P, n: usize) {
        let batch = self.state.borrow().history.last_n(n);
        match batch {
            Some(strokes) => {
                debug!(count = n, "repeating last strokes");
                self.replay(port, &strokes);
            }
            None => {
                debug!(
                    count = n,
                    len = self.state.borrow().history.len(),
                    "not enough history to repeat"
                );
                self.replay(port, &[]);
            }
        }
    }

    fn set_mark<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        if Command::Mark.retracts_own_output(self.options.mark_sends_undo) {
            self.replay(port, &[]);
        }
        let mut state = self.state.borrow_mut();
        let position = state.history.len();
        state.mark = Some(position);
        debug!(position, "mark set");
    }

    fn repeat_to_mark<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        let batch = {
            let state = self.state.borrow();
            state.mark.and_then(|mark| state.history.since(mark))
        };
        match batch {
            Some(strokes) => {
                debug!(count = strokes.len(), "repeating strokes since mark");
                self.replay(port, &strokes);
            }
            None => {
                debug!(mark = ?self.state.borrow().mark, "mark unset or out of range");
                self.replay(port, &[]);
            }
        }
    }

    fn undo_history(&self) {
        let state = &mut *self.state.borrow_mut();
        let mut removed = 0;
        for _ in 0..self.options.undo_policy.pops() {
            match state.history.pop() {
                Some(stroke) => {
                    debug!(stroke = %stroke, "removed stroke from history due to undo");
                    removed += 1;
                }
                None => break,
            }
        }
        if removed > 0 {
            self.save_history(&mut state.history);
        } else {
            debug!("undo on empty history");
        }
    }

    fn memory_cycle<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        let recorded = {
            let state = self.state.borrow();
            (!state.memory.is_empty()).then(|| state.memory.clone())
        };
        match recorded {
            None => {
                self.replay(port, &[]);
                self.state.borrow_mut().recording = true;
                info!("started recording to memory");
            }
            Some(strokes) => {
                debug!(count = strokes.len(), "playing back memory");
                if !self.replay(port, &strokes) {
                    warn!("memory playback failed; keeping memory");
                    return;
                }
                let state = &mut *self.state.borrow_mut();
                state.memory.clear();
                state.recording = false;
                self.persist_memory_replace(state);
                info!("memory played back and cleared");
            }
        }
    }

    fn memory_toggle<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        self.replay(port, &[]);
        let mut state = self.state.borrow_mut();
        state.recording = !state.recording;
        if state.recording {
            info!("started recording to memory");
        } else {
            info!("stopped recording to memory");
        }
    }

    fn memory_paste<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        let strokes = self.state.borrow().memory.clone();
        debug!(count = strokes.len(), "pasting memory");
        self.replay(port, &strokes);
    }

    fn memory_reset<P: ReplayPort + ?Sized>(&self, port: &mut P) {
        self.replay(port, &[]);
        let state = &mut *self.state.borrow_mut();
        state.memory.clear();
        state.recording = false;
        self.persist_memory_replace(state);
        info!("memory cleared and recording stopped");
    }

    /// Retract the command stroke, then inject `strokes` in order, all under
    /// the replay guard. The first port failure abandons the rest of the
    /// batch. Returns whether every port call succeeded.
    fn replay<P: ReplayPort + ?Sized>(&self, port: &mut P, strokes: &[StrokeId]) -> bool {
        let Some(_guard) = ReplayGuard::acquire(&self.replaying) else {
            warn!("replay requested while already replaying");
            return false;
        };
        if let Err(e) = port.undo() {
            warn!(error = %e, "error sending undo; replay abandoned");
            return false;
        }
        debug!("undo sent");
        for (i, stroke) in strokes.iter().enumerate() {
            if let Err(e) = port.emit(stroke) {
                warn!(
                    error = %e,
                    stroke = %stroke,
                    done = i,
                    total = strokes.len(),
                    "error replaying strokes; rest of batch dropped"
                );
                return false;
            }
            trace!(stroke = %stroke, "replayed stroke");
        }
        if !strokes.is_empty() {
            debug!(count = strokes.len(), "replay finished");
        }
        true
    }

    fn save_history(&self, history: &mut History) {
        let len = history.len();
        match self.history_store.save(history.make_contiguous()) {
            Ok(()) => trace!(len, "saved history"),
            Err(e) => warn!(error = %e, "error saving history"),
        }
    }

    fn persist_memory_append(&self, state: &mut EngineState, stroke: &StrokeId) {
        let result = if state.memory_dirty {
            self.memory_store.replace(&state.memory)
        } else {
            self.memory_store.append(stroke)
        };
        self.note_memory_write(state, result);
    }

    fn persist_memory_replace(&self, state: &mut EngineState) {
        let result = self.memory_store.replace(&state.memory);
        self.note_memory_write(state, result);
    }

    fn note_memory_write(&self, state: &mut EngineState, result: Result<(), StoreError>) {
        match result {
            Ok(()) => state.memory_dirty = false,
            Err(e) => {
                warn!(error = %e, "error saving memory; will rewrite on next change");
                state.memory_dirty = true;
            }
        }
    }

    pub fn history(&self) -> Vec<StrokeId> {
        self.state.borrow().history.iter().cloned().collect()
    }

    pub fn memory(&self) -> Vec<StrokeId> {
        self.state.borrow().memory.clone()
    }

    pub fn mark(&self) -> Option<usize> {
        self.state.borrow().mark
    }

    pub fn is_recording(&self) -> bool {
        self.state.borrow().recording
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying.get()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }
}
