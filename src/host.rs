// host.rs

// Output is a list of stroke texts: the undo stroke removes the last one,
// anything else appends itself. The engine hook fires after the output
// changes, and replayed strokes take the same path.

use std::cell::RefCell;

use crate::engine::{Dispatch, RepeatEngine};
use crate::replay::ReplayPort;
use crate::store::{HistoryStore, MemoryStore};
use crate::stroke::{RtfcreCodec, StrokeCodec, StrokeId};

pub struct SimulatedHost<H, M, C = RtfcreCodec> {
    engine: RepeatEngine<H, M>,
    codec: C,
    output: RefCell<Vec<String>>,
    undo_stroke: StrokeId,
}

impl<H: HistoryStore, M: MemoryStore> SimulatedHost<H, M> {
    pub fn new(engine: RepeatEngine<H, M>) -> Self {
        Self::with_codec(engine, RtfcreCodec)
    }
}

impl<H, M, C> SimulatedHost<H, M, C>
where
    H: HistoryStore,
    M: MemoryStore,
    C: StrokeCodec,
{
    pub fn with_codec(engine: RepeatEngine<H, M>, codec: C) -> Self {
        let undo_stroke = engine.table().undo_stroke();
        Self {
            engine,
            codec,
            output: RefCell::new(Vec::new()),
            undo_stroke,
        }
    }

    /// Deliver one stroke in the host's own representation.
    pub fn receive(&self, raw: &C::Raw) -> Dispatch {
        let stroke = self.codec.decode(raw);
        self.deliver(&stroke)
    }

    fn deliver(&self, stroke: &StrokeId) -> Dispatch {
        {
            let mut output = self.output.borrow_mut();
            if *stroke == self.undo_stroke {
                output.pop();
            } else if !stroke.as_str().is_empty() {
                output.push(stroke.to_string());
            }
        }
        let mut port = HostPort { host: self };
        self.engine.handle(stroke, &mut port)
    }

    pub fn engine(&self) -> &RepeatEngine<H, M> {
        &self.engine
    }

    pub fn output(&self) -> Vec<String> {
        self.output.borrow().clone()
    }

    /// Output joined with spaces, as it would appear on screen.
    pub fn rendered(&self) -> String {
        self.output.borrow().join(" ")
    }

    pub fn clear_output(&self) {
        self.output.borrow_mut().clear();
    }
}

struct HostPort<'a, H, M, C> {
    host: &'a SimulatedHost<H, M, C>,
}

impl<H, M, C> ReplayPort for HostPort<'_, H, M, C>
where
    H: HistoryStore,
    M: MemoryStore,
    C: StrokeCodec,
{
    fn undo(&mut self) -> anyhow::Result<()> {
        let undo = self.host.undo_stroke.clone();
        self.host.deliver(&undo);
        Ok(())
    }

    fn emit(&mut self, stroke: &StrokeId) -> anyhow::Result<()> {
        let raw = self.host.codec.encode(stroke)?;
        self.host.receive(&raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineOptions;
    use crate::store::InMemoryStore;

    fn host() -> SimulatedHost<InMemoryStore, InMemoryStore> {
        let engine = RepeatEngine::new(
            EngineOptions::default(),
            InMemoryStore::new(),
            InMemoryStore::new(),
        );
        SimulatedHost::new(engine)
    }

    fn strike(host: &SimulatedHost<InMemoryStore, InMemoryStore>, strokes: &[&str]) {
        for s in strokes {
            host.receive(&s.to_string());
        }
    }

    #[test]
    fn plain_strokes_and_host_undo() {
        let host = host();
        strike(&host, &["KAT", "TPH", "*"]);
        assert_eq!(host.output(), vec!["KAT"]);
        assert_eq!(host.engine().history(), vec![StrokeId::new("KAT")]);
    }

    #[test]
    fn blank_input_does_not_break_a_later_repeat() {
        let host = host();
        strike(&host, &["KAT", "   ", "TPH"]);
        assert_eq!(host.engine().history(), vec![StrokeId::new("KAT"), StrokeId::new("TPH")]);
        host.clear_output();
        strike(&host, &["RO*PT"]);
        assert_eq!(host.output(), vec!["KAT", "TPH"]);
    }

    #[test]
    fn repeat_output_replaces_the_command_stroke() {
        let host = host();
        strike(&host, &["KAT", "TPH", "RO*PT"]);
        assert_eq!(host.rendered(), "KAT TPH KAT TPH");
        assert_eq!(host.engine().history().len(), 2);
    }
}
