// replay.rs

use std::cell::Cell;

use crate::stroke::StrokeId;

/// What the engine needs from the host to replay strokes.
///
/// Both calls may synchronously re-enter the engine's `handle`; the
/// engine's [`ReplayGuard`] is held around every call so such re-entrant
/// events are ignored.
pub trait ReplayPort {
    /// Retract the most recently produced output unit.
    fn undo(&mut self) -> anyhow::Result<()>;
    /// Inject `stroke` as if it had just been struck.
    fn emit(&mut self, stroke: &StrokeId) -> anyhow::Result<()>;
}

/// Marks the engine as replaying for as long as it is alive.
///
/// Released on drop, so an early return or a panic in the port still
/// clears the flag.
#[must_use = "the guard is released as soon as it is dropped"]
pub struct ReplayGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReplayGuard<'a> {
    /// Take the guard, or `None` if a replay is already in progress.
    pub fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = Cell::new(false);
        {
            let _guard = ReplayGuard::acquire(&flag).expect("first acquire");
            assert!(flag.get());
            assert!(ReplayGuard::acquire(&flag).is_none());
        }
        assert!(!flag.get());
        assert!(ReplayGuard::acquire(&flag).is_some());
    }

    #[test]
    fn guard_is_released_when_unwinding() {
        let flag = Cell::new(false);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ReplayGuard::acquire(&flag).expect("acquire");
            panic!("port blew up");
        }));
        assert!(result.is_err());
        assert!(!flag.get());
    }
}
