// store.rs

// One stroke per line, UTF-8, no escaping. History is rewritten in full;
// memory grows by appending while recording.

use std::cell::{Cell, RefCell};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::StoreError;
use crate::stroke::StrokeId;

pub trait HistoryStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError>;
    fn save(&self, strokes: &[StrokeId]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError> {
        self.save(&[])
    }
}

pub trait MemoryStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError>;
    fn append(&self, stroke: &StrokeId) -> Result<(), StoreError>;
    /// Overwrite the stored memory with `strokes`.
    fn replace(&self, strokes: &[StrokeId]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError> {
        self.replace(&[])
    }
}

impl<T: HistoryStore + ?Sized> HistoryStore for Rc<T> {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        (**self).load()
    }
    fn save(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        (**self).save(strokes)
    }
    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

impl<T: MemoryStore + ?Sized> MemoryStore for Rc<T> {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        (**self).load()
    }
    fn append(&self, stroke: &StrokeId) -> Result<(), StoreError> {
        (**self).append(stroke)
    }
    fn replace(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        (**self).replace(strokes)
    }
    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// A plain text file holding one stroke per line.
#[derive(Debug, Clone)]
pub struct LineFileStore {
    path: PathBuf,
}

impl LineFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_lines(&self) -> Result<Vec<StrokeId>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let mut strokes = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            let stroke = line.trim();
            if !stroke.is_empty() {
                strokes.push(StrokeId::new(stroke));
            }
        }
        Ok(strokes)
    }

    fn write_all(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        let write = || -> io::Result<()> {
            let mut out = BufWriter::new(File::create(&self.path)?);
            for stroke in strokes {
                writeln!(out, "{}", stroke)?;
            }
            out.flush()
        };
        write().map_err(|e| StoreError::io(&self.path, e))
    }
}

impl HistoryStore for LineFileStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        self.read_lines()
    }

    fn save(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        self.write_all(strokes)
    }
}

impl MemoryStore for LineFileStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        self.read_lines()
    }

    fn append(&self, stroke: &StrokeId) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        writeln!(file, "{}", stroke).map_err(|e| StoreError::io(&self.path, e))
    }

    fn replace(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        self.write_all(strokes)
    }
}

/// Create the directory that holds the state files.
pub fn ensure_state_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
}

/// Store kept entirely in memory. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    strokes: RefCell<Vec<StrokeId>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strokes<I, S>(strokes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StrokeId>,
    {
        let store = Self::new();
        *store.strokes.borrow_mut() = strokes.into_iter().map(Into::into).collect();
        store
    }

    pub fn contents(&self) -> Vec<StrokeId> {
        self.strokes.borrow().clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl HistoryStore for InMemoryStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        Ok(self.contents())
    }

    fn save(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.strokes.borrow_mut() = strokes.to_vec();
        Ok(())
    }
}

impl MemoryStore for InMemoryStore {
    fn load(&self) -> Result<Vec<StrokeId>, StoreError> {
        Ok(self.contents())
    }

    fn append(&self, stroke: &StrokeId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.strokes.borrow_mut().push(stroke.clone());
        Ok(())
    }

    fn replace(&self, strokes: &[StrokeId]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.strokes.borrow_mut() = strokes.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_HISTORY;

    fn numbered(n: usize) -> Vec<StrokeId> {
        (0..n).map(|i| StrokeId::new(format!("S{}", i))).collect()
    }

    #[test]
    fn history_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LineFileStore::new(dir.path().join("history.txt"));
        for len in [0, 1, MAX_HISTORY] {
            let strokes = numbered(len);
            HistoryStore::save(&store, &strokes).expect("save");
            assert_eq!(HistoryStore::load(&store).expect("load"), strokes, "len {}", len);
        }
    }

    #[test]
    fn file_layout_is_one_stroke_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.txt");
        let store = LineFileStore::new(&path);
        HistoryStore::save(&store, &[StrokeId::new("KAT"), StrokeId::new("RA*PT")]).expect("save");
        assert_eq!(fs::read_to_string(&path).expect("read"), "KAT\nRA*PT\n");
    }

    #[test]
    fn missing_file_loads_empty_and_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("memory.txt");
        let store = LineFileStore::new(&path);
        assert!(MemoryStore::load(&store).expect("load").is_empty());

        fs::write(&path, "KAT\n\n  TPH  \n\n").expect("write");
        assert_eq!(
            MemoryStore::load(&store).expect("load"),
            vec![StrokeId::new("KAT"), StrokeId::new("TPH")]
        );
    }

    #[test]
    fn memory_appends_then_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LineFileStore::new(dir.path().join("memory.txt"));
        store.append(&StrokeId::new("A")).expect("append");
        store.append(&StrokeId::new("B")).expect("append");
        assert_eq!(MemoryStore::load(&store).expect("load"), ids(&["A", "B"]));
        MemoryStore::clear(&store).expect("clear");
        assert!(MemoryStore::load(&store).expect("load").is_empty());
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LineFileStore::new(dir.path().join("missing").join("history.txt"));
        let err = HistoryStore::save(&store, &numbered(1)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "{err}");
    }

    #[test]
    fn in_memory_store_can_refuse_writes() {
        let store = InMemoryStore::with_strokes(["A"]);
        store.set_fail_writes(true);
        assert!(HistoryStore::save(&store, &[]).is_err());
        assert_eq!(store.contents(), ids(&["A"]));
        store.set_fail_writes(false);
        HistoryStore::save(&store, &[]).expect("save");
        assert!(store.contents().is_empty());
        assert_eq!(store.writes(), 1);
    }

    fn ids(names: &[&str]) -> Vec<StrokeId> {
        names.iter().map(|s| StrokeId::new(*s)).collect()
    }
}
