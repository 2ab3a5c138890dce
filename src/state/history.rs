use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::StateError;

/// In-memory command history with a fixed capacity
/// When full, the oldest entry is evicted to make room for the newest one
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends an entry, evicting from the front if the history is full
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry.into());
    }

    /// Seeds the history with previously saved entries, keeping only the newest ones that fit
    pub fn extend(&mut self, entries: impl IntoIterator<Item = String>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &String> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// Persistent history storage: one entry per line, no escaping
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all saved entries; a missing file is an empty history, not an error
    pub fn load(&self) -> Result<Vec<String>, StateError> {
        match fs_err::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StateError::FailedToLoadHistory(e)),
        }
    }

    /// Overwrites the history file with the given entries
    pub fn save(&self, entries: &[String]) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent).map_err(StateError::FailedToSaveHistory)?;
            }
        }

        let mut contents = Vec::new();
        for entry in entries {
            writeln!(contents, "{}", entry).map_err(StateError::FailedToSaveHistory)?;
        }

        fs_err::write(&self.path, contents).map_err(StateError::FailedToSaveHistory)
    }
}
