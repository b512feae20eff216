//! Verification history
//!
//! The newest verification comes first and the list is capped, so the
//! oldest entries drop off once the store is full.

use crate::error::VerifyResult;
use crate::verifier::Verification;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Entries kept before the oldest are dropped
pub const MAX_HISTORY_ENTRIES: usize = 50;

pub trait HistoryStore: Send {
    fn save(&mut self, verification: Verification) -> VerifyResult<()>;
    /// Newest first
    fn list(&self) -> Vec<Verification>;
    fn clear(&mut self) -> VerifyResult<()>;
}

fn push_capped(entries: &mut VecDeque<Verification>, verification: Verification, cap: usize) {
    entries.push_front(verification);
    entries.truncate(cap);
}

/// History kept only for the lifetime of the process
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: VecDeque<Verification>,
    cap: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    pub fn with_capacity(cap: usize) -> Self {
        MemoryHistory {
            entries: VecDeque::new(),
            cap,
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistory {
    fn save(&mut self, verification: Verification) -> VerifyResult<()> {
        push_capped(&mut self.entries, verification, self.cap);
        Ok(())
    }

    fn list(&self) -> Vec<Verification> {
        self.entries.iter().cloned().collect()
    }

    fn clear(&mut self) -> VerifyResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// History stored as a JSON array in a single file.
///
/// Every write rewrites the whole file. A file that cannot be parsed is
/// treated as empty and replaced on the next write.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
    entries: VecDeque<Verification>,
    cap: usize,
}

impl FileHistory {
    pub fn open(path: impl Into<PathBuf>) -> VerifyResult<Self> {
        let path = path.into();
        let mut entries: VecDeque<Verification> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable history in {}: {}", path.display(), e);
                VecDeque::new()
            })
        } else {
            VecDeque::new()
        };
        entries.truncate(MAX_HISTORY_ENTRIES);
        Ok(FileHistory {
            path,
            entries,
            cap: MAX_HISTORY_ENTRIES,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> VerifyResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl HistoryStore for FileHistory {
    fn save(&mut self, verification: Verification) -> VerifyResult<()> {
        push_capped(&mut self.entries, verification, self.cap);
        self.persist()
    }

    fn list(&self) -> Vec<Verification> {
        self.entries.iter().cloned().collect()
    }

    fn clear(&mut self) -> VerifyResult<()> {
        self.entries.clear();
        self.persist()
    }
}
