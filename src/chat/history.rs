//! Append-only chat history persisted as a JSON array.
//!
//! The whole array is rewritten on every append, through a temporary file
//! and a rename, so a crash mid-write leaves the previous history intact.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::message::ChatMessage;
use crate::error::AppError;

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<ChatMessage>,
}

impl HistoryStore {
    /// Load history from `path`.
    ///
    /// A missing file is an empty history. So is an unreadable or malformed
    /// one (logged), so a corrupt file never blocks the client.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Vec<ChatMessage>>(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed history file, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read history file, starting empty");
                Vec::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "history loaded");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `message` and persist the full history.
    ///
    /// On a failed write the entry is dropped again, so memory never holds
    /// records the file does not.
    pub fn append(&mut self, message: ChatMessage) -> Result<(), AppError> {
        self.entries.push(message);
        if let Err(e) = self.save() {
            self.entries.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Delete the file, then drop all entries. A failed delete keeps both.
    pub fn clear(&mut self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::History(format!("cannot remove {}: {e}", self.path.display()))),
        }
        self.entries.clear();
        Ok(())
    }

    fn save(&self) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| AppError::History(format!("cannot create {}: {e}", dir.display())))?;
        }
        let data = serde_json::to_string(&self.entries)
            .map_err(|e| AppError::History(format!("serialise history: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .map_err(|e| AppError::History(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::History(format!("cannot write {}: {e}", self.path.display())))
    }
}
