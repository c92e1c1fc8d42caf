use super::TransitionRecord;
use crate::error::{Result, StategateError};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Append-only text file of accepted transitions.
///
/// Unlike the in-memory audit log this file is never cleared.
pub struct TransitionJournal {
    file: File,
    path: PathBuf,
    lines_written: u64,
}

impl TransitionJournal {
    /// Open (or create) the journal at `path` for appending
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StategateError::system(format!(
                    "Failed to create journal directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                StategateError::system(format!(
                    "Failed to open journal {}: {}",
                    path.display(),
                    e
                ))
            })?;

        info!("Transition journal opened at {}", path.display());

        Ok(Self {
            file,
            path,
            lines_written: 0,
        })
    }

    /// Append one line for `record` and flush it
    pub async fn append(&mut self, record: &TransitionRecord) -> Result<()> {
        let line = format!("{}\n", record);
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        self.lines_written += 1;

        debug!("Journaled transition {}->{}", record.from, record.to);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines appended since this journal was opened
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}
