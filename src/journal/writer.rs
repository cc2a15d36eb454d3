use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::api::health::HealthState;
use crate::config::CHANNEL_CAPACITY;
use crate::error::Result;
use crate::journal::models::PredictionLogEntry;

/// Request-side handle to the journal. Cloned into every handler.
#[derive(Clone)]
pub struct JournalHandle {
    tx: mpsc::Sender<PredictionLogEntry>,
    health: Arc<HealthState>,
}

impl JournalHandle {
    /// Queue an entry for the writer. Never blocks; a full queue drops the entry.
    pub fn record(&self, entry: PredictionLogEntry) {
        self.health.inc_journal_queue_pending();
        if let Err(e) = self.tx.try_send(entry) {
            self.health.dec_journal_queue_pending();
            warn!("Journal channel unavailable, dropping entry: {e}");
        }
    }
}

/// Start the writer task for `path`. The task exits once every handle is dropped.
pub fn spawn_journal(path: PathBuf, health: Arc<HealthState>) -> (JournalHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let writer = JournalWriter::new(path, rx, Arc::clone(&health));
    let task = tokio::spawn(async move { writer.run().await });
    (JournalHandle { tx, health }, task)
}

/// Appends journal entries as JSON lines. Runs as a dedicated background task
/// so request handlers never wait on disk.
pub struct JournalWriter {
    path: PathBuf,
    rx: mpsc::Receiver<PredictionLogEntry>,
    health: Arc<HealthState>,
    file: Option<File>,
}

impl JournalWriter {
    pub fn new(
        path: PathBuf,
        rx: mpsc::Receiver<PredictionLogEntry>,
        health: Arc<HealthState>,
    ) -> Self {
        Self { path, rx, health, file: None }
    }

    pub async fn run(mut self) {
        while let Some(entry) = self.rx.recv().await {
            if let Err(e) = self.append(&entry).await {
                error!(path = %self.path.display(), "Journal write error: {e}");
                // reopen on the next entry
                self.file = None;
            }
            self.health.dec_journal_queue_pending();
        }
    }

    /// Write one entry as a single line with a single append.
    async fn append(&mut self, entry: &PredictionLogEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            self.file = Some(file);
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(&line).await?;
            file.flush().await?;
        }
        Ok(())
    }
}
