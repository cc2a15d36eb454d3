use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::journal::models::PredictionLogEntry;

/// The last `limit` journal entries in file order. A missing journal reads as
/// empty; lines that do not parse are skipped.
pub async fn read_recent(path: &Path, limit: usize) -> Result<Vec<PredictionLogEntry>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut skipped = 0usize;
    let entries: Vec<PredictionLogEntry> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped unreadable journal lines");
    }

    let start = entries.len().saturating_sub(limit);
    Ok(entries[start..].to_vec())
}
