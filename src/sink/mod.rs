//! Call log sinks
//!
//! The capture middleware writes records through the [`CallLogSink`] trait
//! so the destination can be swapped: [`FileSink`] appends to the shared log
//! file, [`MemorySink`] collects entries in memory for tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::ApiCallLog;

/// Destination for formatted API call records
#[async_trait]
pub trait CallLogSink: Send + Sync {
    /// Reset the sink and write the startup header
    async fn init(&self) -> Result<()>;

    /// Append one completed call record
    async fn append(&self, entry: &ApiCallLog) -> Result<()>;
}

/// Append-only file sink
///
/// Each append opens the file, writes the whole rendered record and closes
/// it again; an internal mutex serializes writers so concurrent requests
/// never interleave partial records.
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CallLogSink for FileSink {
    async fn init(&self) -> Result<()> {
        let header = format!(
            "=== Friendo API Logs ===\nStarted: {}\n{}\n\n",
            Utc::now().to_rfc3339(),
            "=".repeat(50)
        );

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&self.path, header).await?;
        Ok(())
    }

    async fn append(&self, entry: &ApiCallLog) -> Result<()> {
        let record = entry.render();

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory sink, used by tests in place of the filesystem
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<ApiCallLog>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended entries
    pub async fn entries(&self) -> Vec<ApiCallLog> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl CallLogSink for MemorySink {
    async fn init(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn append(&self, entry: &ApiCallLog) -> Result<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(path: &str, status: u16) -> ApiCallLog {
        ApiCallLog {
            timestamp: Utc::now(),
            method: "GET".to_string(),
            path: path.to_string(),
            url: format!("http://localhost:8000{}", path),
            status,
            duration_ms: 1.0,
            request_body: None,
            response_body: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_sink_init_truncates_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-logs.txt");
        let sink = FileSink::new(&path);

        sink.append(&entry("/tasks", 200)).await.unwrap();
        sink.init().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("=== Friendo API Logs ===\nStarted: "));
        assert!(contents.ends_with(&format!("{}\n\n", "=".repeat(50))));
        assert!(!contents.contains("/tasks"));
    }

    #[tokio::test]
    async fn test_file_sink_appends_after_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-logs.txt");
        let sink = FileSink::new(&path);

        sink.init().await.unwrap();
        sink.append(&entry("/tasks", 200)).await.unwrap();
        sink.append(&entry("/energy", 201)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let tasks_at = contents.find("GET /tasks").unwrap();
        let energy_at = contents.find("GET /energy").unwrap();
        assert!(tasks_at < energy_at);
        assert_eq!(contents.matches(&"─".repeat(50)).count(), 2);
    }

    #[tokio::test]
    async fn test_file_sink_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-logs.txt");
        let sink = Arc::new(FileSink::new(&path));
        sink.init().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.append(&entry(&format!("/tasks/{}", i), 200))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let records: Vec<&str> = contents
            .split(&format!("{}\n\n", "─".repeat(50)))
            .filter(|block| block.contains("GET /tasks/"))
            .collect();
        assert_eq!(records.len(), 16);
        for record in records {
            // Every record kept its full shape
            assert!(record.contains("Full URL: "));
            assert!(record.contains("Status: 200"));
            assert!(record.contains("Response:\n{}"));
        }
    }

    #[tokio::test]
    async fn test_memory_sink_collects_entries() {
        let sink = MemorySink::new();
        sink.append(&entry("/users", 200)).await.unwrap();
        sink.append(&entry("/tasks", 404)).await.unwrap();

        let entries = sink.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/users");
        assert_eq!(entries[1].status, 404);

        sink.init().await.unwrap();
        assert!(sink.entries().await.is_empty());
    }
}
