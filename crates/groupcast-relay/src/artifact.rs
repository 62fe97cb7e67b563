// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary on-disk artifacts for native re-upload.
//!
//! Each native-upload attempt persists the downloaded payload to a
//! uniquely named file under the public storage root, and schedules its
//! deletion after a fixed grace period regardless of delivery outcome.
//! Deletion is idempotent: an already-absent file is not an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use groupcast_core::{DeliveryStage, GroupcastError};

/// Per-process counter appended to artifact names so two downloads landing
/// on the same millisecond cannot collide.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A transient file owned by the delivery attempt that created it.
#[derive(Debug, Clone)]
pub struct TemporaryArtifact {
    pub path: PathBuf,
    pub mime_type: String,
    pub size_bytes: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TemporaryArtifact {
    /// The artifact's file name, used as the outgoing filename.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media.bin".to_string())
    }
}

/// Writes a downloaded payload to a timestamp-named file under `root`
/// (created if absent) and verifies the written file is non-empty.
pub async fn write_artifact(
    root: &Path,
    bytes: &[u8],
    extension: &str,
    mime_type: &str,
) -> Result<TemporaryArtifact, GroupcastError> {
    let stage_err = |message: String, source: std::io::Error| GroupcastError::Delivery {
        stage: DeliveryStage::NativeUpload,
        message,
        source: Some(Box::new(source)),
    };

    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| stage_err(format!("failed to create storage root {}", root.display()), e))?;

    let created_at = chrono::Utc::now();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let name = format!(
        "media-{}-{}.{}",
        created_at.timestamp_millis(),
        seq,
        extension
    );
    let path = root.join(name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| stage_err(format!("failed to write artifact {}", path.display()), e))?;

    let size_bytes = tokio::fs::metadata(&path)
        .await
        .map_err(|e| stage_err(format!("failed to stat artifact {}", path.display()), e))?
        .len();

    // A zero-byte write is a failure, not a success.
    if size_bytes == 0 {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(GroupcastError::delivery(
            DeliveryStage::NativeUpload,
            "artifact written as zero bytes",
        ));
    }

    Ok(TemporaryArtifact {
        path,
        mime_type: mime_type.to_string(),
        size_bytes,
        created_at,
    })
}

/// Schedules deletion of `path` after `grace`, independent of delivery
/// outcome. Tolerant of the file already being gone.
pub fn schedule_cleanup(path: PathBuf, grace: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "transient artifact deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "transient artifact already gone");
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to delete transient artifact"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_artifact_creates_root_and_names_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public/media");

        let artifact = write_artifact(&root, b"payload", "jpg", "image/jpeg")
            .await
            .unwrap();
        assert!(artifact.path.exists());
        assert_eq!(artifact.size_bytes, 7);
        assert_eq!(artifact.mime_type, "image/jpeg");
        assert!(artifact.filename().starts_with("media-"));
        assert!(artifact.filename().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn zero_byte_write_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_artifact(dir.path(), b"", "bin", "application/octet-stream").await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("zero bytes"));

        // No leftover file.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn concurrent_artifacts_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_artifact(dir.path(), b"a", "bin", "x/y").await.unwrap();
        let b = write_artifact(dir.path(), b"b", "bin", "x/y").await.unwrap();
        assert_ne!(a.path, b.path);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_deletes_after_grace_period() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_artifact(dir.path(), b"data", "bin", "x/y").await.unwrap();

        schedule_cleanup(artifact.path.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(artifact.path.exists());

        tokio::time::sleep(Duration::from_secs(2)).await;
        // The delete itself runs on the blocking pool; give it a moment.
        for _ in 0..100 {
            if !artifact.path.exists() {
                break;
            }
            tokio::task::yield_now().await;
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!artifact.path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_artifact(dir.path(), b"data", "bin", "x/y").await.unwrap();
        std::fs::remove_file(&artifact.path).unwrap();

        schedule_cleanup(artifact.path.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        // No panic, nothing to assert beyond completion.
    }
}
