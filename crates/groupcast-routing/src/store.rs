// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing-table persistence.
//!
//! The table is stored as a single JSON document. A missing or malformed
//! document is recovered by falling back to an empty table and writing a
//! fresh default; only genuine I/O failures surface as errors.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use groupcast_core::GroupcastError;

use crate::RoutingTable;

/// Load-at-startup and save-after-mutation persistence for the routing table.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Loads the persisted table. Missing or malformed documents yield an
    /// empty table (and a fresh default is written back).
    async fn load(&self) -> Result<RoutingTable, GroupcastError>;

    /// Persists the full table. Called after every mutation.
    async fn save(&self, table: &RoutingTable) -> Result<(), GroupcastError>;
}

/// [`RuleStore`] backed by a JSON file on disk.
pub struct JsonRuleStore {
    path: PathBuf,
}

impl JsonRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(e: std::io::Error) -> GroupcastError {
        GroupcastError::Persistence {
            source: Box::new(e),
        }
    }
}

#[async_trait]
impl RuleStore for JsonRuleStore {
    async fn load(&self) -> Result<RoutingTable, GroupcastError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<RoutingTable>(&bytes) {
                Ok(table) => {
                    debug!(path = %self.path.display(), rules = table.len(), "routing table loaded");
                    Ok(table)
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "routing table document is malformed, defaulting to empty"
                    );
                    let table = RoutingTable::new();
                    self.save(&table).await?;
                    Ok(table)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no routing table document, writing default");
                let table = RoutingTable::new();
                self.save(&table).await?;
                Ok(table)
            }
            Err(e) => Err(Self::io_error(e)),
        }
    }

    async fn save(&self, table: &RoutingTable) -> Result<(), GroupcastError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(Self::io_error)?;
        }

        let json = serde_json::to_vec_pretty(table).map_err(|e| GroupcastError::Persistence {
            source: Box::new(e),
        })?;
        tokio::fs::write(&self.path, json).await.map_err(Self::io_error)?;
        debug!(path = %self.path.display(), rules = table.len(), "routing table saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutingRule;

    #[tokio::test]
    async fn missing_document_defaults_to_empty_and_writes_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let store = JsonRuleStore::new(&path);

        let table = store.load().await.unwrap();
        assert!(table.is_empty());
        // A fresh default document was written.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn malformed_document_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        tokio::fs::write(&path, b"{not valid json").await.unwrap();

        let store = JsonRuleStore::new(&path);
        let table = store.load().await.unwrap();
        assert!(table.is_empty());

        // The rewritten document now parses.
        let reloaded = store.load().await.unwrap();
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRuleStore::new(dir.path().join("nested/dir/rules.json"));

        let mut table = RoutingTable::new();
        table.add(RoutingRule {
            source: "a@g.us".into(),
            targets: vec!["b@g.us".into(), "c@g.us".into()],
            kinds: None,
        });
        store.save(&table).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, table);
    }
}
