// SPDX-License-Identifier: GPL-3.0-only

//! Captured media records and the on-device catalog
//!
//! The catalog is the external collaborator the capture core hands finished
//! artifacts to. The gallery component reads and deletes through the same
//! gateway. Records are persisted as a single JSON file under the platform
//! data directory.

use crate::constants::APP_NAME;
use crate::errors::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Kind of captured media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    /// Still photo
    Photo,
    /// Video clip
    Video,
}

/// Result of a completed photo or video operation.
///
/// The only entity handed across the core/catalog boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedArtifact {
    /// Record id
    pub id: Uuid,
    /// Output reference (URI or path). `None` only when a sink saved the
    /// artifact but could not report where, and the fallback lookup missed;
    /// such artifacts are never inserted into the catalog.
    pub output_ref: Option<String>,
    /// Media kind
    pub kind: MediaKind,
    /// Creation timestamp, wall-clock milliseconds since the Unix epoch
    pub created_at_ms: i64,
    /// Recording duration in milliseconds (video only)
    pub duration_ms: Option<u64>,
}

impl CapturedArtifact {
    /// Create an artifact stamped with the current wall-clock time
    pub fn new(kind: MediaKind, output_ref: Option<String>, duration_ms: Option<u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            output_ref,
            kind,
            created_at_ms: chrono::Local::now().timestamp_millis(),
            duration_ms,
        }
    }
}

/// Media catalog gateway
///
/// `insert` is fire-and-forget from the capture core's perspective; query and
/// delete serve the gallery component.
pub trait CatalogGateway {
    /// Insert a finished artifact. Fails if the artifact has no output
    /// reference.
    fn insert(
        &self,
        artifact: CapturedArtifact,
    ) -> impl Future<Output = SessionResult<()>> + Send;

    /// All records, newest first
    fn query_all(&self) -> impl Future<Output = SessionResult<Vec<CapturedArtifact>>> + Send;

    /// Delete one record. Returns whether the record existed.
    fn delete(&self, id: Uuid) -> impl Future<Output = SessionResult<bool>> + Send;
}

/// JSON-file backed catalog
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Catalog at the default location under the platform data dir
    pub fn open_default() -> SessionResult<Self> {
        let dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SessionError::Storage("no data directory".to_string()))?
            .join(APP_NAME);
        std::fs::create_dir_all(&dir)?;
        Ok(Self::new(dir.join("catalog.json")))
    }

    /// Catalog backed by a specific file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load(&self) -> SessionResult<Vec<CapturedArtifact>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SessionError::Storage(format!("catalog parse error: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[CapturedArtifact]) -> SessionResult<()> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| SessionError::Storage(format!("catalog encode error: {}", e)))?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

impl CatalogGateway for JsonCatalog {
    async fn insert(&self, artifact: CapturedArtifact) -> SessionResult<()> {
        if artifact.output_ref.is_none() {
            warn!(id = %artifact.id, "Refusing to catalog artifact without output reference");
            return Err(SessionError::Storage(
                "artifact has no output reference".to_string(),
            ));
        }

        let mut records = self.load().await?;
        info!(id = %artifact.id, kind = ?artifact.kind, "Cataloging artifact");
        records.push(artifact);
        self.save(&records).await
    }

    async fn query_all(&self) -> SessionResult<Vec<CapturedArtifact>> {
        let mut records = self.load().await?;
        records.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        debug!(count = records.len(), "Catalog queried");
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> SessionResult<bool> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            return Ok(false);
        }
        info!(%id, "Deleted catalog record");
        self.save(&records).await?;
        Ok(true)
    }
}
