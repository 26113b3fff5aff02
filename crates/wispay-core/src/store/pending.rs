// ── Durable pending-request store ──
//
// One JSON file per request under a spool directory, keyed by request id.
// Survives process restarts; nothing is ever deleted (retention is a
// deployment concern).
//
// Atomicity: `put` claims an id with `create_new` (first writer wins),
// and `update_status` serializes writers per id through an async mutex
// and replaces the file via temp-file + rename, so concurrent duplicate
// approval events cannot corrupt a record or double-transition it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Correlation, PendingRequest, RequestStatus};

pub struct PendingStore {
    dir: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PendingStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| CoreError::Store {
            message: format!("cannot create store directory {}: {e}", dir.display()),
        })?;
        Ok(Self {
            dir,
            locks: DashMap::new(),
        })
    }

    /// The spool directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Persist a new request. Fails with [`CoreError::DuplicateRequest`]
    /// if the id is already claimed.
    pub async fn put(&self, request: &PendingRequest) -> Result<(), CoreError> {
        let lock = self.lock_for(&request.id);
        let _guard = lock.lock().await;

        let body = serde_json::to_vec_pretty(request).map_err(|e| CoreError::Store {
            message: format!("cannot serialize request {}: {e}", request.id),
        })?;

        let path = self.record_path(&request.id);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    CoreError::DuplicateRequest {
                        id: request.id.clone(),
                    }
                } else {
                    CoreError::Store {
                        message: format!("cannot create {}: {e}", path.display()),
                    }
                }
            })?;

        file.write_all(&body).await.map_err(|e| CoreError::Store {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
        file.sync_all().await.map_err(|e| CoreError::Store {
            message: format!("cannot sync {}: {e}", path.display()),
        })?;
        Ok(())
    }

    /// Load a request by id.
    pub async fn get(&self, id: &str) -> Result<PendingRequest, CoreError> {
        let path = self.record_path(id);
        let body = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::RequestNotFound { id: id.to_owned() }
            } else {
                CoreError::Store {
                    message: format!("cannot read {}: {e}", path.display()),
                }
            }
        })?;
        serde_json::from_str(&body).map_err(|e| CoreError::Store {
            message: format!("corrupt record {}: {e}", path.display()),
        })
    }

    /// Transition a request to a terminal status, stamping `decided_at`.
    ///
    /// Fails with [`CoreError::InvalidTransition`] if the record is
    /// already terminal -- callers treat that as a benign duplicate.
    pub async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<PendingRequest, CoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut request = self.get(id).await?;
        if request.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                id: id.to_owned(),
                status: request.status,
            });
        }

        request.status = status;
        request.decided_at = Some(Utc::now());
        self.replace(&request).await?;
        Ok(request)
    }

    /// Resolve an approval event's correlation fields to exactly one
    /// request.
    ///
    /// An explicit request id resolves directly; otherwise the spool is
    /// scanned for records matching every provided field. More than one
    /// match is [`CoreError::AmbiguousCorrelation`] -- this never guesses.
    pub async fn find_by_correlation(
        &self,
        correlation: &Correlation,
    ) -> Result<PendingRequest, CoreError> {
        if let Some(id) = &correlation.request_id {
            return self.get(id).await;
        }

        let mut matches: Vec<PendingRequest> = self
            .scan()
            .await?
            .into_iter()
            .filter(|r| {
                correlation
                    .contact_number
                    .as_deref()
                    .is_none_or(|c| r.contact_number == c)
                    && correlation.package.is_none_or(|p| r.package == p)
            })
            .collect();

        match matches.len() {
            0 => Err(CoreError::RequestNotFound {
                id: correlation.describe(),
            }),
            1 => Ok(matches.swap_remove(0)),
            n => Err(CoreError::AmbiguousCorrelation { matches: n }),
        }
    }

    /// All records still awaiting a decision, oldest first.
    ///
    /// This is the operator follow-up surface for submissions whose admin
    /// notification failed.
    pub async fn list_pending(&self) -> Result<Vec<PendingRequest>, CoreError> {
        let mut pending: Vec<PendingRequest> = self
            .scan()
            .await?
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }

    /// Atomically replace an existing record (temp file + rename).
    async fn replace(&self, request: &PendingRequest) -> Result<(), CoreError> {
        let path = self.record_path(&request.id);
        let tmp = self.dir.join(format!("{}.json.tmp", request.id));

        let body = serde_json::to_vec_pretty(request).map_err(|e| CoreError::Store {
            message: format!("cannot serialize request {}: {e}", request.id),
        })?;
        tokio::fs::write(&tmp, &body).await.map_err(|e| CoreError::Store {
            message: format!("cannot write {}: {e}", tmp.display()),
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| CoreError::Store {
            message: format!("cannot replace {}: {e}", path.display()),
        })
    }

    /// Read every record in the spool, skipping temp files and logging
    /// (not failing on) corrupt entries.
    async fn scan(&self) -> Result<Vec<PendingRequest>, CoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| CoreError::Store {
            message: format!("cannot read store directory {}: {e}", self.dir.display()),
        })?;

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| CoreError::Store {
            message: format!("cannot scan store directory: {e}"),
        })? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => match serde_json::from_str(&body) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping corrupt record"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::PendingStore;
    use crate::error::CoreError;
    use crate::model::{Correlation, Package, PendingRequest, RequestStatus};

    fn request(id: &str, package: Package, contact: &str) -> PendingRequest {
        PendingRequest {
            id: id.into(),
            username: id.into(),
            password: "482913".into(),
            package,
            contact_number: contact.into(),
            proof_reference: None,
            source_address: None,
            status: RequestStatus::Pending,
            created_at: chrono::Utc::now(),
            decided_at: None,
        }
    }

    async fn store() -> (tempfile::TempDir, PendingStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PendingStore::open(dir.path()).await.expect("store opens");
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (_dir, store) = store().await;
        let req = request("user1234", Package::SevenDays, "01712345678");
        store.put(&req).await.expect("put succeeds");

        let loaded = store.get("user1234").await.expect("get succeeds");
        assert_eq!(loaded.username, "user1234");
        assert_eq!(loaded.package, Package::SevenDays);
        assert_eq!(loaded.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn put_duplicate_id_fails() {
        let (_dir, store) = store().await;
        let req = request("user1234", Package::OneDay, "01712345678");
        store.put(&req).await.expect("first put succeeds");

        let err = store.put(&req).await.expect_err("second put fails");
        assert!(matches!(err, CoreError::DuplicateRequest { .. }));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.get("ghost").await.expect_err("missing id");
        assert!(matches!(err, CoreError::RequestNotFound { .. }));
    }

    #[tokio::test]
    async fn update_status_stamps_decision() {
        let (_dir, store) = store().await;
        store
            .put(&request("user1234", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");

        let updated = store
            .update_status("user1234", RequestStatus::Approved)
            .await
            .expect("transition succeeds");
        assert_eq!(updated.status, RequestStatus::Approved);
        assert!(updated.decided_at.is_some());
    }

    #[tokio::test]
    async fn terminal_status_is_absorbing() {
        let (_dir, store) = store().await;
        store
            .put(&request("user1234", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");
        store
            .update_status("user1234", RequestStatus::Rejected)
            .await
            .expect("first transition succeeds");

        let err = store
            .update_status("user1234", RequestStatus::Approved)
            .await
            .expect_err("second transition fails");
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                status: RequestStatus::Rejected,
                ..
            }
        ));

        // The stored record is unchanged.
        let loaded = store.get("user1234").await.expect("get succeeds");
        assert_eq!(loaded.status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = PendingStore::open(dir.path()).await.expect("store opens");
            store
                .put(&request("user1234", Package::ThirtyDays, "01712345678"))
                .await
                .expect("put succeeds");
        }

        let reopened = PendingStore::open(dir.path()).await.expect("store reopens");
        let loaded = reopened.get("user1234").await.expect("get succeeds");
        assert_eq!(loaded.package, Package::ThirtyDays);
    }

    #[tokio::test]
    async fn correlation_by_id_resolves_directly() {
        let (_dir, store) = store().await;
        store
            .put(&request("user1234", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");

        let found = store
            .find_by_correlation(&Correlation::from_id("user1234"))
            .await
            .expect("resolves");
        assert_eq!(found.id, "user1234");
    }

    #[tokio::test]
    async fn correlation_scan_refuses_to_guess() {
        let (_dir, store) = store().await;
        store
            .put(&request("user1111", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");
        store
            .put(&request("user2222", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");

        let correlation = Correlation {
            request_id: None,
            contact_number: Some("01712345678".into()),
            package: Some(Package::OneDay),
        };
        let err = store
            .find_by_correlation(&correlation)
            .await
            .expect_err("two matches");
        assert!(matches!(err, CoreError::AmbiguousCorrelation { matches: 2 }));
    }

    #[tokio::test]
    async fn list_pending_excludes_decided() {
        let (_dir, store) = store().await;
        store
            .put(&request("user1111", Package::OneDay, "01712345678"))
            .await
            .expect("put succeeds");
        store
            .put(&request("user2222", Package::SevenDays, "01887654321"))
            .await
            .expect("put succeeds");
        store
            .update_status("user1111", RequestStatus::Approved)
            .await
            .expect("transition succeeds");

        let pending = store.list_pending().await.expect("list succeeds");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "user2222");
    }
}
