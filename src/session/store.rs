//! Persisted key/value token store.
//!
//! Entries are addressed by [`SessionKey`] only, so every caller agrees on
//! the stored names. Older installs wrote the same values under several
//! different names; [`FileTokenStore::open`] folds those into the canonical
//! keys.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Keys the application keeps in the token store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    /// Tenant/instance key scoping backend requests.
    TenantKey,
    SelectedHospital,
    SelectedPatient,
}

impl SessionKey {
    pub const ALL: [Self; 5] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::TenantKey,
        Self::SelectedHospital,
        Self::SelectedPatient,
    ];

    /// Canonical stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::TenantKey => "tenant_key",
            Self::SelectedHospital => "selected_hospital_id",
            Self::SelectedPatient => "selected_patient_id",
        }
    }

    /// Names older pages used for the same value.
    fn legacy_names(self) -> &'static [&'static str] {
        match self {
            Self::AccessToken => &["access", "token"],
            Self::RefreshToken => &["refresh"],
            Self::TenantKey => &["instance_key", "instance", "hospital_key"],
            Self::SelectedHospital => &["hospitalId", "hospital_id"],
            Self::SelectedPatient => &["patientId", "patient_id"],
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-wide session state.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: SessionKey) -> Option<String>;

    /// Write several entries with a single persist.
    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), StoreError>;

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError>;

    /// Drop every [`SessionKey`] entry.
    async fn clear(&self) -> Result<(), StoreError>;

    async fn set(&self, key: SessionKey, value: String) -> Result<(), StoreError> {
        self.set_all(&[(key, value)]).await
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Non-persistent store, used for tests and ephemeral kiosks.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<SessionKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.read().await.get(&key).cloned()
    }

    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            guard.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// JSON object on disk, rewritten on every change.
///
/// Keys it does not recognise are preserved untouched. A write that fails to
/// reach disk leaves the in-memory entries as they were.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileTokenStore {
    /// Open (or start) the store at `path`, migrating legacy key names.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => parse_entries(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let migrated = migrate_legacy_keys(&mut entries);
        if migrated > 0 {
            tracing::info!(
                name: "session.store.migrated",
                path = %path.display(),
                migrated,
                "Migrated legacy token store keys"
            );
            persist(&path, &entries).await?;
        }

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.read().await.get(key.as_str()).cloned()
    }

    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        let mut next = guard.clone();
        for (key, value) in entries {
            next.insert(key.as_str().to_string(), value.clone());
        }
        persist(&self.path, &next).await?;
        *guard = next;
        Ok(())
    }

    async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        if guard.contains_key(key.as_str()) {
            let mut next = guard.clone();
            next.remove(key.as_str());
            persist(&self.path, &next).await?;
            *guard = next;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        let mut next = guard.clone();
        for key in SessionKey::ALL {
            next.remove(key.as_str());
        }
        persist(&self.path, &next).await?;
        *guard = next;
        Ok(())
    }
}

/// Accept string, number and boolean values; drop nulls and nested data.
fn parse_entries(raw: &str) -> Result<BTreeMap<String, String>, StoreError> {
    let value: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(value
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            serde_json::Value::Number(n) => Some((k, n.to_string())),
            serde_json::Value::Bool(b) => Some((k, b.to_string())),
            _ => None,
        })
        .collect())
}

/// Move legacy names onto canonical keys. Returns how many names were folded.
///
/// An existing canonical entry wins; the legacy names are dropped either way.
fn migrate_legacy_keys(entries: &mut BTreeMap<String, String>) -> usize {
    let mut folded = 0;
    for key in SessionKey::ALL {
        for legacy in key.legacy_names() {
            if let Some(value) = entries.remove(*legacy) {
                folded += 1;
                entries.entry(key.as_str().to_string()).or_insert(value);
            }
        }
    }
    folded
}

/// Write through a temp file so a crash never leaves half a JSON document.
async fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let body = serde_json::to_vec_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(SessionKey::AccessToken).await, None);

        store
            .set_all(&[
                (SessionKey::AccessToken, "acc".into()),
                (SessionKey::TenantKey, "st-marys".into()),
            ])
            .await
            .unwrap();
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("acc"));

        store.remove(SessionKey::AccessToken).await.unwrap();
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
        assert_eq!(store.get(SessionKey::TenantKey).await.as_deref(), Some("st-marys"));

        store.clear().await.unwrap();
        assert_eq!(store.get(SessionKey::TenantKey).await, None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::open(&path).await.unwrap();
        store
            .set(SessionKey::RefreshToken, "ref".into())
            .await
            .unwrap();
        drop(store);

        let reopened = FileTokenStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get(SessionKey::RefreshToken).await.as_deref(),
            Some("ref")
        );
    }

    #[tokio::test]
    async fn legacy_keys_are_migrated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(
            &path,
            r#"{"access": "old-acc", "instance_key": "north", "hospitalId": 12,
                "patient_id": "p-9", "theme": "dark"}"#,
        )
        .await
        .unwrap();

        let store = FileTokenStore::open(&path).await.unwrap();
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("old-acc"));
        assert_eq!(store.get(SessionKey::TenantKey).await.as_deref(), Some("north"));
        assert_eq!(store.get(SessionKey::SelectedHospital).await.as_deref(), Some("12"));
        assert_eq!(store.get(SessionKey::SelectedPatient).await.as_deref(), Some("p-9"));

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert!(!on_disk.contains_key("instance_key"));
        assert_eq!(on_disk.get("tenant_key").map(String::as_str), Some("north"));
        assert_eq!(on_disk.get("theme").map(String::as_str), Some("dark"));
    }

    #[tokio::test]
    async fn canonical_key_wins_over_legacy_alias() {
        let mut entries = BTreeMap::from([
            ("tenant_key".to_string(), "canonical".to_string()),
            ("instance".to_string(), "legacy".to_string()),
        ]);
        assert_eq!(migrate_legacy_keys(&mut entries), 1);
        assert_eq!(entries.get("tenant_key").map(String::as_str), Some("canonical"));
        assert!(!entries.contains_key("instance"));
    }

    #[tokio::test]
    async fn clear_keeps_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, r#"{"access_token": "a", "theme": "dark"}"#)
            .await
            .unwrap();

        let store = FileTokenStore::open(&path).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get(SessionKey::AccessToken).await, None);

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("access_token"));
    }

    #[tokio::test]
    async fn failed_persist_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path).await.unwrap();

        // A non-empty directory at the target path makes the rename fail.
        tokio::fs::create_dir(&path).await.unwrap();
        tokio::fs::write(path.join("keep"), "x").await.unwrap();

        let result = store.set(SessionKey::AccessToken, "acc".into()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(matches!(
            FileTokenStore::open(&path).await,
            Err(StoreError::Json(_))
        ));
    }
}
