use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use homedns_application::ports::CredentialRepository;
use homedns_domain::{DomainError, JwtSubject, SigningAlgorithm};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    subjects: BTreeMap<Uuid, SubjectEntry>,
    /// Ids of removed subjects; never handed out again
    #[serde(default)]
    retired: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubjectEntry {
    algorithm: SigningAlgorithm,
    /// Standard base64 of the raw public key
    public_key: String,
    created_at: DateTime<Utc>,
}

/// What the file looked like when it was last read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

struct RegistryState {
    file: RegistryFile,
    stamp: Option<FileStamp>,
}

/// Credential registry persisted as a JSON document.
///
/// The whole file is read at open. Every mutation rewrites it through a
/// temporary file and a rename, so a crash never leaves a torn registry.
/// Changes made by another process (the `jwt` CLI while the server runs)
/// are picked up on the next lookup: every read compares the file's
/// modification time and size with the last seen ones and reloads on change.
pub struct JsonCredentialRegistry {
    path: PathBuf,
    state: RwLock<RegistryState>,
}

impl JsonCredentialRegistry {
    /// Loads the registry; a missing file is an empty registry, an
    /// unreadable or corrupt one is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let (file, stamp) = Self::read_file(&path).await?;

        info!(
            path = %path.display(),
            subjects = file.subjects.len(),
            "Credential registry loaded"
        );

        Ok(Self {
            path,
            state: RwLock::new(RegistryState { file, stamp }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(path: &Path) -> Result<(RegistryFile, Option<FileStamp>), DomainError> {
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((RegistryFile::default(), None));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read credential registry");
                return Err(DomainError::IoError(format!("{}: {}", path.display(), e)));
            }
        };

        let stamp = Self::stamp(path).await;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok((RegistryFile::default(), stamp));
        }

        let file = serde_json::from_slice(&content).map_err(|e| {
            error!(path = %path.display(), error = %e, "Corrupt credential registry");
            DomainError::RegistryError(format!("{}: {}", path.display(), e))
        })?;
        Ok((file, stamp))
    }

    async fn stamp(path: &Path) -> Option<FileStamp> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        Some(FileStamp {
            modified: metadata.modified().ok()?,
            len: metadata.len(),
        })
    }

    async fn persist(&self, state: &mut RegistryState) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(&state.file)
            .map_err(|e| DomainError::RegistryError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::IoError(format!("{}: {}", parent.display(), e)))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", tmp.display(), e)))?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", self.path.display(), e)))?;

        state.stamp = Self::stamp(&self.path).await;
        debug!(path = %self.path.display(), "Credential registry written");
        Ok(())
    }

    /// Re-reads the file under the caller's write lock when it changed on disk.
    async fn refresh_locked(&self, state: &mut RegistryState) -> Result<bool, DomainError> {
        let on_disk = Self::stamp(&self.path).await;
        if on_disk == state.stamp {
            return Ok(false);
        }
        let (file, stamp) = Self::read_file(&self.path).await?;
        state.file = file;
        state.stamp = stamp;
        Ok(true)
    }

    /// Read lock on a state that matches the file on disk.
    async fn current(&self) -> Result<RwLockReadGuard<'_, RegistryState>, DomainError> {
        let on_disk = Self::stamp(&self.path).await;
        {
            let state = self.state.read().await;
            if state.stamp == on_disk {
                return Ok(state);
            }
        }

        let mut state = self.state.write().await;
        if self.refresh_locked(&mut state).await? {
            debug!(path = %self.path.display(), "Credential registry changed on disk, reloaded");
        }
        Ok(state.downgrade())
    }

    fn to_subject(subject_id: Uuid, entry: &SubjectEntry) -> Result<JwtSubject, DomainError> {
        let public_key = STANDARD.decode(&entry.public_key).map_err(|e| {
            DomainError::RegistryError(format!("subject {}: bad public key: {}", subject_id, e))
        })?;
        Ok(JwtSubject {
            subject_id,
            algorithm: entry.algorithm,
            public_key,
            created_at: entry.created_at,
        })
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), DomainError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o640))
        .await
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), DomainError> {
    Ok(())
}

#[async_trait]
impl CredentialRepository for JsonCredentialRegistry {
    #[instrument(skip(self, subject), fields(subject = %subject.subject_id))]
    async fn insert(&self, subject: JwtSubject) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        self.refresh_locked(&mut state).await?;

        let id = subject.subject_id;
        if state.file.subjects.contains_key(&id) || state.file.retired.contains(&id) {
            return Err(DomainError::RegistryError(format!(
                "subject id {} was already issued",
                id
            )));
        }

        state.file.subjects.insert(
            id,
            SubjectEntry {
                algorithm: subject.algorithm,
                public_key: STANDARD.encode(&subject.public_key),
                created_at: subject.created_at,
            },
        );

        if let Err(e) = self.persist(&mut state).await {
            state.file.subjects.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, subject_id: &Uuid) -> Result<Option<JwtSubject>, DomainError> {
        let state = self.current().await?;
        state
            .file
            .subjects
            .get(subject_id)
            .map(|entry| Self::to_subject(*subject_id, entry))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<JwtSubject>, DomainError> {
        let state = self.current().await?;
        state
            .file
            .subjects
            .iter()
            .map(|(id, entry)| Self::to_subject(*id, entry))
            .collect()
    }

    #[instrument(skip(self))]
    async fn remove(&self, subject_id: &Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        self.refresh_locked(&mut state).await?;

        let Some(entry) = state.file.subjects.remove(subject_id) else {
            return Ok(false);
        };
        state.file.retired.insert(*subject_id);

        if let Err(e) = self.persist(&mut state).await {
            state.file.retired.remove(subject_id);
            state.file.subjects.insert(*subject_id, entry);
            return Err(e);
        }
        Ok(true)
    }

    async fn is_known(&self, subject_id: &Uuid) -> Result<bool, DomainError> {
        let state = self.current().await?;
        Ok(state.file.subjects.contains_key(subject_id) || state.file.retired.contains(subject_id))
    }

    async fn reload_if_changed(&self) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let reloaded = self.refresh_locked(&mut state).await?;
        if reloaded {
            info!(
                path = %self.path.display(),
                subjects = state.file.subjects.len(),
                "Credential registry reloaded"
            );
        }
        Ok(reloaded)
    }
}
