// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed preference persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docent_core::error::DocentError;
use docent_core::traits::{Adapter, PreferencePersistence};
use docent_core::types::{AdapterType, HealthStatus};

/// Stores each key as a file inside one directory.
///
/// Writes go to a hidden sibling temp file which is then renamed over the
/// target, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    directory: PathBuf,
}

impl FilePersistence {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DocentError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(DocentError::Persistence {
                message: format!("invalid preference key `{key}`"),
                source: None,
            });
        }
        Ok(self.directory.join(key))
    }
}

#[async_trait]
impl Adapter for FilePersistence {
    fn name(&self) -> &str {
        "file"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::PreferencePersistence
    }

    async fn health_check(&self) -> Result<HealthStatus, DocentError> {
        match tokio::fs::metadata(&self.directory).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.directory.display()
            ))),
            // Created on first write.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.directory.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), DocentError> {
        Ok(())
    }
}

#[async_trait]
impl PreferencePersistence for FilePersistence {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, DocentError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocentError::persistence(
                format!("failed to read {}", path.display()),
                e,
            )),
        }
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<(), DocentError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                DocentError::persistence(
                    format!("failed to create {}", self.directory.display()),
                    e,
                )
            })?;

        let temp_path = self.directory.join(format!(
            ".{key}.tmp-{}-{}",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::write(&temp_path, contents).await.map_err(|e| {
            DocentError::persistence(format!("failed to write {}", temp_path.display()), e)
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(DocentError::persistence(
                format!("failed to replace {}", path.display()),
                e,
            ));
        }
        Ok(())
    }

    async fn last_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, DocentError> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| {
                    DocentError::persistence(
                        format!("no modification time for {}", path.display()),
                        e,
                    )
                })?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocentError::persistence(
                format!("failed to stat {}", path.display()),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path());
        assert!(persistence.read("users.json").await.unwrap().is_none());
        assert!(persistence.last_modified("users.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_returns_contents() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path().join("nested"));
        persistence.write("users.json", b"{}").await.unwrap();

        assert_eq!(persistence.read("users.json").await.unwrap().unwrap(), b"{}");
        assert!(persistence.last_modified("users.json").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path());
        persistence.write("channels.json", b"{\"C1\":1}").await.unwrap();
        persistence.write("channels.json", b"{}").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["channels.json".to_string()]);
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path());
        let err = persistence.write("../escape.json", b"x").await.unwrap_err();
        assert_eq!(err.category(), "persistence");
    }

    #[tokio::test]
    async fn health_degraded_before_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path().join("later"));
        assert!(matches!(
            persistence.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        persistence.write("users.json", b"{}").await.unwrap();
        assert_eq!(persistence.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
