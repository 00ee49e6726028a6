use crate::domain::model::DownloadArtifact;
use crate::domain::ports::ArtifactStore;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Writes artifacts into a base directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl ArtifactStore for LocalStore {
    async fn exists(&self, name: &str) -> bool {
        self.base_path.join(name).exists()
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = self.base_path.join(name);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path)
    }
}

/// Hands conversion results to the artifact store under the fixed suggested
/// filename, disambiguating on collision instead of overwriting.
pub struct DeliveryManager<S: ArtifactStore> {
    store: S,
}

impl<S: ArtifactStore> DeliveryManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Initiate one download. The artifact's suggested filename is kept
    /// unless it collides with an existing file, in which case a ` (n)`
    /// suffix is appended before the extension, first free `n` wins.
    pub async fn deliver(&self, artifact: DownloadArtifact) -> Result<PathBuf> {
        let filename = self.uniquify(&artifact.filename).await;

        tracing::debug!(
            %filename,
            mime = artifact.mime,
            bytes = artifact.bytes.len(),
            "delivering artifact"
        );
        let path = self.store.write(&filename, &artifact.bytes).await?;

        tracing::info!(path = %path.display(), "artifact delivered");
        Ok(path)
    }

    async fn uniquify(&self, filename: &str) -> String {
        if !self.store.exists(filename).await {
            return filename.to_string();
        }

        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let extension = Path::new(filename).extension().and_then(|e| e.to_str());

        for n in 1.. {
            let candidate = match extension {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            if !self.store.exists(&candidate).await {
                return candidate;
            }
        }

        unreachable!("uniquify counter exhausted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> DeliveryManager<LocalStore> {
        DeliveryManager::new(LocalStore::new(dir.path()))
    }

    #[tokio::test]
    async fn test_delivers_under_suggested_filename() {
        let dir = TempDir::new().unwrap();

        let path = manager(&dir)
            .deliver(DownloadArtifact::yaml("a: 1".to_string()))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("dark-dashboard.yaml"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a: 1");
    }

    #[tokio::test]
    async fn test_collision_appends_suffix_before_extension() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        manager
            .deliver(DownloadArtifact::yaml("first".to_string()))
            .await
            .unwrap();
        let second = manager
            .deliver(DownloadArtifact::yaml("second".to_string()))
            .await
            .unwrap();
        let third = manager
            .deliver(DownloadArtifact::yaml("third".to_string()))
            .await
            .unwrap();

        assert_eq!(second, dir.path().join("dark-dashboard (1).yaml"));
        assert_eq!(third, dir.path().join("dark-dashboard (2).yaml"));

        // The original file is untouched.
        let original = dir.path().join("dark-dashboard.yaml");
        assert_eq!(std::fs::read_to_string(original).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_creates_base_directory_on_demand() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("exports").join("dark");

        let path = DeliveryManager::new(LocalStore::new(&nested))
            .deliver(DownloadArtifact::yaml("a: 1".to_string()))
            .await
            .unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
