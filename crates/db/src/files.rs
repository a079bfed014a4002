use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use zarigani_core::catalog::validate_file_name;
use zarigani_core::errors::CatalogError;

/// Storage for uploaded image bytes, keyed by file name.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn exists(&self, file_name: &str) -> Result<bool, CatalogError>;

    /// Creates the file; an existing file with the same name is a `FileExists` error.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), CatalogError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, file_name: &str) -> Result<bool, CatalogError>;
}

#[derive(Clone, Debug)]
pub struct ImageDirectory {
    root: PathBuf,
}

impl ImageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, CatalogError> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl ImageStorage for ImageDirectory {
    async fn exists(&self, file_name: &str) -> Result<bool, CatalogError> {
        let path = self.resolve(file_name)?;
        tokio::fs::try_exists(&path).await.map_err(|source| CatalogError::io(&path, source))
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), CatalogError> {
        let path = self.resolve(file_name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| CatalogError::io(&self.root, source))?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                return Err(CatalogError::FileExists(file_name.to_string()));
            }
            Err(source) => return Err(CatalogError::io(&path, source)),
        };

        file.write_all(bytes).await.map_err(|source| CatalogError::io(&path, source))?;
        file.flush().await.map_err(|source| CatalogError::io(&path, source))?;
        Ok(())
    }

    async fn delete(&self, file_name: &str) -> Result<bool, CatalogError> {
        let path = self.resolve(file_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CatalogError::io(&path, source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use zarigani_core::errors::{CatalogError, ValidationError};

    use super::{ImageDirectory, ImageStorage};

    #[tokio::test]
    async fn save_creates_the_directory_and_refuses_overwrites() {
        let dir = TempDir::new().expect("tempdir");
        let images = ImageDirectory::new(dir.path().join("public").join("images"));

        images.save("a.png", b"png-bytes").await.expect("save");
        let second = images.save("a.png", b"other").await.expect_err("overwrite");

        assert!(images.exists("a.png").await.expect("exists"));
        assert!(matches!(second, CatalogError::FileExists(ref name) if name == "a.png"));
        let stored = std::fs::read(images.root().join("a.png")).expect("read back");
        assert_eq!(stored, b"png-bytes");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_file_was_removed() {
        let dir = TempDir::new().expect("tempdir");
        let images = ImageDirectory::new(dir.path());
        images.save("a.png", b"x").await.expect("save");

        assert!(images.delete("a.png").await.expect("delete"));
        assert!(!images.delete("a.png").await.expect("delete missing"));
        assert!(!images.exists("a.png").await.expect("exists"));
    }

    #[tokio::test]
    async fn names_outside_the_directory_are_refused() {
        let dir = TempDir::new().expect("tempdir");
        let images = ImageDirectory::new(dir.path().join("images"));

        let error = images.save("../escape.png", b"x").await.expect_err("escape");

        assert!(matches!(error, CatalogError::Validation(ValidationError::InvalidFileName(_))));
        assert!(!dir.path().join("escape.png").exists());
    }
}
