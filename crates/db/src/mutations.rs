//! Credential-gated catalog administration.
//!
//! Each operation checks the shared credential first, then validates its input, and only
//! then touches storage. Uploads write the image file before the record and remove the file
//! again if the record cannot be stored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, warn};

use zarigani_core::catalog::{
    generate_file_name, validate_credential, validate_file_size, validate_file_type,
    validate_tags,
};
use zarigani_core::errors::{CatalogError, ValidationError};
use zarigani_core::{Catalog, ImageId, ImageRecord};

use crate::files::ImageStorage;
use crate::repository::CatalogRepository;

#[derive(Clone, Debug)]
pub struct UploadedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct CatalogMutations {
    repository: Arc<CatalogRepository>,
    storage: Arc<dyn ImageStorage>,
    credential: SecretString,
    max_file_size_bytes: u64,
}

impl CatalogMutations {
    pub fn new(
        repository: Arc<CatalogRepository>,
        storage: Arc<dyn ImageStorage>,
        credential: SecretString,
        max_file_size_bytes: u64,
    ) -> Self {
        Self { repository, storage, credential, max_file_size_bytes }
    }

    pub fn repository(&self) -> &Arc<CatalogRepository> {
        &self.repository
    }

    pub fn authorize(&self, credential: &str) -> Result<(), CatalogError> {
        if validate_credential(self.credential.expose_secret(), credential) {
            Ok(())
        } else {
            Err(ValidationError::InvalidCredential.into())
        }
    }

    pub async fn list(&self, credential: &str) -> Result<Arc<Catalog>, CatalogError> {
        self.authorize(credential)?;
        self.repository.list().await
    }

    pub async fn get(&self, credential: &str, id: ImageId) -> Result<ImageRecord, CatalogError> {
        self.authorize(credential)?;
        self.repository.find(id).await?.ok_or(CatalogError::NotFound(id))
    }

    pub async fn upload(
        &self,
        credential: &str,
        image: UploadedImage,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<ImageRecord, CatalogError> {
        self.authorize(credential)?;
        validate_tags(&tags)?;
        validate_file_type(&image.content_type)?;
        validate_file_size(image.bytes.len() as u64, self.max_file_size_bytes)?;

        let file_name = generate_file_name(&image.content_type, now);
        self.storage.save(&file_name, &image.bytes).await?;

        match self.repository.insert(&file_name, tags).await {
            Ok(record) => Ok(record),
            Err(insert_error) => {
                if let Err(cleanup_error) = self.storage.delete(&file_name).await {
                    error!(
                        event_name = "catalog.upload.cleanup_failed",
                        file_name = %file_name,
                        error = %cleanup_error,
                        "uploaded file could not be removed after the record insert failed"
                    );
                }
                Err(insert_error)
            }
        }
    }

    pub async fn update_tags(
        &self,
        credential: &str,
        id: ImageId,
        tags: Vec<String>,
    ) -> Result<ImageRecord, CatalogError> {
        self.authorize(credential)?;
        self.repository.update(id, tags).await
    }

    /// Deletes the record, then its file. A file that is already gone only produces a
    /// warning.
    pub async fn remove(&self, credential: &str, id: ImageId) -> Result<ImageRecord, CatalogError> {
        self.authorize(credential)?;
        let removed = self.repository.delete(id).await?;

        if !self.storage.delete(&removed.file_name).await? {
            warn!(
                event_name = "catalog.delete.file_missing",
                image_id = %id,
                file_name = %removed.file_name,
                "record deleted but its image file was already missing"
            );
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use zarigani_core::errors::{CatalogError, ValidationError};
    use zarigani_core::ImageId;

    use super::{CatalogMutations, UploadedImage};
    use crate::files::{ImageDirectory, ImageStorage};
    use crate::repository::CatalogRepository;
    use crate::store::CatalogStore;

    struct Fixture {
        _dir: TempDir,
        images: Arc<ImageDirectory>,
        mutations: CatalogMutations,
    }

    fn fixture(max_file_size_bytes: u64) -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let store = Arc::new(CatalogStore::new(dir.path().join("images.json")));
        let repository = Arc::new(CatalogRepository::new(store));
        let images = Arc::new(ImageDirectory::new(dir.path().join("images")));
        let mutations = CatalogMutations::new(
            repository,
            images.clone(),
            "open-sesame".to_string().into(),
            max_file_size_bytes,
        );
        Fixture { _dir: dir, images, mutations }
    }

    fn png(bytes: &[u8]) -> UploadedImage {
        UploadedImage { content_type: "image/png".to_string(), bytes: bytes.to_vec() }
    }

    #[tokio::test]
    async fn upload_stores_file_and_record() {
        let fixture = fixture(1024);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).single().expect("valid");

        let record = fixture
            .mutations
            .upload("open-sesame", png(b"data"), vec!["喜".to_string()], now)
            .await
            .expect("upload");

        assert_eq!(record.id, ImageId(1));
        assert_eq!(record.file_name, "2024-05-01-12-00-00.png");
        assert!(fixture.images.exists(&record.file_name).await.expect("exists"));
    }

    #[tokio::test]
    async fn upload_checks_credential_before_anything_else() {
        let fixture = fixture(1024);

        let error = fixture
            .mutations
            .upload("wrong", png(b""), Vec::new(), Utc::now())
            .await
            .expect_err("bad credential");

        assert!(matches!(error, CatalogError::Validation(ValidationError::InvalidCredential)));
    }

    #[tokio::test]
    async fn upload_rejects_bad_type_and_size() {
        let fixture = fixture(4);
        let tags = vec!["x".to_string()];

        let webp = UploadedImage { content_type: "image/webp".to_string(), bytes: vec![1] };
        let wrong_type = fixture
            .mutations
            .upload("open-sesame", webp, tags.clone(), Utc::now())
            .await
            .expect_err("webp");
        let empty = fixture
            .mutations
            .upload("open-sesame", png(b""), tags.clone(), Utc::now())
            .await
            .expect_err("empty");
        let too_big = fixture
            .mutations
            .upload("open-sesame", png(b"12345"), tags, Utc::now())
            .await
            .expect_err("too big");

        assert!(matches!(
            wrong_type,
            CatalogError::Validation(ValidationError::UnsupportedFileType(_))
        ));
        assert!(matches!(empty, CatalogError::Validation(ValidationError::EmptyFile)));
        assert!(matches!(
            too_big,
            CatalogError::Validation(ValidationError::FileTooLarge { size: 5, max: 4 })
        ));
    }

    #[tokio::test]
    async fn same_second_uploads_conflict_without_losing_the_first() {
        let fixture = fixture(1024);
        let now = Utc::now();
        let tags = vec!["x".to_string()];

        let first = fixture
            .mutations
            .upload("open-sesame", png(b"one"), tags.clone(), now)
            .await
            .expect("first upload");
        let second = fixture
            .mutations
            .upload("open-sesame", png(b"two"), tags, now)
            .await
            .expect_err("second upload");

        assert!(matches!(second, CatalogError::FileExists(_)));
        let stored = std::fs::read(fixture.images.root().join(&first.file_name)).expect("read");
        assert_eq!(stored, b"one");
    }

    #[tokio::test]
    async fn remove_deletes_record_and_tolerates_missing_file() {
        let fixture = fixture(1024);
        let record = fixture
            .mutations
            .upload("open-sesame", png(b"data"), vec!["x".to_string()], Utc::now())
            .await
            .expect("upload");
        fixture.images.delete(&record.file_name).await.expect("remove file out of band");

        let removed = fixture.mutations.remove("open-sesame", record.id).await.expect("remove");
        let missing = fixture.mutations.get("open-sesame", record.id).await.expect_err("gone");

        assert_eq!(removed.id, record.id);
        assert!(matches!(missing, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_requires_credential_and_valid_tags() {
        let fixture = fixture(1024);
        let record = fixture
            .mutations
            .upload("open-sesame", png(b"data"), vec!["x".to_string()], Utc::now())
            .await
            .expect("upload");

        let denied = fixture
            .mutations
            .update_tags("", record.id, vec!["y".to_string()])
            .await
            .expect_err("denied");
        let updated = fixture
            .mutations
            .update_tags("open-sesame", record.id, vec!["y".to_string()])
            .await
            .expect("update");

        assert!(matches!(denied, CatalogError::Validation(ValidationError::InvalidCredential)));
        assert_eq!(updated.tags, vec!["y".to_string()]);
    }
}
