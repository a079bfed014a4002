use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use zarigani_core::catalog::{validate_file_name, validate_tags};
use zarigani_core::domain::image::{find_by_id, next_image_id};
use zarigani_core::errors::CatalogError;
use zarigani_core::{Catalog, ImageId, ImageRecord};

use crate::store::CatalogStore;

/// Catalog reads and serialized mutations.
///
/// Every mutation holds `write_lock` across force-load, change, persist and cache refresh,
/// so concurrent inserts cannot hand out the same id or drop each other's records.
pub struct CatalogRepository {
    store: Arc<CatalogStore>,
    write_lock: Mutex<()>,
}

impl CatalogRepository {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub async fn list(&self) -> Result<Arc<Catalog>, CatalogError> {
        self.store.load_catalog(false).await
    }

    pub async fn find(&self, id: ImageId) -> Result<Option<ImageRecord>, CatalogError> {
        let catalog = self.store.load_catalog(false).await?;
        Ok(find_by_id(&catalog, id).cloned())
    }

    pub async fn list_file_names(&self) -> Result<Vec<String>, CatalogError> {
        let catalog = self.store.load_catalog(false).await?;
        Ok(catalog.iter().map(|record| record.file_name.clone()).collect())
    }

    pub async fn insert(
        &self,
        file_name: &str,
        tags: Vec<String>,
    ) -> Result<ImageRecord, CatalogError> {
        validate_file_name(file_name)?;
        validate_tags(&tags)?;

        let _guard = self.write_lock.lock().await;
        let mut catalog = Catalog::clone(&*self.store.load_catalog(true).await?);
        if catalog.iter().any(|record| record.file_name == file_name) {
            return Err(CatalogError::FileExists(file_name.to_string()));
        }

        let record =
            ImageRecord { id: next_image_id(&catalog), file_name: file_name.to_string(), tags };
        catalog.push(record.clone());
        self.commit(catalog).await?;

        info!(
            event_name = "catalog.record.inserted",
            image_id = %record.id,
            file_name = %record.file_name,
            "image record inserted"
        );
        Ok(record)
    }

    pub async fn update(&self, id: ImageId, tags: Vec<String>) -> Result<ImageRecord, CatalogError> {
        validate_tags(&tags)?;

        let _guard = self.write_lock.lock().await;
        let mut catalog = Catalog::clone(&*self.store.load_catalog(true).await?);
        let record = catalog
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        record.tags = tags;
        let updated = record.clone();
        self.commit(catalog).await?;

        info!(event_name = "catalog.record.updated", image_id = %id, "image record updated");
        Ok(updated)
    }

    /// Removes the record and returns it; the image file itself is left to the caller.
    pub async fn delete(&self, id: ImageId) -> Result<ImageRecord, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = Catalog::clone(&*self.store.load_catalog(true).await?);
        let position = catalog
            .iter()
            .position(|record| record.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        let removed = catalog.remove(position);
        self.commit(catalog).await?;

        info!(
            event_name = "catalog.record.deleted",
            image_id = %id,
            file_name = %removed.file_name,
            "image record deleted"
        );
        Ok(removed)
    }

    async fn commit(&self, catalog: Catalog) -> Result<(), CatalogError> {
        self.store.persist(&catalog).await?;
        self.store.replace_cache(catalog).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use tempfile::TempDir;

    use zarigani_core::errors::{CatalogError, ValidationError};
    use zarigani_core::ImageId;

    use super::CatalogRepository;
    use crate::store::CatalogStore;

    fn repository(dir: &TempDir) -> CatalogRepository {
        CatalogRepository::new(Arc::new(CatalogStore::new(dir.path().join("images.json"))))
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn insert_assigns_ids_above_the_current_maximum() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);

        let first = repo.insert("a.png", tags(&["喜"])).await.expect("insert a");
        let second = repo.insert("b.png", tags(&["怒"])).await.expect("insert b");
        repo.delete(second.id).await.expect("delete b");
        let third = repo.insert("c.png", tags(&["哀"])).await.expect("insert c");

        assert_eq!(first.id, ImageId(1));
        assert_eq!(second.id, ImageId(2));
        assert_eq!(third.id, ImageId(2));

        let reloaded = repo.store().load_catalog(true).await.expect("reload");
        let matches = reloaded.iter().filter(|record| record.file_name == "c.png").count();
        assert_eq!(matches, 1);
    }

    #[tokio::test]
    async fn insert_rejects_blank_tags_and_unsafe_names() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);

        let blank = repo.insert("a.png", tags(&[" "])).await.expect_err("blank tag");
        let unsafe_name = repo.insert("../a.png", tags(&["x"])).await.expect_err("bad name");

        assert!(matches!(
            blank,
            CatalogError::Validation(ValidationError::BlankTag { index: 0 })
        ));
        assert!(matches!(unsafe_name, CatalogError::Validation(ValidationError::InvalidFileName(_))));
    }

    #[tokio::test]
    async fn duplicate_file_name_is_a_conflict() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);

        repo.insert("a.png", tags(&["x"])).await.expect("insert");
        let error = repo.insert("a.png", tags(&["y"])).await.expect_err("duplicate");

        assert!(matches!(error, CatalogError::FileExists(ref name) if name == "a.png"));
    }

    #[tokio::test]
    async fn update_replaces_tags_and_reports_missing_ids() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        let record = repo.insert("a.png", tags(&["x"])).await.expect("insert");

        let updated = repo.update(record.id, tags(&["楽", "遊ぶ"])).await.expect("update");
        let missing = repo.update(ImageId(99), tags(&["x"])).await.expect_err("missing");
        let empty = repo.update(record.id, Vec::new()).await.expect_err("empty tags");

        assert_eq!(updated.tags, tags(&["楽", "遊ぶ"]));
        assert_eq!(repo.find(record.id).await.expect("find"), Some(updated));
        assert!(matches!(missing, CatalogError::NotFound(ImageId(99))));
        assert!(matches!(empty, CatalogError::Validation(ValidationError::EmptyTags)));
    }

    #[tokio::test]
    async fn deleted_file_names_disappear_from_listings() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        let keep = repo.insert("keep.png", tags(&["x"])).await.expect("insert keep");
        let gone = repo.insert("gone.png", tags(&["x"])).await.expect("insert gone");

        let removed = repo.delete(gone.id).await.expect("delete");
        let names = repo.list_file_names().await.expect("names");

        assert_eq!(removed.file_name, "gone.png");
        assert_eq!(names, vec![keep.file_name]);
        assert!(matches!(
            repo.delete(gone.id).await.expect_err("second delete"),
            CatalogError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn concurrent_inserts_never_share_an_id() {
        let dir = TempDir::new().expect("tempdir");
        let repo = Arc::new(repository(&dir));

        let handles: Vec<_> = (0..16)
            .map(|index| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.insert(&format!("{index}.png"), vec!["x".to_string()]).await
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let record = handle.await.expect("join").expect("insert");
            ids.insert(record.id);
        }

        assert_eq!(ids.len(), 16);
        assert_eq!(repo.list().await.expect("list").len(), 16);
    }
}
