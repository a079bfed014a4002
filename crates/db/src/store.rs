//! JSON-file catalog persistence with a time-bounded in-process cache.
//!
//! The whole catalog lives in one JSON array that is read and rewritten wholesale. Reads
//! are served from the cache until it is forced, expires, or holds nothing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use zarigani_core::errors::CatalogError;
use zarigani_core::Catalog;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Debug)]
struct CachedCatalog {
    catalog: Arc<Catalog>,
    loaded_at: Instant,
}

pub struct CatalogStore {
    path: PathBuf,
    ttl: Duration,
    cache: RwLock<Option<CachedCatalog>>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { path: path.into(), ttl, cache: RwLock::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached catalog, reading the document again when `force_reload` is set,
    /// nothing has been loaded yet, or the cache is older than the TTL. An empty catalog is
    /// cached like any other. A failed read leaves the cache as it was.
    pub async fn load_catalog(&self, force_reload: bool) -> Result<Arc<Catalog>, CatalogError> {
        if !force_reload {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.catalog));
                }
            }
        }

        let catalog = Arc::new(read_catalog(&self.path).await?);
        debug!(
            event_name = "catalog.store.loaded",
            path = %self.path.display(),
            records = catalog.len(),
            forced = force_reload,
            "catalog document loaded"
        );
        self.store_cache(Arc::clone(&catalog)).await;
        Ok(catalog)
    }

    /// Writes the full catalog to a temporary sibling file and renames it over the
    /// document, so readers never observe a partial write.
    pub async fn persist(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let body = serde_json::to_vec_pretty(catalog).map_err(CatalogError::Serialize)?;

        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|source| CatalogError::io(&parent, source))?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".to_string());
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        if let Err(source) = tokio::fs::write(&temp_path, &body).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CatalogError::io(&temp_path, source));
        }
        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CatalogError::io(&self.path, source));
        }

        info!(
            event_name = "catalog.store.persisted",
            path = %self.path.display(),
            records = catalog.len(),
            "catalog document written"
        );
        Ok(())
    }

    pub async fn replace_cache(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        self.store_cache(Arc::clone(&catalog)).await;
        catalog
    }

    /// When the cache was last filled, if ever.
    pub async fn cached_at(&self) -> Option<Instant> {
        self.cache.read().await.as_ref().map(|cached| cached.loaded_at)
    }

    async fn store_cache(&self, catalog: Arc<Catalog>) {
        let mut cache = self.cache.write().await;
        *cache = Some(CachedCatalog { catalog, loaded_at: Instant::now() });
    }
}

async fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Catalog::new()),
        Err(source) => return Err(CatalogError::io(path, source)),
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Catalog::new());
    }

    serde_json::from_slice(&raw)
        .map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
}
