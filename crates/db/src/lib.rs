pub mod files;
pub mod mutations;
pub mod repository;
pub mod store;

pub use files::{ImageDirectory, ImageStorage};
pub use mutations::{CatalogMutations, UploadedImage};
pub use repository::CatalogRepository;
pub use store::CatalogStore;
