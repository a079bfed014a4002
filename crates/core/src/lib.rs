pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod jst;
pub mod notify;

pub use catalog::{DictionaryEntry, EmptySelection, TagDictionary};
pub use domain::emotion::Emotion;
pub use domain::image::{Catalog, ImageId, ImageRecord};
pub use errors::{CatalogError, InterfaceError, ValidationError};
pub use notify::{NoopNotificationSink, NotificationSink};
