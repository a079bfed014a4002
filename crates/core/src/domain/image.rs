use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the persisted image catalog.
///
/// Field names match the on-disk document: `{"id": 1, "file_name": "...", "tags": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub file_name: String,
    pub tags: Vec<String>,
}

impl ImageRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

/// The full catalog in append order. Ids are unique but may be sparse.
pub type Catalog = Vec<ImageRecord>;

/// Next id is one past the current maximum, so ids freed by deletions are never reused
/// while a larger id is still present.
pub fn next_image_id(catalog: &[ImageRecord]) -> ImageId {
    let current_max = catalog.iter().map(|record| record.id.0).max().unwrap_or(0);
    ImageId(current_max + 1)
}

pub fn find_by_id(catalog: &[ImageRecord], id: ImageId) -> Option<&ImageRecord> {
    catalog.iter().find(|record| record.id == id)
}
