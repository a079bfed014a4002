use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in keyword → tag pairs, scanned in this order.
const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("嬉し", "喜"),
    ("うれし", "喜"),
    ("怒", "怒"),
    ("悲し", "哀"),
    ("寂し", "哀"),
    ("楽し", "楽"),
    ("寝", "寝る"),
    ("眠", "寝る"),
    ("食べ", "食べる"),
    ("ご飯", "食べる"),
    ("遊", "遊ぶ"),
    ("散歩", "散歩"),
    ("お風呂", "お風呂"),
    ("ザリガニ", "ザリガニ"),
    ("ハサミ", "ザリガニ"),
    ("脱皮", "脱皮"),
    ("水槽", "水槽"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub keyword: String,
    pub tag: String,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("could not read dictionary file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse dictionary file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("dictionary entry {index} has a blank keyword or tag")]
    BlankEntry { index: usize },
}

/// Ordered keyword → tag mapping consulted by keyword image search. Read-only after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagDictionary {
    entries: Vec<DictionaryEntry>,
}

impl Default for TagDictionary {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_ENTRIES.iter().copied())
    }
}

impl TagDictionary {
    pub fn from_pairs<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(keyword, tag)| DictionaryEntry { keyword: keyword.into(), tag: tag.into() })
            .collect();
        Self { entries }
    }

    /// Loads a JSON array of `{"keyword": .., "tag": ..}` objects. Array order is the scan
    /// order.
    pub fn load_json(path: &Path) -> Result<Self, DictionaryError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| DictionaryError::ReadFile { path: path.to_path_buf(), source })?;
        let entries: Vec<DictionaryEntry> = serde_json::from_str(&raw)
            .map_err(|source| DictionaryError::ParseFile { path: path.to_path_buf(), source })?;

        if let Some(index) = entries
            .iter()
            .position(|entry| entry.keyword.trim().is_empty() || entry.tag.trim().is_empty())
        {
            return Err(DictionaryError::BlankEntry { index });
        }

        Ok(Self { entries })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, DictionaryError> {
        match path {
            Some(path) => Self::load_json(path),
            None => Ok(Self::default()),
        }
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{DictionaryError, TagDictionary};

    #[test]
    fn default_dictionary_is_not_empty() {
        let dictionary = TagDictionary::default();
        assert!(!dictionary.is_empty());
        assert_eq!(dictionary.entries()[0].tag, "喜");
    }

    #[test]
    fn json_file_preserves_definition_order() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("dictionary.json");
        fs::write(
            &path,
            r#"[{"keyword":"遊ぶ","tag":"play"},{"keyword":"寝る","tag":"sleep"}]"#,
        )
        .expect("write dictionary");

        let dictionary = TagDictionary::load_json(&path).expect("dictionary loads");
        let keywords: Vec<&str> =
            dictionary.entries().iter().map(|entry| entry.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["遊ぶ", "寝る"]);
    }

    #[test]
    fn blank_entries_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("dictionary.json");
        fs::write(&path, r#"[{"keyword":"遊ぶ","tag":"play"},{"keyword":" ","tag":"x"}]"#)
            .expect("write dictionary");

        let error = TagDictionary::load_json(&path).expect_err("blank keyword is invalid");
        assert!(matches!(error, DictionaryError::BlankEntry { index: 1 }));
    }

    #[test]
    fn missing_path_falls_back_to_default() {
        let dictionary = TagDictionary::load_or_default(None).expect("default");
        assert_eq!(dictionary, TagDictionary::default());
    }
}
