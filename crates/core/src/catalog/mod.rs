//! Catalog rules that do not touch the disk: image selection, upload validation and the
//! keyword dictionary. Persistence lives in `zarigani-db`.

pub mod dictionary;
pub mod query;
pub mod validation;

pub use dictionary::{DictionaryEntry, DictionaryError, TagDictionary};
pub use query::{
    keyword_candidates, pick_uniform, select_by_emotion, select_by_keyword, select_random, EmptySelection,
    KeywordCandidate,
};
pub use validation::{
    file_extension, generate_file_name, validate_credential, validate_file_name,
    validate_file_size, validate_file_type, validate_tags, DEFAULT_MAX_FILE_SIZE_BYTES,
};
