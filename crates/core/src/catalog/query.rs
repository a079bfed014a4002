use rand::Rng;
use thiserror::Error;

use crate::catalog::dictionary::TagDictionary;
use crate::domain::emotion::Emotion;
use crate::domain::image::ImageRecord;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("cannot pick from an empty selection")]
pub struct EmptySelection;

/// A record that matched during keyword search, together with the dictionary pair that
/// produced the match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordCandidate<'a> {
    pub record: &'a ImageRecord,
    pub keyword: &'a str,
    pub tag: &'a str,
}

pub fn pick_uniform<'a, T, R>(items: &'a [T], rng: &mut R) -> Result<&'a T, EmptySelection>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return Err(EmptySelection);
    }
    Ok(&items[rng.gen_range(0..items.len())])
}

pub fn select_by_emotion<R>(catalog: &[ImageRecord], emotion: Emotion, rng: &mut R) -> Option<String>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&ImageRecord> =
        catalog.iter().filter(|record| record.has_tag(emotion.as_tag())).collect();
    pick_uniform(&candidates, rng).ok().map(|record| record.file_name.clone())
}

/// Candidates from every matching keyword are pooled before picking, so a later keyword
/// is as likely to win as the first one.
pub fn keyword_candidates<'a>(
    catalog: &'a [ImageRecord],
    text: &str,
    dictionary: &'a TagDictionary,
) -> Vec<KeywordCandidate<'a>> {
    let mut candidates = Vec::new();
    for entry in dictionary.entries() {
        if !text.contains(entry.keyword.as_str()) {
            continue;
        }
        candidates.extend(catalog.iter().filter(|record| record.has_tag(&entry.tag)).map(
            |record| KeywordCandidate {
                record,
                keyword: entry.keyword.as_str(),
                tag: entry.tag.as_str(),
            },
        ));
    }
    candidates
}

pub fn select_by_keyword<R>(
    catalog: &[ImageRecord],
    text: &str,
    dictionary: &TagDictionary,
    rng: &mut R,
) -> Option<String>
where
    R: Rng + ?Sized,
{
    let candidates = keyword_candidates(catalog, text, dictionary);
    pick_uniform(&candidates, rng).ok().map(|candidate| candidate.record.file_name.clone())
}

pub fn select_random<R>(catalog: &[ImageRecord], rng: &mut R) -> Result<String, EmptySelection>
where
    R: Rng + ?Sized,
{
    pick_uniform(catalog, rng).map(|record| record.file_name.clone())
}
