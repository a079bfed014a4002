use zarigani_core::Emotion;

pub const APOLOGY_TEXT: &str = "申し訳ありませんが、ザリガニねこの様子が分かりませんでした。";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedReply {
    pub emotion: Option<Emotion>,
    pub text: String,
}

/// Trims the reply and collapses every run of blank lines into a single newline.
pub fn normalize_reply(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n");
    let mut output = String::with_capacity(unified.len());
    let mut previous_newline = false;

    for ch in unified.trim().chars() {
        if ch == '\n' {
            if previous_newline {
                continue;
            }
            previous_newline = true;
        } else {
            previous_newline = false;
        }
        output.push(ch);
    }
    output
}

/// Reads the marker line of an emotion-tagged reply.
///
/// A one-character first line is a marker: it yields an emotion when it is one of 喜怒哀楽
/// and is dropped either way. The remaining lines are joined without separators, keeping
/// the spacing inside each line. Replies without a marker line are joined the same way and
/// carry no emotion.
pub fn extract_emotion(normalized: &str) -> ExtractedReply {
    let mut lines = normalized.split('\n');
    let first = lines.next().unwrap_or_default();
    let marker = first.trim();

    let mut marker_chars = marker.chars();
    match (marker_chars.next(), marker_chars.next()) {
        (Some(single), None) => ExtractedReply {
            emotion: Emotion::from_char(single),
            text: lines.collect::<String>().trim().to_string(),
        },
        _ => ExtractedReply {
            emotion: None,
            text: normalized.split('\n').collect::<String>().trim().to_string(),
        },
    }
}
