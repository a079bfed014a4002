use std::fmt;

use serde::{Deserialize, Serialize};

/// Emotion marker used both as the first line of a tagged generator reply and as an image tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "喜")]
    Joy,
    #[serde(rename = "怒")]
    Anger,
    #[serde(rename = "哀")]
    Sorrow,
    #[serde(rename = "楽")]
    Comfort,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Self::Joy, Self::Anger, Self::Sorrow, Self::Comfort];

    pub fn from_char(value: char) -> Option<Self> {
        match value {
            '喜' => Some(Self::Joy),
            '怒' => Some(Self::Anger),
            '哀' => Some(Self::Sorrow),
            '楽' => Some(Self::Comfort),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Joy => '喜',
            Self::Anger => '怒',
            Self::Sorrow => '哀',
            Self::Comfort => '楽',
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Joy => "喜",
            Self::Anger => "怒",
            Self::Sorrow => "哀",
            Self::Comfort => "楽",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
