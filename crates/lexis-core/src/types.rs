use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a persisted [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

/// Store-assigned identifier of a favorite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phonetic spelling plus the two regional recordings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pronunciation {
    pub text: String,
    pub uk_audio_url: String,
    pub us_audio_url: String,
}

/// One example sentence, optionally with a recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// Empty when the page has no recording for the sentence.
    pub audio_url: String,
    pub text: String,
}

/// A bare example sentence or a grammar-pattern group of sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// Grammar pattern such as `"do something"`; empty for a bare sentence.
    pub pattern: String,
    pub sentences: Vec<Sentence>,
}

/// A single dictionary sense of a word.
///
/// `id`, `created_at` and `updated_at` are filled in by the store.
/// `favorite_marker_id` is computed per user on every read and is never
/// written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    /// Headword as printed on the source page.
    pub word: String,
    pub part_of_speech: String,
    pub grammar_note: String,
    pub pronunciation: Pronunciation,
    pub definition_grammar_note: String,
    pub definition: String,
    pub examples: Vec<Example>,
    /// Position of the sense within the parse that produced it.
    pub order_rank: u32,
    /// Lower-cased keys this entry is retrievable under.
    pub query_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_marker_id: Option<FavoriteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Whether the entry has been persisted.
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the entry is retrievable under `key`.
    pub fn matches_key(&self, key: &str) -> bool {
        self.query_keys.iter().any(|k| k == key)
    }
}

/// A user's bookmark on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: String,
    pub entry_id: EntryId,
    pub created_at: DateTime<Utc>,
}
