//! Entry store backed by SQLite.
//!
//! ## Schema
//!
//! ```text
//! entries            one row per parsed sense; examples stored as JSON
//! entry_query_keys   (entry_id, query_key) lookup relation, indexed by key
//! favorites          (id, user_id, entry_id) per-user bookmarks
//! ```
//!
//! The read path joins `entries` against `favorites` for a single user and
//! returns entries in `order_rank` order. The write path inserts a whole parse
//! batch in one transaction.
//!
//! ## Concurrency
//!
//! The store wraps a [`tokio_rusqlite::Connection`], which runs every call on
//! a dedicated thread, so a `SqliteStore` can be shared between tasks behind an
//! `Arc`. The store does not guard against two lookups inserting the same word
//! concurrently.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lexis_core::{EntryStore, SqliteStore};
//!
//! # async fn demo() -> lexis_core::Result<()> {
//! let store = SqliteStore::open_in_memory().await?;
//! let entries = store.find_by_query_key("run", "user-1").await?;
//! assert!(entries.is_empty());
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::{Entry, EntryId, Error, Example, FavoriteId, Pronunciation, Result};

/// Persistence gateway used by the lookup pipeline.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Entries retrievable under `word`, with `favorite_marker_id` set for `user_id`.
    ///
    /// Sorted ascending by `order_rank`. An empty result means the word has
    /// not been cached yet.
    async fn find_by_query_key(&self, word: &str, user_id: &str) -> Result<Vec<Entry>>;

    /// Insert a parse batch.
    ///
    /// Ids and favorite markers on the inputs are ignored; timestamps are
    /// stamped by the store.
    async fn insert_all(&self, entries: Vec<Entry>) -> Result<()>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    word                    TEXT NOT NULL,
    part_of_speech          TEXT NOT NULL,
    grammar_note            TEXT NOT NULL,
    pronunciation_text      TEXT NOT NULL,
    uk_audio_url            TEXT NOT NULL,
    us_audio_url            TEXT NOT NULL,
    definition_grammar_note TEXT NOT NULL,
    definition              TEXT NOT NULL,
    examples                TEXT NOT NULL,
    order_rank              INTEGER NOT NULL,
    query_keys              TEXT NOT NULL,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entry_query_keys (
    entry_id  INTEGER NOT NULL REFERENCES entries(id),
    query_key TEXT NOT NULL,
    PRIMARY KEY (entry_id, query_key)
);

CREATE INDEX IF NOT EXISTS idx_entry_query_keys_key ON entry_query_keys(query_key);

CREATE TABLE IF NOT EXISTS favorites (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL,
    entry_id   INTEGER NOT NULL REFERENCES entries(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_favorites_entry_user ON favorites(entry_id, user_id);
";

// Stages:
//   1. match entries whose query keys contain ?1
//   2. left-join favorites on entry id, restricted to user ?2
//   3. favorite marker = first joined favorite id, else NULL
//   4. only the marker leaves the join
//   5. order by rank (id breaks ties)
const FIND_BY_QUERY_KEY: &str = "
SELECT e.id, e.word, e.part_of_speech, e.grammar_note,
       e.pronunciation_text, e.uk_audio_url, e.us_audio_url,
       e.definition_grammar_note, e.definition, e.examples,
       e.order_rank, e.query_keys, e.created_at, e.updated_at,
       (SELECT f.id FROM favorites f
         WHERE f.entry_id = e.id AND f.user_id = ?2
         ORDER BY f.id
         LIMIT 1) AS favorite_id
  FROM entries e
 WHERE e.id IN (SELECT k.entry_id FROM entry_query_keys k WHERE k.query_key = ?1)
 ORDER BY e.order_rank ASC, e.id ASC
";

const INSERT_ENTRY: &str = "
INSERT INTO entries (
    word, part_of_speech, grammar_note,
    pronunciation_text, uk_audio_url, us_audio_url,
    definition_grammar_note, definition, examples,
    order_rank, query_keys, created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
";

const INSERT_QUERY_KEY: &str =
    "INSERT OR IGNORE INTO entry_query_keys (entry_id, query_key) VALUES (?1, ?2)";

/// Raw row as read from SQLite; JSON columns are decoded outside the
/// connection thread.
struct EntryRow {
    id: i64,
    word: String,
    part_of_speech: String,
    grammar_note: String,
    pronunciation_text: String,
    uk_audio_url: String,
    us_audio_url: String,
    definition_grammar_note: String,
    definition: String,
    examples: String,
    order_rank: u32,
    query_keys: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    favorite_id: Option<i64>,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            part_of_speech: row.get(2)?,
            grammar_note: row.get(3)?,
            pronunciation_text: row.get(4)?,
            uk_audio_url: row.get(5)?,
            us_audio_url: row.get(6)?,
            definition_grammar_note: row.get(7)?,
            definition: row.get(8)?,
            examples: row.get(9)?,
            order_rank: row.get(10)?,
            query_keys: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
            favorite_id: row.get(14)?,
        })
    }

    fn into_entry(self) -> Result<Entry> {
        let examples: Vec<Example> = serde_json::from_str(&self.examples)?;
        let query_keys: Vec<String> = serde_json::from_str(&self.query_keys)?;

        Ok(Entry {
            id: Some(EntryId(self.id)),
            word: self.word,
            part_of_speech: self.part_of_speech,
            grammar_note: self.grammar_note,
            pronunciation: Pronunciation {
                text: self.pronunciation_text,
                uk_audio_url: self.uk_audio_url,
                us_audio_url: self.us_audio_url,
            },
            definition_grammar_note: self.definition_grammar_note,
            definition: self.definition,
            examples,
            order_rank: self.order_rank,
            query_keys,
            favorite_marker_id: self.favorite_id.map(FavoriteId),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Entry serialized for insertion.
struct NewEntry {
    entry: Entry,
    examples: String,
    query_keys: String,
    created_at: DateTime<Utc>,
}

/// SQLite implementation of [`EntryStore`].
///
/// Clones share one background connection; [`SqliteStore::close`] closes it
/// for all of them.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Opening entry store at {}", path.display());
        let conn = Connection::open(path).await?;
        Self::init(conn).await
    }

    /// Open a private in-memory database (tests, one-off runs).
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }

    /// Close the underlying connection, flushing pending work.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Record that `user_id` bookmarked `entry_id`.
    pub async fn add_favorite(&self, user_id: &str, entry_id: EntryId) -> Result<FavoriteId> {
        let user_id = user_id.to_string();
        let now = Utc::now();

        let inserted = self
            .conn
            .call(move |conn| {
                let exists = conn
                    .query_row("SELECT 1 FROM entries WHERE id = ?1", params![entry_id.0], |_| Ok(()))
                    .optional()?;
                if exists.is_none() {
                    return Ok(None);
                }

                conn.execute(
                    "INSERT INTO favorites (user_id, entry_id, created_at) VALUES (?1, ?2, ?3)",
                    params![user_id, entry_id.0, now],
                )?;
                Ok(Some(conn.last_insert_rowid()))
            })
            .await?;

        inserted
            .map(FavoriteId)
            .ok_or_else(|| Error::NotFound(format!("entry {entry_id}")))
    }

    /// Number of stored entries (diagnostics and tests).
    pub async fn count_entries(&self) -> Result<usize> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn find_by_query_key(&self, word: &str, user_id: &str) -> Result<Vec<Entry>> {
        debug!("Querying entries for '{}' (user '{}')", word, user_id);
        let word = word.to_string();
        let user_id = user_id.to_string();

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(FIND_BY_QUERY_KEY)?;
                let rows = stmt
                    .query_map(params![word, user_id], EntryRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn insert_all(&self, entries: Vec<Entry>) -> Result<()> {
        if entries.is_empty() {
            debug!("Nothing to insert");
            return Ok(());
        }

        let now = Utc::now();
        let batch = entries
            .into_iter()
            .map(|entry| {
                if entry.query_keys.is_empty() {
                    return Err(Error::Storage(format!(
                        "entry '{}' (rank {}) has no query keys",
                        entry.word, entry.order_rank
                    )));
                }
                Ok(NewEntry {
                    examples: serde_json::to_string(&entry.examples)?,
                    query_keys: serde_json::to_string(&entry.query_keys)?,
                    created_at: entry.created_at.unwrap_or(now),
                    entry,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let count = batch.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut insert_entry = tx.prepare_cached(INSERT_ENTRY)?;
                    let mut insert_key = tx.prepare_cached(INSERT_QUERY_KEY)?;

                    for new in &batch {
                        let e = &new.entry;
                        insert_entry.execute(params![
                            e.word,
                            e.part_of_speech,
                            e.grammar_note,
                            e.pronunciation.text,
                            e.pronunciation.uk_audio_url,
                            e.pronunciation.us_audio_url,
                            e.definition_grammar_note,
                            e.definition,
                            new.examples,
                            e.order_rank,
                            new.query_keys,
                            new.created_at,
                            now,
                        ])?;
                        let entry_id = tx.last_insert_rowid();

                        for key in &e.query_keys {
                            insert_key.execute(params![entry_id, key])?;
                        }
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        debug!("Inserted {} entries", count);
        Ok(())
    }
}
