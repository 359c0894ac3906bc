//! Cache-aside word lookup.
//!
//! [`DictionaryService`] answers "what does this word mean?" from the entry
//! store, populating the store from the dictionary site on a miss:
//!
//! ```text
//! Query ──hit──────────────────────────────────────────▶ Return
//!   │
//!   └─miss─▶ Populate: fetch ─▶ parse ─▶ insert ─▶ re-read ─▶ Return
//! ```
//!
//! There is one cache check, at most one populate cycle and one final
//! re-read; nothing is retried. Each failure is wrapped with the
//! [`LookupStage`] it happened in.
//!
//! Two concurrent misses for the same word both populate the store, leaving
//! duplicate entries behind. Callers that need exactly-once population must
//! serialize lookups per word themselves.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::{DictionaryParser, DocumentFetcher, Entry, EntryStore, LookupStage, Result};

/// The word lookup capability exposed to transports.
#[async_trait]
pub trait WordService: Send + Sync {
    /// Entries for `word`, with favorite markers for `user_id`.
    ///
    /// `word` is matched case-insensitively. An empty result is not an error.
    async fn find_word_by_dictionary(&self, word: &str, user_id: &str) -> Result<Vec<Entry>>;
}

/// Lower-case a lookup word. Every store key goes through this.
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
}

/// Cache-aside implementation of [`WordService`].
pub struct DictionaryService<S, F> {
    store: S,
    fetcher: F,
    parser: DictionaryParser,
}

impl<S, F> DictionaryService<S, F>
where
    S: EntryStore,
    F: DocumentFetcher,
{
    /// Create a service over a store, a page fetcher and a parser.
    pub const fn new(store: S, fetcher: F, parser: DictionaryParser) -> Self {
        Self {
            store,
            fetcher,
            parser,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetch, parse and persist the dictionary page for `word`.
    async fn populate(&self, word: &str) -> Result<()> {
        info!("'{}' not cached, fetching from dictionary", word);

        let html = self
            .fetcher
            .fetch_document(word)
            .await
            .map_err(|e| e.at_stage(LookupStage::Fetch))?;

        let entries = self.parser.parse(&html, word);
        info!("Parsed {} entries for '{}'", entries.len(), word);

        self.store
            .insert_all(entries)
            .await
            .map_err(|e| e.at_stage(LookupStage::Insert))
    }

    async fn query(&self, word: &str, user_id: &str) -> Result<Vec<Entry>> {
        self.store
            .find_by_query_key(word, user_id)
            .await
            .map_err(|e| e.at_stage(LookupStage::Query))
    }
}

#[async_trait]
impl<S, F> WordService for DictionaryService<S, F>
where
    S: EntryStore,
    F: DocumentFetcher,
{
    async fn find_word_by_dictionary(&self, word: &str, user_id: &str) -> Result<Vec<Entry>> {
        let word = normalize_word(word);

        let entries = self.query(&word, user_id).await?;
        if !entries.is_empty() {
            debug!("Cache hit for '{}': {} entries", word, entries.len());
            return Ok(entries);
        }

        self.populate(&word).await?;

        // Re-read so entries carry store ids and this user's favorite markers.
        self.query(&word, user_id).await
    }
}

/// Decorator that logs every call of the wrapped [`WordService`].
pub struct LoggingWordService<W> {
    next: W,
}

impl<W: WordService> LoggingWordService<W> {
    /// Wrap `next`.
    pub const fn new(next: W) -> Self {
        Self { next }
    }

    /// The wrapped service.
    pub const fn inner(&self) -> &W {
        &self.next
    }
}

#[async_trait]
impl<W: WordService> WordService for LoggingWordService<W> {
    async fn find_word_by_dictionary(&self, word: &str, user_id: &str) -> Result<Vec<Entry>> {
        debug!(method = "FindWordByDictionary", word, user_id, "start");
        let started = Instant::now();

        let result = self.next.find_word_by_dictionary(word, user_id).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(entries) => info!(
                method = "FindWordByDictionary",
                word,
                user_id,
                entries = entries.len(),
                elapsed_ms,
                "done"
            ),
            Err(err) => error!(
                method = "FindWordByDictionary",
                word,
                user_id,
                category = err.category(),
                elapsed_ms,
                "failed: {err}"
            ),
        }
        result
    }
}

/// Build the production service: the cache-aside lookup wrapped in logging.
pub fn new<S, F>(store: S, fetcher: F, parser: DictionaryParser) -> LoggingWordService<DictionaryService<S, F>>
where
    S: EntryStore,
    F: DocumentFetcher,
{
    LoggingWordService::new(DictionaryService::new(store, fetcher, parser))
}
