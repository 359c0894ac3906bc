//! # lexis-core
//!
//! Core functionality for lexis, a cache-aside dictionary lookup service.
//!
//! A lookup for a word first reads the local store. On a miss the dictionary
//! page for the word is fetched, parsed into entries, persisted, and the store
//! is read again, so the caller always sees stored rows with ids and the
//! requesting user's favorite markers.
//!
//! ## Architecture
//!
//! - **Configuration**: TOML settings for the page source and the store location
//! - **Fetching**: HTTP retrieval of dictionary pages behind [`DocumentFetcher`]
//! - **Parsing**: HTML extraction of entries with [`DictionaryParser`]
//! - **Storage**: SQLite persistence and favorite joins behind [`EntryStore`]
//! - **Service**: the lookup orchestration and its logging decorator
//! - **Endpoint**: typed request/response pair for transports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lexis_core::{Config, DictionaryParser, Fetcher, SqliteStore, service};
//! use lexis_core::WordService;
//!
//! # async fn run() -> lexis_core::Result<()> {
//! let config = Config::load()?;
//! let store = SqliteStore::open(&config.store.path).await?;
//! let fetcher = Fetcher::from_config(&config.fetch)?;
//! let lookup = service::new(store, fetcher, DictionaryParser::new()?);
//!
//! for entry in lookup.find_word_by_dictionary("run", "user-1").await? {
//!     println!("{} ({}): {}", entry.word, entry.part_of_speech, entry.definition);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures inside the lookup pipeline are wrapped with the stage that failed:
//!
//! ```rust
//! use lexis_core::{Error, LookupStage};
//!
//! let err = Error::Http { url: "https://example.com".into(), status: 503 }
//!     .at_stage(LookupStage::Fetch);
//! assert!(err.to_string().starts_with("fetch failed"));
//! assert!(err.is_recoverable());
//! ```

/// Configuration loading, overrides and validation
pub mod config;
/// Typed request/response boundary
pub mod endpoint;
/// Error types and result aliases
pub mod error;
/// HTTP fetching of dictionary pages
pub mod fetcher;
/// HTML extraction of dictionary entries
pub mod parser;
/// Lookup orchestration and logging decorator
pub mod service;
/// SQLite persistence for entries and favorites
pub mod storage;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig, StoreConfig};
pub use endpoint::{Endpoints, FindWordByDictionaryRequest, FindWordByDictionaryResponse};
pub use error::{Error, LookupStage, Result};
pub use fetcher::{DocumentFetcher, Fetcher};
pub use parser::DictionaryParser;
pub use service::{DictionaryService, LoggingWordService, WordService, normalize_word};
pub use storage::{EntryStore, SqliteStore};
pub use types::*;
