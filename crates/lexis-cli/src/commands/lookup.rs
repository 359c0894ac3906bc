//! Lookup command implementation

use std::sync::Arc;

use anyhow::Result;
use lexis_core::{
    Config, DictionaryParser, Endpoints, Fetcher, FindWordByDictionaryRequest, SqliteStore, service,
};
use tracing::debug;

use crate::output::{OutputFormat, render};

/// Look `word` up for `user` and print the entries.
pub async fn execute(
    store: &SqliteStore,
    config: &Config,
    word: &str,
    user: &str,
    format: OutputFormat,
) -> Result<()> {
    let fetcher = Fetcher::from_config(&config.fetch)?;
    let lookup = service::new(store.clone(), fetcher, DictionaryParser::new()?);
    let endpoints = Endpoints::new(Arc::new(lookup));

    let response = endpoints
        .find_word_by_dictionary(FindWordByDictionaryRequest::new(word, user))
        .await?;
    debug!("Lookup returned {} entries", response.entries.len());

    println!("{}", render(&response, format)?);
    Ok(())
}
