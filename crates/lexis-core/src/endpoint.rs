//! Typed request/response boundary for transports.
//!
//! Transports (the CLI, or an RPC server) build a
//! [`FindWordByDictionaryRequest`], and [`Endpoints`] validates it before it
//! reaches the [`WordService`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Entry, Error, Result, WordService};

/// Longest word accepted by the endpoint.
pub const MAX_WORD_LEN: usize = 128;

/// Request for `FindWordByDictionary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindWordByDictionaryRequest {
    /// Word to look up; surrounding whitespace is ignored.
    pub word: String,
    /// User whose favorites should be marked. May be empty for anonymous lookups.
    #[serde(default)]
    pub user_id: String,
}

impl FindWordByDictionaryRequest {
    /// Build a request.
    pub fn new(word: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            user_id: user_id.into(),
        }
    }

    /// Reject requests the pipeline cannot serve.
    pub fn validate(&self) -> Result<()> {
        let word = self.word.trim();
        if word.is_empty() {
            return Err(Error::InvalidRequest("word must not be empty".into()));
        }
        if word.chars().count() > MAX_WORD_LEN {
            return Err(Error::InvalidRequest(format!(
                "word must be at most {MAX_WORD_LEN} characters"
            )));
        }
        if word.chars().any(char::is_control) {
            return Err(Error::InvalidRequest("word must not contain control characters".into()));
        }
        Ok(())
    }
}

/// Response for `FindWordByDictionary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindWordByDictionaryResponse {
    /// Entries in page order.
    pub entries: Vec<Entry>,
}

/// Endpoint set over a shared [`WordService`].
#[derive(Clone)]
pub struct Endpoints {
    service: Arc<dyn WordService>,
}

impl Endpoints {
    /// Expose `service` through typed endpoints.
    pub fn new(service: Arc<dyn WordService>) -> Self {
        Self { service }
    }

    /// Validate `request` and run the lookup.
    pub async fn find_word_by_dictionary(
        &self,
        request: FindWordByDictionaryRequest,
    ) -> Result<FindWordByDictionaryResponse> {
        request.validate()?;
        debug!("FindWordByDictionary request for '{}'", request.word.trim());

        let entries = self
            .service
            .find_word_by_dictionary(request.word.trim(), &request.user_id)
            .await?;
        Ok(FindWordByDictionaryResponse { entries })
    }
}
