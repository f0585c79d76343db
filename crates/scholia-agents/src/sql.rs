//! Text-to-SQL metadata retrieval.
//!
//! The model only ever produces the ID-selection half of the query; the
//! expansion into full joined records is a fixed parameterized statement
//! owned by the store. Generated SQL is treated as untrusted input and
//! statically checked before execution.

use tracing::{debug, info};

use scholia_common::models::MetadataRecord;
use scholia_db::MetadataStore;
use scholia_llm::{CompletionBackend, Message};

use crate::error::{AgentError, Result};
use crate::prompts;

/// Prefix the model puts in front of a generated query.
pub const SQL_PREFIX: &str = "SQL:";

/// Sentinel meaning no metadata filter is needed.
pub const NO_QUERY: &str = "NO_QUERY";

/// Strips the query prefix or recognizes the no-query sentinel.
///
/// `Ok(None)` means "no filter needed". A response with neither the
/// prefix nor the sentinel fails loudly; guessing at model output here
/// would run unvetted SQL.
pub fn preprocess_response(raw: &str) -> Result<Option<String>> {
    let response = raw.trim();
    if response.is_empty() {
        return Err(AgentError::EmptySqlResponse);
    }
    if response == NO_QUERY {
        return Ok(None);
    }
    if let Some(query) = response.strip_prefix(SQL_PREFIX) {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::EmptySqlResponse);
        }
        return Ok(Some(query.to_string()));
    }
    Err(AgentError::InvalidSqlResponse(response.to_string()))
}

pub struct MetadataAgent<B> {
    backend: B,
}

impl<B: CompletionBackend> MetadataAgent<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Asks the model for a paper-ID query scoped to `collection_id`.
    pub async fn generate_query(
        &self,
        intent: &str,
        collection_id: i64,
    ) -> Result<Option<String>> {
        let system = prompts::sql_system_prompt(scholia_db::schema::SCHEMA, collection_id)?;
        debug!(intent, collection_id, "requesting metadata query");
        let response = self
            .backend
            .complete(vec![Message::system(system), Message::user(intent)])
            .await?;
        preprocess_response(&response)
    }

    /// Full metadata retrieval: generate, validate, execute, expand.
    pub async fn fetch_metadata(
        &self,
        intent: &str,
        store: &MetadataStore,
        collection_id: i64,
    ) -> Result<Vec<MetadataRecord>> {
        let Some(query) = self.generate_query(intent, collection_id).await? else {
            info!("model declined to generate a metadata filter");
            return Ok(Vec::new());
        };
        info!(%query, "running generated metadata query");
        Ok(store.run_metadata_query(&query)?)
    }
}
