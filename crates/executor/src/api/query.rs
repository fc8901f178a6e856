//! Query, analytics, search and view operations.

use syncbase_core::Value;

use super::{unexpected, Cluster};
use crate::{Command, Output, Result};

impl Cluster {
    /// Run a query statement.
    pub fn query(&self, statement: &str, options: &Value) -> Result<Value> {
        match self.execute(Command::Query {
            statement: statement.to_string(),
            options: options.clone(),
        })? {
            Output::Query(value) => Ok(value),
            _ => Err(unexpected("query")),
        }
    }

    pub fn analytics_query(&self, statement: &str, options: &Value) -> Result<Value> {
        match self.execute(Command::AnalyticsQuery {
            statement: statement.to_string(),
            options: options.clone(),
        })? {
            Output::Analytics(value) => Ok(value),
            _ => Err(unexpected("analytics_query")),
        }
    }

    /// Run the encoded search `query` against `index_name`.
    pub fn search_query(&self, index_name: &str, query: &str, options: &Value) -> Result<Value> {
        match self.execute(Command::SearchQuery {
            index_name: index_name.to_string(),
            query: query.to_string(),
            options: options.clone(),
        })? {
            Output::Search(value) => Ok(value),
            _ => Err(unexpected("search_query")),
        }
    }

    /// Query a view. `name_space` is 1 for development, 2 for production.
    pub fn view_query(
        &self,
        bucket: &str,
        design_document: &str,
        view: &str,
        name_space: i64,
        options: &Value,
    ) -> Result<Value> {
        match self.execute(Command::ViewQuery {
            bucket: bucket.to_string(),
            design_document: design_document.to_string(),
            view: view.to_string(),
            name_space,
            options: options.clone(),
        })? {
            Output::View(value) => Ok(value),
            _ => Err(unexpected("view_query")),
        }
    }

    /// Create or update a search index from its definition mapping.
    pub fn search_index_upsert(&self, index: &Value, options: &Value) -> Result<Value> {
        match self.execute(Command::SearchIndexUpsert {
            index: index.clone(),
            options: options.clone(),
        })? {
            Output::SearchIndex(value) => Ok(value),
            _ => Err(unexpected("search_index_upsert")),
        }
    }
}
