//! Web search port used by the agent's tool loop.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use sms_ai_types::error::SearchError;

/// A web search backend. Results are returned as raw JSON and handed to the
/// model verbatim as a tool result.
pub trait SearchTool: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    fn search(&self, query: &str) -> impl Future<Output = Result<Value, SearchError>> + Send;
}

/// Object-safe version of [`SearchTool`].
pub trait SearchToolDyn: Send + Sync {
    fn name(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Value, SearchError>> + Send + 'a>>;
}

impl<T: SearchTool> SearchToolDyn for T {
    fn name(&self) -> &str {
        SearchTool::name(self)
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Value, SearchError>> + Send + 'a>> {
        Box::pin(self.search(query))
    }
}

/// Type-erased search backend.
pub struct BoxSearchTool {
    inner: Box<dyn SearchToolDyn + Send + Sync>,
}

impl BoxSearchTool {
    pub fn new<T: SearchTool + 'static>(tool: T) -> Self {
        Self {
            inner: Box::new(tool),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn search(&self, query: &str) -> Result<Value, SearchError> {
        self.inner.search_boxed(query).await
    }
}

impl std::fmt::Debug for BoxSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSearchTool")
            .field("name", &self.name())
            .finish()
    }
}
