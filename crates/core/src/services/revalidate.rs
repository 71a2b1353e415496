//! Rendered-page revalidation hook.
//!
//! The frontend pre-renders profile pages; follow toggles and new tweets
//! leave those renders stale. Mutation services signal the frontend through
//! this hook, fire-and-forget: a missing or failing listener never affects
//! the mutation's outcome.

use async_trait::async_trait;
use chirp_common::{AppError, AppResult};
use std::sync::Arc;

/// Trait for invalidating pre-rendered pages.
///
/// This allows the core services to signal the frontend without directly
/// depending on its transport.
#[async_trait]
pub trait PageInvalidator: Send + Sync {
    /// Request a re-render of the page at `path`.
    async fn invalidate(&self, path: &str) -> AppResult<()>;
}

/// Shared invalidator handle.
pub type SharedInvalidator = Arc<dyn PageInvalidator>;

/// Invalidator that posts to the frontend's revalidation endpoint.
#[derive(Clone)]
pub struct HttpPageInvalidator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPageInvalidator {
    /// Create a new HTTP invalidator for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PageInvalidator for HttpPageInvalidator {
    async fn invalidate(&self, path: &str) -> AppResult<()> {
        self.client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::debug!(path = %path, "Requested page revalidation");
        Ok(())
    }
}

/// No-op invalidator for tests and setups without a frontend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpInvalidator;

#[async_trait]
impl PageInvalidator for NoOpInvalidator {
    async fn invalidate(&self, _path: &str) -> AppResult<()> {
        Ok(())
    }
}
