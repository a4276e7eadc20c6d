use std::sync::Arc;

/// What the caller knows about the request that started a subscription.
#[derive(Debug, Clone, Default)]
pub struct ContextInputs {
    pub headers: http::HeaderMap,
}

impl ContextInputs {
    pub fn from_headers(headers: http::HeaderMap) -> Self {
        ContextInputs { headers }
    }
}

/// Request-scoped data handed to the executor for the lifetime of a subscription.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub headers: http::HeaderMap,
    pub extensions: http::Extensions,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ContextError(pub String);

/// Builds the execution context of a subscription from the caller's inputs.
///
/// Runs once per start, so a failing resolver prevents the session from being created.
#[async_trait::async_trait]
pub trait ContextResolver: Send + Sync {
    async fn resolve(&self, inputs: &ContextInputs) -> Result<ExecutionContext, ContextError>;
}

/// Forwards the caller's headers and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadersContextResolver;

#[async_trait::async_trait]
impl ContextResolver for HeadersContextResolver {
    async fn resolve(&self, inputs: &ContextInputs) -> Result<ExecutionContext, ContextError> {
        Ok(ExecutionContext {
            headers: inputs.headers.clone(),
            extensions: http::Extensions::new(),
        })
    }
}

#[async_trait::async_trait]
impl<F> ContextResolver for F
where
    F: Fn(&ContextInputs) -> Result<ExecutionContext, ContextError> + Send + Sync,
{
    async fn resolve(&self, inputs: &ContextInputs) -> Result<ExecutionContext, ContextError> {
        self(inputs)
    }
}

pub(crate) type SharedContextResolver = Arc<dyn ContextResolver>;
