mod async_graphql_schema;

use futures_util::stream::BoxStream;
use graphql_operation_synthesis::OperationDocument;
use serde_json::{Map, Value};

use crate::{ExecutionContext, Response, StreamError};

pub use self::async_graphql_schema::AsyncGraphqlExecutor;

pub struct ExecutionRequest<'a> {
    pub document: &'a OperationDocument,
    /// The rendered document.
    pub query: &'a str,
    pub operation_name: &'a str,
    /// Already coerced against the operation's variable definitions.
    pub variables: Map<String, Value>,
    pub context: ExecutionContext,
}

pub enum ExecutionOutcome {
    /// A live stream of results, one push per item.
    Stream(BoxStream<'static, Result<Response, StreamError>>),
    /// The subscription ended before producing a stream, typically because of request errors.
    Response(Response),
}

/// Executes subscription operations against a schema.
#[async_trait::async_trait]
pub trait SubscriptionExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionOutcome;
}
