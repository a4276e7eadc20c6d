use std::sync::Arc;

use futures_util::{stream::BoxStream, FutureExt, StreamExt};
use graphql_operation_synthesis::{Schema, SchemaError};

use super::{ExecutionOutcome, ExecutionRequest, SubscriptionExecutor};
use crate::{ExecutionContext, Response};

/// Erases the query, mutation and subscription type parameters of an `async_graphql::Schema`
/// so the executor can be used as a trait object.
trait ErasedSchema: Send + Sync {
    fn execute_stream(&self, request: async_graphql::Request) -> BoxStream<'static, async_graphql::Response>;

    fn sdl(&self) -> String;
}

impl<Q, M, S> ErasedSchema for async_graphql::Schema<Q, M, S>
where
    Q: async_graphql::ObjectType + 'static,
    M: async_graphql::ObjectType + 'static,
    S: async_graphql::SubscriptionType + 'static,
{
    fn execute_stream(&self, request: async_graphql::Request) -> BoxStream<'static, async_graphql::Response> {
        Box::pin(async_graphql::Schema::execute_stream(self, request))
    }

    fn sdl(&self) -> String {
        async_graphql::Schema::sdl(self)
    }
}

/// Runs subscriptions on an in-process `async-graphql` schema.
///
/// The caller's headers and extensions are available to resolvers as context data
/// (`ctx.data::<http::HeaderMap>()`).
#[derive(Clone)]
pub struct AsyncGraphqlExecutor {
    schema: Arc<dyn ErasedSchema>,
}

impl AsyncGraphqlExecutor {
    pub fn new<Q, M, S>(schema: async_graphql::Schema<Q, M, S>) -> Self
    where
        Q: async_graphql::ObjectType + 'static,
        M: async_graphql::ObjectType + 'static,
        S: async_graphql::SubscriptionType + 'static,
    {
        AsyncGraphqlExecutor {
            schema: Arc::new(schema),
        }
    }

    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// The type graph of the executable schema, as used for synthesis.
    pub fn graph(&self) -> Result<Schema, SchemaError> {
        Schema::from_sdl(&self.sdl())
    }
}

#[async_trait::async_trait]
impl SubscriptionExecutor for AsyncGraphqlExecutor {
    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionOutcome {
        let ExecutionContext { headers, extensions } = request.context;

        let request = async_graphql::Request::new(request.query)
            .operation_name(request.operation_name)
            .variables(async_graphql::Variables::from_json(serde_json::Value::Object(
                request.variables,
            )))
            .data(headers)
            .data(extensions);

        let mut stream = self.schema.execute_stream(request);

        // Request errors are produced on the first poll, without waiting on any resolver, and
        // close the stream right away. A failing first event keeps the stream open.
        let first = match stream.next().now_or_never() {
            None => return ExecutionOutcome::Stream(stream.map(|response| Ok(into_response(response))).boxed()),
            Some(None) => return ExecutionOutcome::Response(Response::default()),
            Some(Some(first)) => first,
        };

        let mut head = vec![first];
        let ended = match stream.next().now_or_never() {
            Some(None) => true,
            Some(Some(second)) => {
                head.push(second);
                false
            }
            None => false,
        };

        if ended {
            if head[0].is_err() && head[0].data == async_graphql::Value::Null {
                return ExecutionOutcome::Response(into_response(head.remove(0)));
            }
            return ExecutionOutcome::Stream(
                futures_util::stream::iter(head)
                    .map(|response| Ok(into_response(response)))
                    .boxed(),
            );
        }

        ExecutionOutcome::Stream(
            futures_util::stream::iter(head)
                .chain(stream)
                .map(|response| Ok(into_response(response)))
                .boxed(),
        )
    }
}

fn into_response(response: async_graphql::Response) -> Response {
    serde_json::to_value(&response)
        .and_then(serde_json::from_value)
        .unwrap_or_else(|err| Response::error(format!("could not convert the execution result: {err}")))
}
