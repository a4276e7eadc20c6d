//! Subscription sessions: each started subscription runs as a detached task pumping its result
//! stream into the delivery sink until it completes, fails or is stopped.

mod session;

use std::{collections::HashMap, sync::Arc};

use futures_util::{
    future::{AbortHandle, Abortable},
    stream::BoxStream,
    StreamExt,
};
use graphql_operation_synthesis::{build_root_operations, OperationDocument, OperationKind, Schema, SynthesisOptions};
use tracing::Instrument;
use url::Url;

use self::session::{Session, SessionStore};
use crate::{
    bind::bind_variables,
    context::{ContextResolver, HeadersContextResolver, SharedContextResolver},
    BuildError, ContextInputs, DeliverySink, ExecutionOutcome, ExecutionRequest, GraphqlError, Response, StartRequest,
    StartResponse, StopResponse, StreamError, SubscriptionError, SubscriptionExecutor, UpdateRequest,
};

pub use self::session::{SessionId, SessionInfo};

/// A subscription operation synthesized once, when the manager is built.
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    pub document: OperationDocument,
    /// `document` rendered as GraphQL text.
    pub query: String,
}

impl PreparedOperation {
    fn new(document: OperationDocument) -> Self {
        PreparedOperation {
            query: document.to_string(),
            document,
        }
    }

    pub fn operation_name(&self) -> &str {
        self.document.operation_name()
    }
}

#[derive(Clone)]
pub struct SubscriptionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    schema: Schema,
    operations: HashMap<String, PreparedOperation>,
    executor: Arc<dyn SubscriptionExecutor>,
    context_resolver: SharedContextResolver,
    sink: DeliverySink,
    sessions: Arc<SessionStore>,
}

pub struct SubscriptionManagerBuilder {
    schema: Schema,
    executor: Arc<dyn SubscriptionExecutor>,
    sink: DeliverySink,
    options: SynthesisOptions,
    context_resolver: SharedContextResolver,
}

impl SubscriptionManagerBuilder {
    pub fn with_options(mut self, options: SynthesisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_context_resolver(mut self, resolver: impl ContextResolver + 'static) -> Self {
        self.context_resolver = Arc::new(resolver);
        self
    }

    /// Synthesizes one operation per field of the subscription root type.
    pub fn build(self) -> Result<SubscriptionManager, BuildError> {
        if self.schema.subscription_type().is_none() {
            return Err(BuildError::MissingSubscriptionType);
        }

        let operations = build_root_operations(&self.schema, OperationKind::Subscription, &self.options)?
            .into_iter()
            .map(|document| (document.root_field().name.clone(), PreparedOperation::new(document)))
            .collect::<HashMap<_, _>>();

        tracing::info!(operations = operations.len(), "prepared subscription operations");

        Ok(SubscriptionManager {
            inner: Arc::new(ManagerInner {
                schema: self.schema,
                operations,
                executor: self.executor,
                context_resolver: self.context_resolver,
                sink: self.sink,
                sessions: Arc::new(SessionStore::default()),
            }),
        })
    }
}

impl SubscriptionManager {
    pub fn builder(
        schema: Schema,
        executor: impl SubscriptionExecutor + 'static,
        sink: DeliverySink,
    ) -> SubscriptionManagerBuilder {
        SubscriptionManagerBuilder {
            schema,
            executor: Arc::new(executor),
            sink,
            options: SynthesisOptions::default(),
            context_resolver: Arc::new(HeadersContextResolver),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn operation(&self, field: &str) -> Option<&PreparedOperation> {
        self.inner.operations.get(field)
    }

    pub fn operations(&self) -> impl Iterator<Item = &PreparedOperation> {
        self.inner.operations.values()
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.inner.sessions.contains(id)
    }

    pub fn session(&self, id: &SessionId) -> Option<SessionInfo> {
        self.inner.sessions.get(id)
    }

    /// Executes the subscription and, if it produced a stream, registers a session pushing
    /// every result to `request.url`.
    pub async fn start(
        &self,
        request: StartRequest,
        inputs: &ContextInputs,
    ) -> Result<StartResponse, SubscriptionError> {
        let StartRequest {
            subscription,
            variables,
            url,
        } = request;

        let Some(operation) = self.inner.operations.get(&subscription) else {
            return Err(SubscriptionError::UnknownSubscriptionField(subscription));
        };

        let context = self
            .inner
            .context_resolver
            .resolve(inputs)
            .await
            .map_err(|err| SubscriptionError::Execution {
                field: subscription.clone(),
                message: err.to_string(),
            })?;

        let variables = match bind_variables(&self.inner.schema, operation.document.variables(), &variables) {
            Ok(variables) => variables,
            Err(errors) => {
                tracing::debug!(field = %subscription, errors = errors.len(), "rejected subscription variables");
                return Ok(StartResponse::Result(Response::from_errors(
                    errors.into_iter().map(GraphqlError::from),
                )));
            }
        };

        let outcome = self
            .inner
            .executor
            .execute(ExecutionRequest {
                document: &operation.document,
                query: &operation.query,
                operation_name: operation.operation_name(),
                variables,
                context,
            })
            .await;

        let stream = match outcome {
            ExecutionOutcome::Stream(stream) => stream,
            ExecutionOutcome::Response(response) => {
                tracing::debug!(field = %subscription, "subscription ended without a stream");
                return Ok(StartResponse::Result(response));
            }
        };

        let id = SessionId::generate();
        let (abort, registration) = AbortHandle::new_pair();

        // Registered before the pump exists, so the pump can only ever remove its own entry.
        self.inner.sessions.insert(
            id.clone(),
            Session {
                field: subscription.clone(),
                url: url.clone(),
                abort,
            },
        );

        let span = tracing::info_span!("subscription", %id, field = %subscription);
        let pump = subscription_loop(
            stream,
            self.inner.sink.clone(),
            url,
            id.clone(),
            self.inner.sessions.clone(),
        );
        tokio::spawn(Abortable::new(pump, registration).instrument(span));

        tracing::info!(%id, field = %subscription, "started subscription");

        Ok(StartResponse::Subscribed { id })
    }

    /// Cancels the session's pump and forgets the session.
    pub fn stop(&self, id: &SessionId) -> Result<StopResponse, SubscriptionError> {
        let Some(session) = self.inner.sessions.remove(id) else {
            return Err(SubscriptionError::UnknownSessionId(id.clone()));
        };

        session.abort.abort();
        tracing::info!(%id, field = %session.field, "stopped subscription");

        Ok(StopResponse { id: id.clone() })
    }

    /// Restarts the session's subscription with new variables. The old id stops being valid
    /// and the new session gets a fresh one.
    pub async fn update(
        &self,
        request: UpdateRequest,
        inputs: &ContextInputs,
    ) -> Result<StartResponse, SubscriptionError> {
        let UpdateRequest { id, variables } = request;

        let Some(SessionInfo { field, url, .. }) = self.inner.sessions.get(&id) else {
            return Err(SubscriptionError::UnknownSessionId(id));
        };

        self.stop(&id)?;

        self.start(
            StartRequest {
                subscription: field,
                variables,
                url,
            },
            inputs,
        )
        .await
    }

    /// Stops every active session, returning how many were stopped.
    pub fn stop_all(&self) -> usize {
        let sessions = self.inner.sessions.drain();

        for (_, session) in &sessions {
            session.abort.abort();
        }

        tracing::info!(count = sessions.len(), "stopped all subscriptions");

        sessions.len()
    }
}

/// Delivers every result of `stream` in order, waiting for each push before pulling the next
/// value. Any failure ends the session.
async fn subscription_loop(
    mut stream: BoxStream<'static, Result<Response, StreamError>>,
    sink: DeliverySink,
    url: Url,
    id: SessionId,
    sessions: Arc<SessionStore>,
) {
    while let Some(item) = stream.next().await {
        let response = match item {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "subscription stream failed");
                sessions.remove(&id);
                return;
            }
        };

        if let Err(error) = sink.deliver(&url, &response).await {
            tracing::error!(%error, %url, "could not deliver subscription result");
            sessions.remove(&id);
            return;
        }

        tracing::debug!(%url, "delivered subscription result");
    }

    tracing::info!("subscription stream completed");
    sessions.remove(&id);
}
