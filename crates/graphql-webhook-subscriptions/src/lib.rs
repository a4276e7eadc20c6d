//! GraphQL subscriptions delivered to webhooks.
//!
//! A [`SubscriptionManager`] synthesizes one operation per subscription field up front. Starting
//! a subscription executes that operation and pushes every result it produces to the caller's
//! callback URL until the stream ends or the session is stopped.

mod bind;
mod config;
mod context;
mod delivery;
mod error;
mod executor;
mod manager;
mod request;
mod response;

pub use self::{
    bind::{bind_variables, coerce_variable, InputValueError, ValueKind},
    config::{Config, ConfigError, DeliveryConfig},
    context::{ContextError, ContextInputs, ContextResolver, ExecutionContext, HeadersContextResolver},
    delivery::{DeliverySink, DeliverySinkInner, HttpDelivery, DEFAULT_DELIVERY_TIMEOUT},
    error::{BuildError, DeliveryError, StreamError, SubscriptionError},
    executor::{AsyncGraphqlExecutor, ExecutionOutcome, ExecutionRequest, SubscriptionExecutor},
    manager::{PreparedOperation, SessionId, SessionInfo, SubscriptionManager, SubscriptionManagerBuilder},
    request::{StartRequest, StartResponse, StopRequest, StopResponse, UpdateRequest},
    response::{GraphqlError, Location, Response},
};
