use graphql_operation_synthesis::{SchemaError, SynthesisError};

use crate::SessionId;

/// Errors returned to callers of the session manager.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SubscriptionError {
    #[error("subscription field `{0}` is not defined by the schema")]
    UnknownSubscriptionField(String),
    #[error("no active subscription session with id `{0}`")]
    UnknownSessionId(SessionId),
    #[error("could not execute subscription `{field}`: {message}")]
    Execution { field: String, message: String },
}

/// A failed push of a single result to a callback URL.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("callback responded with status {0}")]
    Status(http::StatusCode),
    #[error("delivery to the callback failed: {0}")]
    Transport(String),
    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("could not serialize the payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An error raised by a subscription stream mid-flight.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{0}")]
pub struct StreamError(pub String);

impl StreamError {
    pub fn any(error: impl ToString) -> Self {
        StreamError(error.to_string())
    }
}

/// Errors raised while building a [`SubscriptionManager`](crate::SubscriptionManager).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("the schema does not define a subscription root type")]
    MissingSubscriptionType,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}
