use serde_json::{Map, Value};
use url::Url;

use crate::{Response, SessionId};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StartRequest {
    /// Name of a field on the subscription root type.
    pub subscription: String,
    #[serde(default)]
    pub variables: Map<String, Value>,
    /// Where every result of the subscription is pushed.
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpdateRequest {
    pub id: SessionId,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StopRequest {
    pub id: SessionId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StopResponse {
    pub id: SessionId,
}

/// Either a live session or the result of a subscription that ended immediately.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StartResponse {
    Subscribed { id: SessionId },
    Result(Response),
}

impl StartResponse {
    pub fn id(&self) -> Option<&SessionId> {
        match self {
            StartResponse::Subscribed { id } => Some(id),
            StartResponse::Result(_) => None,
        }
    }
}
