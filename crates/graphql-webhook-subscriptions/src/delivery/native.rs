use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

use super::{DeliverySink, DeliverySinkInner};
use crate::{DeliveryError, Response};

/// Delivers results as JSON `POST` requests.
pub struct HttpDelivery {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl HttpDelivery {
    pub fn new(headers: HeaderMap) -> Self {
        HttpDelivery {
            client: reqwest::Client::new(),
            headers,
        }
    }

    pub fn sink(headers: HeaderMap) -> DeliverySink {
        DeliverySink::new(Self::new(headers))
    }
}

impl Default for HttpDelivery {
    fn default() -> Self {
        Self::new(HeaderMap::new())
    }
}

#[async_trait::async_trait]
impl DeliverySinkInner for HttpDelivery {
    async fn deliver(&self, url: &Url, payload: &Response) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(payload)?;

        let response = self
            .client
            .post(url.clone())
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }

        Ok(())
    }
}
