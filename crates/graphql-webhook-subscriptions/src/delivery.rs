mod native;

use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{DeliveryError, Response};

pub use self::native::HttpDelivery;

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Pushes a single result to a callback URL.
#[async_trait::async_trait]
pub trait DeliverySinkInner: Send + Sync {
    async fn deliver(&self, url: &Url, payload: &Response) -> Result<(), DeliveryError>;
}

/// A shared delivery sink enforcing a timeout on every push.
#[derive(Clone)]
pub struct DeliverySink {
    inner: Arc<dyn DeliverySinkInner>,
    timeout: Duration,
}

impl DeliverySink {
    pub fn new(sink: impl DeliverySinkInner + 'static) -> DeliverySink {
        DeliverySink {
            inner: Arc::new(sink),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn deliver(&self, url: &Url, payload: &Response) -> Result<(), DeliveryError> {
        let timeout = self.timeout;

        let timeout = async {
            tokio::time::sleep(timeout).await;
            Err(DeliveryError::Timeout(timeout))
        };

        let delivery = self.inner.deliver(url, payload);

        tokio::select! {
            result = timeout => { result }
            result = delivery => { result }
        }
    }
}
