//! Outbound SMS port.

use std::future::Future;
use std::pin::Pin;

use sms_ai_types::error::SmsError;

/// Sends an SMS out-of-band (used when replies are not returned inline as TwiML).
pub trait SmsSender: Send + Sync {
    /// Send `body` to `to`. Returns the provider's message id.
    fn send(&self, to: &str, body: &str) -> impl Future<Output = Result<String, SmsError>> + Send;
}

/// Object-safe version of [`SmsSender`].
pub trait SmsSenderDyn: Send + Sync {
    fn send_boxed<'a>(
        &'a self,
        to: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SmsError>> + Send + 'a>>;
}

impl<T: SmsSender> SmsSenderDyn for T {
    fn send_boxed<'a>(
        &'a self,
        to: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SmsError>> + Send + 'a>> {
        Box::pin(self.send(to, body))
    }
}

/// Type-erased SMS sender, so the HTTP layer can hold Twilio or a test double.
pub struct BoxSmsSender {
    inner: Box<dyn SmsSenderDyn + Send + Sync>,
}

impl BoxSmsSender {
    pub fn new<T: SmsSender + 'static>(sender: T) -> Self {
        Self {
            inner: Box::new(sender),
        }
    }

    pub async fn send(&self, to: &str, body: &str) -> Result<String, SmsError> {
        self.inner.send_boxed(to, body).await
    }
}
