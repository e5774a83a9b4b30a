//! TwilioSender -- [`SmsSender`] backed by the Twilio REST API.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use sms_ai_core::sms::SmsSender;
use sms_ai_types::config::Settings;
use sms_ai_types::error::SmsError;

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

/// Sends SMS through `POST /2010-04-01/Accounts/{sid}/Messages.json`.
pub struct TwilioSender {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl TwilioSender {
    pub fn new(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
    ) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SmsError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token,
            from_number: from_number.into(),
        })
    }

    /// Build a sender from settings. Account SID, auth token and sender
    /// number must all be set.
    pub fn from_settings(settings: &Settings) -> Result<Self, SmsError> {
        let twilio = &settings.twilio;
        let (Some(sid), Some(token), Some(from)) = (
            twilio.account_sid.as_deref().filter(|s| !s.is_empty()),
            settings.secrets.twilio_auth_token.clone(),
            twilio.from_number.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(SmsError::NotConfigured(
                "Twilio credentials or from-number missing".to_string(),
            ));
        };
        Self::new(twilio.base_url.as_str(), sid, token, from)
    }
}

impl SmsSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<String, SmsError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| SmsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let message: TwilioMessage = response
            .json()
            .await
            .map_err(|e| SmsError::Request(format!("invalid Twilio response: {e}")))?;
        info!(sid = %message.sid, "sms sent");
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender(base_url: &str) -> TwilioSender {
        TwilioSender::new(base_url, "AC123", SecretString::from("token"), "+15005550006").unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B27820000000"))
            .and(body_string_contains("From=%2B15005550006"))
            .and(body_string_contains("Body=Dumela+rra"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "SM42"})))
            .expect(1)
            .mount(&server)
            .await;

        let sid = sender(&server.uri()).send("+27820000000", "Dumela rra").await.unwrap();
        assert_eq!(sid, "SM42");
    }

    #[tokio::test]
    async fn test_send_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid To"))
            .mount(&server)
            .await;

        let err = sender(&server.uri()).send("bad", "x").await.unwrap_err();
        assert!(matches!(err, SmsError::Status { status: 400, .. }));
    }

    #[test]
    fn test_from_settings_requires_credentials() {
        let settings = Settings::default();
        assert!(matches!(
            TwilioSender::from_settings(&settings),
            Err(SmsError::NotConfigured(_))
        ));

        let mut settings = Settings::default();
        settings.twilio.account_sid = Some("AC123".to_string());
        settings.twilio.from_number = Some("+15005550006".to_string());
        settings.secrets.twilio_auth_token = Some(SecretString::from("token"));
        assert!(TwilioSender::from_settings(&settings).is_ok());
    }
}
