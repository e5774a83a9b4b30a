//! TwiML replies for the Twilio webhook.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// A TwiML document, served as `application/xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwiMl(pub String);

impl TwiMl {
    /// Reply inline with a single SMS.
    pub fn message(text: &str) -> Self {
        Self(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n  <Message>{}</Message>\n</Response>",
            xml_escape(text)
        ))
    }

    /// Acknowledge without replying; the answer goes out through the REST API.
    pub fn empty() -> Self {
        Self("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response></Response>".to_string())
    }
}

impl IntoResponse for TwiMl {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, "application/xml")], self.0).into_response()
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
