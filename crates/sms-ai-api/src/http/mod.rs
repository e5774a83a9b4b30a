//! HTTP layer: the Twilio webhook, the JSON test endpoint and admin views.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod twiml;
