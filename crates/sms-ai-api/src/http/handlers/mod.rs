pub mod admin;
pub mod inbound;
pub mod sms;
