//! Repository trait definitions (ports) for the persistence layer.
//!
//! Implementations live in sms-ai-infra. Traits use native async fn
//! (RPITIT, Rust 2024 edition); no async_trait macro.

pub mod message;
pub mod turn;

pub use message::MessageRepository;
pub use turn::TurnRepository;
