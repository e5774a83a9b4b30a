//! Web search implementations.

pub mod tavily;

pub use tavily::TavilySearch;
