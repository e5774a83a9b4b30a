//! Glossary lookup: normalisation, tokenisation and exact/fuzzy term matching.
//!
//! The index itself is built from already-parsed entries; reading the CSV is
//! an infrastructure concern (see `sms_ai_infra::glossary`).

mod fuzzy;
mod index;
mod text;

pub use fuzzy::ratio;
pub use index::{DEFAULT_MAX_TERMS, DEFAULT_MIN_SCORE, GlossaryIndex};
pub use text::{normalise, tokenise};
