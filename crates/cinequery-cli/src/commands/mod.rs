//! CLI command handlers

pub mod ask;
pub mod get;
pub mod import;
pub mod query;
pub mod search;
pub mod serve;
pub mod status;
pub mod translate;

/// Join positional words into one string
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}
