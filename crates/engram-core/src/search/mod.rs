//! Search Module
//!
//! Query preparation and the activation-ranked retrieval pipeline:
//! - FTS query sanitization with stop-word filtering
//! - Candidate gathering, graph expansion, scoring, and top-K ranking

mod engine;
mod keyword;

pub use engine::SearchEngine;
pub use keyword::{is_stop_word, query_tokens, sanitize_fts_query};
