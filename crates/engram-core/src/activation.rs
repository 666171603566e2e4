//! ACT-R Activation-Based Retrieval
//!
//! The core equation from Anderson's ACT-R theory:
//!
//! ```text
//! A_i = B_i + spreading + importance boost
//! B_i = ln( Σ_k (now - t_k)^(-d) )
//! ```
//!
//! where `t_k` ranges over the entry's access times and `d` is the decay
//! exponent (~0.5). The power law gives recency and frequency for free:
//! recent accesses dominate, repeated accesses accumulate, and unused
//! memories sink below the retrieval floor.

use chrono::{DateTime, Utc};

use crate::config::EngramConfig;
use crate::memory::MemoryEntry;

/// Floor for the age of a very recent access, in seconds
const MIN_AGE_SECS: f64 = 0.001;

/// ACT-R base-level activation over an access-time history.
///
/// Returns `f64::NEG_INFINITY` when the history is empty (the memory is
/// unretrievable).
pub fn base_level_activation(
    access_times: &[DateTime<Utc>],
    now: DateTime<Utc>,
    decay: f64,
) -> f64 {
    if access_times.is_empty() {
        return f64::NEG_INFINITY;
    }

    let mut total = 0.0;
    for t_k in access_times {
        let age_secs = (now - *t_k).num_milliseconds() as f64 / 1000.0;
        let age = if age_secs <= 0.0 { MIN_AGE_SECS } else { age_secs };
        total += age.powf(-decay);
    }

    if total <= 0.0 {
        return f64::NEG_INFINITY;
    }

    total.ln()
}

/// Spreading activation from the current context.
///
/// Full ACT-R uses semantic similarity between context elements and memory
/// chunks; keyword overlap is the proxy here - the fraction of context
/// keywords whose lowercased form appears in the content, scaled by
/// `weight`.
pub fn spreading_activation(content: &str, context_keywords: &[String], weight: f64) -> f64 {
    if context_keywords.is_empty() {
        return 0.0;
    }

    let content_lower = content.to_lowercase();
    let matches = context_keywords
        .iter()
        .filter(|kw| content_lower.contains(&kw.to_lowercase()))
        .count();

    weight * (matches as f64 / context_keywords.len() as f64)
}

/// Full retrieval activation score for an entry.
///
/// Combines base-level activation with context spreading and importance
/// modulation. Propagates `-inf` from an empty access history.
pub fn retrieval_activation(
    entry: &MemoryEntry,
    access_times: &[DateTime<Utc>],
    context_keywords: &[String],
    now: DateTime<Utc>,
    config: &EngramConfig,
) -> f64 {
    let base = base_level_activation(access_times, now, config.actr_decay);
    if base == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }

    let context = spreading_activation(&entry.content, context_keywords, config.context_weight);

    base + context + entry.importance * config.importance_weight
}

// ============================================================================
// TESTS
// ============================================================================
