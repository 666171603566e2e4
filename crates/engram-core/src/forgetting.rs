//! Forgetting Model - Ebbinghaus + Interference
//!
//! Ebbinghaus forgetting curve:
//!
//! ```text
//! R(t) = e^(-t/S)
//! ```
//!
//! Retrievability `R` is the probability of successful recall `t` days after
//! the last access. Stability `S` grows with practice (spacing effect),
//! importance, and consolidation, so rehearsed memories flatten their own
//! forgetting curve.
//!
//! Also implements retrieval-induced forgetting: recalling one memory
//! suppresses same-type competitors with overlapping content.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::EngramConfig;
use crate::memory::MemoryEntry;

/// Memory stability in days.
///
/// Base stability is the inverse of the per-type decay rate; each access
/// multiplies it (diminishing via ln), importance shifts it, and every
/// consolidation adds a fixed bonus.
pub fn compute_stability(entry: &MemoryEntry, config: &EngramConfig) -> f64 {
    let base = 1.0 / config.decay_rate(entry.memory_type);

    let spacing = 1.0 + config.spacing_factor * (1.0 + entry.access_count as f64).ln();
    let importance = config.importance_floor + entry.importance;
    let consolidation = 1.0 + config.consolidation_bonus * entry.consolidation_count as f64;

    base * spacing * importance * consolidation
}

/// Ebbinghaus retrievability at the given instant, in [0, 1].
pub fn retrievability(entry: &MemoryEntry, now: DateTime<Utc>, config: &EngramConfig) -> f64 {
    let reference = entry.last_access_or_created();
    let t_days = (now - reference).num_milliseconds() as f64 / 86_400_000.0;

    if t_days <= 0.0 {
        return 1.0;
    }

    (-t_days / compute_stability(entry, config)).exp()
}

/// Combined "how alive is this memory" score: trace strengths scaled by
/// retrievability.
pub fn effective_strength(entry: &MemoryEntry, now: DateTime<Utc>, config: &EngramConfig) -> f64 {
    entry.total_strength() * retrievability(entry, now, config)
}

/// Whether an entry has faded below the pruning threshold.
///
/// Pinned entries are never forgotten.
pub fn should_forget(
    entry: &MemoryEntry,
    threshold: f64,
    now: DateTime<Utc>,
    config: &EngramConfig,
) -> bool {
    if entry.pinned {
        return false;
    }
    effective_strength(entry, now, config) < threshold
}

/// Token overlap of a competitor against a retrieved entry:
/// |tokens(retrieved) ∩ tokens(competitor)| / |tokens(competitor)|.
pub fn competition_overlap(retrieved_content: &str, competitor_content: &str) -> f64 {
    fn tokens(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    let competitor = tokens(competitor_content);
    if competitor.is_empty() {
        return 0.0;
    }

    let retrieved = tokens(retrieved_content);
    let shared = competitor.intersection(&retrieved).count();
    shared as f64 / competitor.len() as f64
}

/// Working-strength multiplier for a competitor of a retrieved entry, or
/// `None` when the competitor is not suppressed.
///
/// Competitors are same-type, non-pinned entries whose token overlap with
/// the retrieved content exceeds the configured threshold. Suppression is
/// never applied across types.
pub fn suppression_multiplier(
    retrieved: &MemoryEntry,
    competitor: &MemoryEntry,
    config: &EngramConfig,
) -> Option<f64> {
    if competitor.id == retrieved.id || competitor.pinned {
        return None;
    }
    if competitor.memory_type != retrieved.memory_type {
        return None;
    }

    let overlap = competition_overlap(&retrieved.content, &competitor.content);
    if overlap > config.overlap_threshold {
        Some(1.0 - config.suppression_factor * overlap)
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
