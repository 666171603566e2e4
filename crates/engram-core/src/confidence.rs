//! Confidence Scoring - Two-Dimensional Metacognitive Monitoring
//!
//! Two distinct confidences exist for a memory:
//!
//! 1. **Content reliability** - how trustworthy the content is. Based on
//!    memory type, pinning, and contradiction state; it does NOT decay with
//!    time (facts don't become less true by aging).
//! 2. **Retrieval salience** - how "top of mind" the memory is. Based on
//!    effective strength, so it decays with time. Used for ranking, never
//!    for judging accuracy.
//!
//! The brain makes the same distinction: you can know that you know
//! something (high reliability) while struggling to bring it to mind
//! (low salience).
//!
//! References: Nelson & Narens (1990), Koriat (1993), Johnson et al. (1993).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngramConfig;
use crate::forgetting::effective_strength;
use crate::memory::{MemoryEntry, MemoryType};

/// Multiplier applied to reliability when a memory has been contradicted
const CONTRADICTION_PENALTY: f64 = 0.3;

/// Reliability floor for pinned (human-verified) memories
const PINNED_FLOOR: f64 = 0.95;

// ============================================================================
// LABELS
// ============================================================================

/// Human-readable confidence ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    /// Strong on both reliability and salience (>= 0.8)
    Certain,
    /// Good reliability, moderate salience (>= 0.6)
    Likely,
    /// Moderate reliability or low salience (>= 0.4)
    Uncertain,
    /// Low reliability or a very old, weak memory
    Vague,
}

impl ConfidenceLabel {
    /// Label for a combined confidence score
    pub fn for_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLabel::Certain
        } else if score >= 0.6 {
            ConfidenceLabel::Likely
        } else if score >= 0.4 {
            ConfidenceLabel::Uncertain
        } else {
            ConfidenceLabel::Vague
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::Certain => "certain",
            ConfidenceLabel::Likely => "likely",
            ConfidenceLabel::Uncertain => "uncertain",
            ConfidenceLabel::Vague => "vague",
        }
    }
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Full confidence breakdown for a recalled memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confidence {
    /// Content trustworthiness (0-1, stable over time)
    pub reliability: f64,
    /// Retrieval strength (0-1, decays over time)
    pub salience: f64,
    /// Weighted overall score
    pub combined: f64,
    /// Ladder label for the combined score
    pub label: ConfidenceLabel,
    /// Phrase the agent can use when relaying the memory
    pub description: String,
}

/// Default content reliability for a memory type
pub fn base_reliability(memory_type: MemoryType) -> f64 {
    match memory_type {
        MemoryType::Factual => 0.85,
        MemoryType::Episodic => 0.90,
        MemoryType::Relational => 0.75,
        MemoryType::Emotional => 0.95,
        MemoryType::Procedural => 0.90,
        MemoryType::Opinion => 0.60,
    }
}

/// How trustworthy is this memory's content?
///
/// Pinned memories were explicitly verified and get a high floor; a
/// contradicted memory keeps less than a third of its reliability even
/// after the importance boost.
pub fn content_reliability(entry: &MemoryEntry) -> f64 {
    let mut rel = base_reliability(entry.memory_type);

    if entry.pinned {
        rel = rel.max(PINNED_FLOOR);
    }
    if entry.contradicted_by.is_some() {
        rel *= CONTRADICTION_PENALTY;
    }

    (rel + entry.importance * 0.1).min(1.0)
}

/// How "top of mind" is this memory?
///
/// Normalized against the store-wide maximum effective strength when one
/// is available; otherwise mapped through a sigmoid so an absolute
/// strength still lands in [0, 1].
pub fn retrieval_salience(
    entry: &MemoryEntry,
    max_effective: Option<f64>,
    now: DateTime<Utc>,
    config: &EngramConfig,
) -> f64 {
    let eff = effective_strength(entry, now, config);

    let raw = match max_effective {
        Some(max) if max > 0.0 => eff / max,
        Some(_) => 0.0,
        None => 2.0 / (1.0 + (-config.salience_sigmoid_k * eff).exp()) - 1.0,
    };

    raw.clamp(0.0, 1.0)
}

/// Full confidence for an entry at the given instant.
///
/// `max_effective` is the store-wide maximum effective strength, when the
/// caller has the store at hand.
pub fn confidence(
    entry: &MemoryEntry,
    max_effective: Option<f64>,
    now: DateTime<Utc>,
    config: &EngramConfig,
) -> Confidence {
    let reliability = content_reliability(entry);
    let salience = retrieval_salience(entry, max_effective, now, config);
    let combined = config.confidence_reliability_weight * reliability
        + config.confidence_salience_weight * salience;
    let label = ConfidenceLabel::for_score(combined);

    let description = if reliability >= 0.8 && salience >= 0.7 {
        "I clearly remember this"
    } else if reliability >= 0.8 && salience < 0.4 {
        "I have a reliable record of this, though it's from a while ago"
    } else if reliability < 0.6 {
        "I have a note about this but I'm not sure how accurate it is"
    } else {
        "I recall this but the details might not be exact"
    };

    Confidence {
        reliability,
        salience,
        combined,
        label,
        description: description.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngramConfig {
        EngramConfig::default()
    }

    #[test]
    fn test_label_ladder() {
        assert_eq!(ConfidenceLabel::for_score(0.85), ConfidenceLabel::Certain);
        assert_eq!(ConfidenceLabel::for_score(0.8), ConfidenceLabel::Certain);
        assert_eq!(ConfidenceLabel::for_score(0.7), ConfidenceLabel::Likely);
        assert_eq!(ConfidenceLabel::for_score(0.5), ConfidenceLabel::Uncertain);
        assert_eq!(ConfidenceLabel::for_score(0.1), ConfidenceLabel::Vague);
    }

    #[test]
    fn test_contradiction_guts_reliability() {
        // A contradicted entry keeps under half its type's base reliability.
        for memory_type in MemoryType::ALL {
            let mut entry = MemoryEntry::new("contested", memory_type);
            entry.importance = 1.0;
            entry.contradicted_by = Some("other".to_string());
            let rel = content_reliability(&entry);
            assert!(
                rel < 0.5 * base_reliability(memory_type),
                "{} reliability {} not halved",
                memory_type,
                rel
            );
        }
    }

    #[test]
    fn test_contradicted_factual_under_point_three() {
        let mut entry = MemoryEntry::new("contested fact", MemoryType::Factual);
        entry.contradicted_by = Some("other".to_string());
        assert!(content_reliability(&entry) <= 0.30);
    }

    #[test]
    fn test_pinned_floor() {
        let mut entry = MemoryEntry::new("verified", MemoryType::Opinion);
        entry.importance = 0.0;
        entry.pinned = true;
        assert!(content_reliability(&entry) >= 0.95);
    }

    #[test]
    fn test_pinned_and_contradicted_still_penalized() {
        let mut entry = MemoryEntry::new("verified but contested", MemoryType::Factual);
        entry.pinned = true;
        entry.importance = 0.0;
        entry.contradicted_by = Some("other".to_string());
        assert!(content_reliability(&entry) < 0.5 * base_reliability(MemoryType::Factual));
    }

    #[test]
    fn test_salience_normalized_against_max() {
        let cfg = config();
        let entry = MemoryEntry::new("fresh", MemoryType::Factual);
        let now = entry.created_at;

        // eff = 1.0 (fresh, working_strength 1.0)
        let sal = retrieval_salience(&entry, Some(2.0), now, &cfg);
        assert!((sal - 0.5).abs() < 1e-9);

        let capped = retrieval_salience(&entry, Some(0.5), now, &cfg);
        assert_eq!(capped, 1.0);
    }

    #[test]
    fn test_salience_sigmoid_without_store() {
        let cfg = config();
        let mut entry = MemoryEntry::new("weightless", MemoryType::Factual);
        entry.working_strength = 0.0;
        entry.core_strength = 0.0;
        let sal = retrieval_salience(&entry, None, entry.created_at, &cfg);
        assert_eq!(sal, 0.0);

        entry.working_strength = 1.0;
        let sal = retrieval_salience(&entry, None, entry.created_at, &cfg);
        assert!(sal > 0.7 && sal < 1.0);
    }

    #[test]
    fn test_combined_weighting() {
        let cfg = config();
        let entry = MemoryEntry::new("combined", MemoryType::Factual);
        let c = confidence(&entry, Some(1.0), entry.created_at, &cfg);
        let expected = 0.7 * c.reliability + 0.3 * c.salience;
        assert!((c.combined - expected).abs() < 1e-12);
        assert_eq!(c.label, ConfidenceLabel::for_score(c.combined));
    }
}
