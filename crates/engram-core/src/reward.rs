//! Reward-Modulated Learning - Feedback Signals
//!
//! Dopamine release is temporally diffuse: a reward doesn't strengthen only
//! the instant it arrives, it spreads back over recent experience
//! (eligibility traces). Positive feedback therefore boosts the importance
//! and working trace of the N most recently accessed memories with a
//! per-position discount; negative feedback suppresses them the same way.
//!
//! Feedback polarity is detected from lowercased substring matches against
//! configurable signal wordlists; the shipped defaults are bilingual
//! (English + Chinese).
//!
//! References: Lisman & Grace (2005), Shohamy & Adcock (2010).

use serde::{Deserialize, Serialize};

use crate::config::EngramConfig;
use crate::memory::MemoryEntry;

/// Default positive feedback signals
pub const DEFAULT_POSITIVE_SIGNALS: &[&str] = &[
    "好的", "不错", "对", "对的", "很好", "棒", "可以", "行",
    "good", "nice", "correct", "yes", "right", "exactly", "perfect",
    "great", "thanks", "thank you", "awesome", "love it", "well done",
];

/// Default negative feedback signals
pub const DEFAULT_NEGATIVE_SIGNALS: &[&str] = &[
    "不对", "别这样", "错", "错了", "不行", "不好", "停", "别",
    "wrong", "no", "don't", "stop", "bad", "incorrect", "nope",
    "that's wrong", "not right", "undo", "cancel",
];

// ============================================================================
// POLARITY
// ============================================================================

/// Detected feedback polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Reward: strengthen recent memories
    Positive,
    /// Punishment: suppress recent memories
    Negative,
    /// No signal, or conflicting signals
    Neutral,
}

impl Polarity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// Detect feedback polarity from natural language.
///
/// Counts signal substrings from each wordlist in the lowercased text.
/// Confidence follows `min(0.95, 0.3 + 0.2 · matches)`; equal match counts
/// are ambiguous and come back neutral with token confidence.
pub fn detect_feedback(
    text: &str,
    positive_signals: &[String],
    negative_signals: &[String],
) -> (Polarity, f64) {
    let text_lower = text.to_lowercase();

    let pos_matches = positive_signals
        .iter()
        .filter(|s| text_lower.contains(&s.to_lowercase()))
        .count();
    let neg_matches = negative_signals
        .iter()
        .filter(|s| text_lower.contains(&s.to_lowercase()))
        .count();

    if pos_matches == 0 && neg_matches == 0 {
        return (Polarity::Neutral, 0.0);
    }

    if pos_matches > neg_matches {
        (Polarity::Positive, signal_confidence(pos_matches))
    } else if neg_matches > pos_matches {
        (Polarity::Negative, signal_confidence(neg_matches))
    } else {
        (Polarity::Neutral, 0.1)
    }
}

fn signal_confidence(matches: usize) -> f64 {
    (0.3 + 0.2 * matches as f64).min(0.95)
}

// ============================================================================
// APPLICATION
// ============================================================================

/// Apply reward or punishment to recently accessed memories.
///
/// `targets` must already be the `recent_n` selection ordered most recent
/// first; the i-th entry receives `discount = 1 / (1 + discount_rate · i)`.
/// Neutral polarity is a no-op. Pinning does not block reward - importance
/// is the host's signal even on protected memories. The core trace is
/// never touched.
pub fn apply_reward(
    targets: &mut [MemoryEntry],
    polarity: Polarity,
    magnitude: f64,
    config: &EngramConfig,
) {
    if polarity == Polarity::Neutral {
        return;
    }

    for (i, entry) in targets.iter_mut().enumerate() {
        let discount = 1.0 / (1.0 + config.reward_temporal_discount * i as f64);

        match polarity {
            Polarity::Positive => {
                entry.importance = (entry.importance + magnitude * discount).min(1.0);
                entry.working_strength += config.reward_strength_boost * discount;
            }
            Polarity::Negative => {
                entry.importance = (entry.importance - magnitude * discount).max(0.0);
                entry.working_strength *= 1.0 - config.reward_suppression * discount;
            }
            Polarity::Neutral => unreachable!(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryType;

    fn config() -> EngramConfig {
        EngramConfig::default()
    }

    fn signals(config: &EngramConfig) -> (Vec<String>, Vec<String>) {
        (
            config.positive_signals.clone(),
            config.negative_signals.clone(),
        )
    }

    #[test]
    fn test_detect_positive() {
        let cfg = config();
        let (pos, neg) = signals(&cfg);
        let (polarity, conf) = detect_feedback("good job, that's exactly right", &pos, &neg);
        assert_eq!(polarity, Polarity::Positive);
        // three matches: good, exactly, right
        assert!((conf - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_detect_negative_bilingual() {
        let cfg = config();
        let (pos, neg) = signals(&cfg);
        let (polarity, conf) = detect_feedback("错了别这样", &pos, &neg);
        assert_eq!(polarity, Polarity::Negative);
        assert!(conf > 0.3);
    }

    #[test]
    fn test_detect_neutral_and_ambiguous() {
        let cfg = config();
        let (pos, neg) = signals(&cfg);

        let (polarity, conf) = detect_feedback("the weather is cloudy today", &pos, &neg);
        assert_eq!(polarity, Polarity::Neutral);
        assert_eq!(conf, 0.0);

        let (polarity, conf) = detect_feedback("yes but also nope", &pos, &neg);
        assert_eq!(polarity, Polarity::Neutral);
        assert!((conf - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_saturates() {
        assert!((signal_confidence(1) - 0.5).abs() < 1e-9);
        assert!((signal_confidence(2) - 0.7).abs() < 1e-9);
        assert_eq!(signal_confidence(10), 0.95);
    }

    #[test]
    fn test_positive_reward_discounts_by_recency() {
        let cfg = config();
        let mut targets: Vec<MemoryEntry> = (0..3)
            .map(|i| {
                let mut e = MemoryEntry::new(format!("memory {}", i), MemoryType::Factual);
                e.importance = 0.3;
                e
            })
            .collect();

        apply_reward(&mut targets, Polarity::Positive, 0.15, &cfg);

        assert!((targets[0].importance - 0.45).abs() < 1e-9);
        assert!((targets[1].importance - (0.3 + 0.15 / 1.5)).abs() < 1e-9);
        assert!((targets[2].importance - (0.3 + 0.15 / 2.0)).abs() < 1e-9);
        assert!(targets[0].working_strength > targets[1].working_strength);
    }

    #[test]
    fn test_negative_reward_clamps_at_zero() {
        let cfg = config();
        let mut targets = vec![{
            let mut e = MemoryEntry::new("punished", MemoryType::Factual);
            e.importance = 0.05;
            e
        }];

        apply_reward(&mut targets, Polarity::Negative, 0.15, &cfg);

        assert_eq!(targets[0].importance, 0.0);
        assert!((targets[0].working_strength - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_reward_never_touches_core() {
        let cfg = config();
        let mut targets = vec![{
            let mut e = MemoryEntry::new("stable core", MemoryType::Factual);
            e.core_strength = 0.4;
            e
        }];

        apply_reward(&mut targets, Polarity::Positive, 0.15, &cfg);
        assert_eq!(targets[0].core_strength, 0.4);

        apply_reward(&mut targets, Polarity::Negative, 0.15, &cfg);
        assert_eq!(targets[0].core_strength, 0.4);
    }

    #[test]
    fn test_neutral_is_noop() {
        let cfg = config();
        let mut targets = vec![MemoryEntry::new("untouched", MemoryType::Factual)];
        let before = targets[0].clone();

        apply_reward(&mut targets, Polarity::Neutral, 0.15, &cfg);

        assert_eq!(targets[0].importance, before.importance);
        assert_eq!(targets[0].working_strength, before.working_strength);
    }
}
