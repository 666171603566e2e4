//! Memory Configuration - Tunable Parameters
//!
//! Every constant of the cognitive models, extracted into one config struct.
//! Default values come from the cited literature (ACT-R, Memory Chain Model,
//! Ebbinghaus curve); the presets tune them for common agent archetypes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngramError, Result};
use crate::memory::MemoryType;
use crate::reward::{DEFAULT_NEGATIVE_SIGNALS, DEFAULT_POSITIVE_SIGNALS};

/// All tunable parameters for the Engram memory system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngramConfig {
    // ========== Forgetting (Ebbinghaus + interference) ==========
    /// Spacing-effect weight on ln(1 + n_access) in stability
    pub spacing_factor: f64,
    /// Importance floor in stability: factor = floor + importance
    pub importance_floor: f64,
    /// Stability bonus per consolidation count
    pub consolidation_bonus: f64,
    /// Effective-strength threshold below which entries are pruned to archive
    pub forget_threshold: f64,
    /// Retrieval-induced forgetting suppression magnitude
    pub suppression_factor: f64,
    /// Token-overlap threshold for a competing memory
    pub overlap_threshold: f64,
    /// Apply retrieval-induced suppression for every returned entry instead
    /// of the top result only
    pub suppress_all_results: bool,
    /// Per-type decay-rate overrides; types not present use the built-ins
    pub decay_rates: HashMap<MemoryType, f64>,

    // ========== Consolidation (Memory Chain Model) ==========
    /// Working-trace decay rate per day (μ₁)
    pub mu1: f64,
    /// Core-trace decay rate per day (μ₂)
    pub mu2: f64,
    /// Working -> core transfer rate per day (α)
    pub alpha: f64,
    /// Importance-modulation floor: α_eff = α · (floor + importance²)
    pub consolidation_importance_floor: f64,
    /// Fraction of archived entries replayed per cycle
    pub interleave_ratio: f64,
    /// Core-strength boost per replayed archived entry (base)
    pub replay_boost: f64,
    /// Promote working -> core when core_strength reaches this
    pub promote_threshold: f64,
    /// Demote core -> archive when total strength falls below this
    pub demote_threshold: f64,
    /// Archive a working entry when both traces fall below this
    pub archive_threshold: f64,
    /// Seed for the replay sampler; None draws from entropy
    pub replay_seed: Option<u64>,

    // ========== Activation (ACT-R) ==========
    /// Base-level activation decay exponent (d in t^-d)
    pub actr_decay: f64,
    /// Spreading-activation weight for context keywords
    pub context_weight: f64,
    /// Importance weight in retrieval activation
    pub importance_weight: f64,
    /// Candidates scoring below this are dropped
    pub min_activation: f64,

    // ========== Confidence (metacognitive scoring) ==========
    /// Weight of content reliability in the combined score
    pub confidence_reliability_weight: f64,
    /// Weight of retrieval salience in the combined score
    pub confidence_salience_weight: f64,
    /// Sigmoid steepness for the store-less salience mapping
    pub salience_sigmoid_k: f64,

    // ========== Reward (feedback modulation) ==========
    /// Importance delta applied to the most recent memory
    pub reward_magnitude: f64,
    /// Number of recently accessed memories a reward touches
    pub reward_recent_n: usize,
    /// Working-strength bonus on positive feedback
    pub reward_strength_boost: f64,
    /// Working-strength suppression on negative feedback
    pub reward_suppression: f64,
    /// Eligibility-trace discount: 1/(1 + discount·i) for the i-th memory
    pub reward_temporal_discount: f64,
    /// Detection confidence below which feedback is ignored
    pub min_feedback_confidence: f64,
    /// Substrings treated as positive feedback
    pub positive_signals: Vec<String>,
    /// Substrings treated as negative feedback
    pub negative_signals: Vec<String>,

    // ========== Hebbian / graph ==========
    /// Saturation ceiling for Hebbian link strength
    pub hebbian_ceiling: f64,
    /// BFS hop cap for entity-graph expansion during recall
    pub entity_hops: usize,

    // ========== Downscaling (synaptic homeostasis) ==========
    /// Default multiplicative factor for synaptic downscaling
    pub downscale_factor: f64,

    // ========== Anomaly detection ==========
    /// Rolling window size for baseline tracking
    pub anomaly_window_size: usize,
    /// Standard deviations for the anomaly threshold
    pub anomaly_sigma_threshold: f64,
    /// Minimum samples before anomaly detection activates
    pub anomaly_min_samples: usize,

    // ========== Session working memory ==========
    /// Capacity of a session's working-memory set (Miller's 7)
    pub session_capacity: usize,
    /// Seconds after which an activated id decays out of the set
    pub session_decay_secs: f64,
    /// Probe overlap below which the gate requests a full recall
    pub session_overlap_threshold: f64,
    /// Result limit for the cheap gate probe
    pub session_probe_limit: usize,
}

impl Default for EngramConfig {
    fn default() -> Self {
        Self {
            spacing_factor: 0.5,
            importance_floor: 0.5,
            consolidation_bonus: 0.2,
            forget_threshold: 0.01,
            suppression_factor: 0.05,
            overlap_threshold: 0.3,
            suppress_all_results: false,
            decay_rates: HashMap::new(),

            mu1: 0.15,
            mu2: 0.005,
            alpha: 0.08,
            consolidation_importance_floor: 0.2,
            interleave_ratio: 0.3,
            replay_boost: 0.01,
            promote_threshold: 0.25,
            demote_threshold: 0.05,
            archive_threshold: 0.15,
            replay_seed: None,

            actr_decay: 0.5,
            context_weight: 1.5,
            importance_weight: 0.5,
            min_activation: -10.0,

            confidence_reliability_weight: 0.7,
            confidence_salience_weight: 0.3,
            salience_sigmoid_k: 2.0,

            reward_magnitude: 0.15,
            reward_recent_n: 3,
            reward_strength_boost: 0.05,
            reward_suppression: 0.1,
            reward_temporal_discount: 0.5,
            min_feedback_confidence: 0.3,
            positive_signals: DEFAULT_POSITIVE_SIGNALS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            negative_signals: DEFAULT_NEGATIVE_SIGNALS
                .iter()
                .map(|s| s.to_string())
                .collect(),

            hebbian_ceiling: 10.0,
            entity_hops: 2,

            downscale_factor: 0.95,

            anomaly_window_size: 100,
            anomaly_sigma_threshold: 2.0,
            anomaly_min_samples: 5,

            session_capacity: 7,
            session_decay_secs: 300.0,
            session_overlap_threshold: 0.6,
            session_probe_limit: 3,
        }
    }
}

impl EngramConfig {
    /// Literature-based defaults (same as `Default`)
    pub fn default_preset() -> Self {
        Self::default()
    }

    /// Effective decay rate for a memory type, honoring overrides
    pub fn decay_rate(&self, memory_type: MemoryType) -> f64 {
        self.decay_rates
            .get(&memory_type)
            .copied()
            .unwrap_or_else(|| memory_type.base_decay_rate())
    }

    /// Check all parameters are in range
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f64) -> Result<()> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(EngramError::Config(format!("{} must be > 0, got {}", name, v)))
            }
        }
        fn unit(name: &str, v: f64) -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(EngramError::Config(format!(
                    "{} must be in [0, 1], got {}",
                    name, v
                )))
            }
        }

        positive("mu1", self.mu1)?;
        positive("mu2", self.mu2)?;
        positive("alpha", self.alpha)?;
        positive("actr_decay", self.actr_decay)?;
        positive("hebbian_ceiling", self.hebbian_ceiling)?;
        unit("interleave_ratio", self.interleave_ratio)?;
        unit("suppression_factor", self.suppression_factor)?;
        unit("overlap_threshold", self.overlap_threshold)?;
        unit("session_overlap_threshold", self.session_overlap_threshold)?;
        unit("min_feedback_confidence", self.min_feedback_confidence)?;
        if !(self.downscale_factor > 0.0 && self.downscale_factor <= 1.0) {
            return Err(EngramError::Config(format!(
                "downscale_factor must be in (0, 1], got {}",
                self.downscale_factor
            )));
        }
        for (memory_type, rate) in &self.decay_rates {
            if *rate <= 0.0 {
                return Err(EngramError::Config(format!(
                    "decay rate for {} must be > 0, got {}",
                    memory_type, rate
                )));
            }
        }
        if self.session_capacity == 0 {
            return Err(EngramError::Config(
                "session_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Preset for conversational chatbots.
    ///
    /// High replay, slow decay - optimized for long conversations where
    /// recalling old context matters.
    pub fn chatbot() -> Self {
        Self {
            mu1: 0.08,
            mu2: 0.003,
            alpha: 0.12,
            interleave_ratio: 0.4,
            replay_boost: 0.015,
            actr_decay: 0.4,
            context_weight: 2.0,
            downscale_factor: 0.96,
            reward_magnitude: 0.2,
            forget_threshold: 0.005,
            ..Self::default()
        }
    }

    /// Preset for short-lived task agents.
    ///
    /// Fast decay, minimal replay - focus on recent task context and let
    /// old task memories expire quickly.
    pub fn task_agent() -> Self {
        Self {
            mu1: 0.25,
            mu2: 0.01,
            alpha: 0.05,
            interleave_ratio: 0.1,
            replay_boost: 0.005,
            actr_decay: 0.6,
            promote_threshold: 0.35,
            archive_threshold: 0.2,
            downscale_factor: 0.90,
            forget_threshold: 0.02,
            ..Self::default()
        }
    }

    /// Preset for long-term personal assistants.
    ///
    /// Very slow core decay, strong importance weighting - remember
    /// preferences and facts about the user for months.
    pub fn personal_assistant() -> Self {
        Self {
            mu1: 0.12,
            mu2: 0.001,
            alpha: 0.10,
            replay_boost: 0.02,
            actr_decay: 0.45,
            importance_weight: 0.7,
            promote_threshold: 0.20,
            demote_threshold: 0.03,
            downscale_factor: 0.97,
            forget_threshold: 0.005,
            confidence_reliability_weight: 0.8,
            confidence_salience_weight: 0.2,
            ..Self::default()
        }
    }

    /// Preset for research agents.
    ///
    /// Minimal forgetting and heavy replay - everything might be relevant
    /// later.
    pub fn researcher() -> Self {
        Self {
            mu1: 0.05,
            mu2: 0.001,
            alpha: 0.15,
            interleave_ratio: 0.5,
            replay_boost: 0.025,
            actr_decay: 0.35,
            context_weight: 2.0,
            importance_weight: 0.3,
            promote_threshold: 0.15,
            demote_threshold: 0.02,
            archive_threshold: 0.10,
            downscale_factor: 0.98,
            forget_threshold: 0.001,
            ..Self::default()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
