//! Memory Chain Consolidation (Murre & Chessa, 2011)
//!
//! The brain's dual-system memory transfer as differential equations:
//!
//! ```text
//! dr₁/dt = -μ₁ · r₁(t)
//! dr₂/dt = α_eff · r₁(t) - μ₂ · r₂(t)
//! ```
//!
//! `r₁` is the working trace (fast decay), `r₂` the core trace (grows from
//! working input, decays slowly), and `α_eff = α · (floor + importance²)`
//! so that low-importance memories transfer much less. The discrete step
//! over `Δt` days first adds the transfer term to the core trace, then
//! applies exponential decay to both.
//!
//! A full cycle also replays a random fraction of archived entries (keeps
//! old knowledge rankable against a recency-dominated working set) and
//! rebalances layers against the promote/demote/archive thresholds.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::EngramConfig;
use crate::memory::{ConsolidationStats, MemoryEntry, MemoryLayer};

/// Apply exponential decay to both traces. Pinned entries are untouched.
pub fn apply_decay(entry: &mut MemoryEntry, dt_days: f64, mu1: f64, mu2: f64) {
    if entry.pinned {
        return;
    }
    entry.working_strength *= (-mu1 * dt_days).exp();
    entry.core_strength *= (-mu2 * dt_days).exp();
}

/// One consolidation step for a single entry: transfer working -> core,
/// then decay both traces.
pub fn consolidate_entry(
    entry: &mut MemoryEntry,
    dt_days: f64,
    now: DateTime<Utc>,
    config: &EngramConfig,
) {
    if entry.pinned {
        return;
    }

    // importance² keeps low-importance memories from ever accruing much core
    let effective_alpha =
        config.alpha * (config.consolidation_importance_floor + entry.importance.powi(2));

    entry.core_strength += effective_alpha * entry.working_strength * dt_days;
    apply_decay(entry, dt_days, config.mu1, config.mu2);

    entry.consolidation_count += 1;
    entry.last_consolidated = Some(now);
}

/// Reactivate an archived entry during interleaved replay.
pub fn replay_entry(entry: &mut MemoryEntry, now: DateTime<Utc>, config: &EngramConfig) {
    if entry.pinned {
        return;
    }
    entry.core_strength += config.replay_boost * (0.5 + entry.importance);
    entry.consolidation_count += 1;
    entry.last_consolidated = Some(now);
}

/// The layer an entry should occupy after a rebalance, or `None` when it
/// stays put.
///
/// Pinned entries always land in core. Working entries promote once the
/// core trace crosses the promote threshold and sink to archive when both
/// traces fall below the archive threshold. Core entries demote to archive
/// when their total strength fades below the demote threshold.
pub fn rebalanced_layer(entry: &MemoryEntry, config: &EngramConfig) -> Option<MemoryLayer> {
    let target = if entry.pinned {
        MemoryLayer::Core
    } else {
        match entry.layer {
            MemoryLayer::Working => {
                if entry.core_strength >= config.promote_threshold {
                    MemoryLayer::Core
                } else if entry.working_strength < config.archive_threshold
                    && entry.core_strength < config.archive_threshold
                {
                    MemoryLayer::Archive
                } else {
                    MemoryLayer::Working
                }
            }
            MemoryLayer::Core => {
                if entry.total_strength() < config.demote_threshold {
                    MemoryLayer::Archive
                } else {
                    MemoryLayer::Core
                }
            }
            MemoryLayer::Archive => MemoryLayer::Archive,
        }
    };

    (target != entry.layer).then_some(target)
}

/// Run a full consolidation cycle over a loaded entry set, in place.
///
/// 1. Step every working-layer entry through the Memory-Chain update
/// 2. Interleaved replay of a random fraction of archived entries
/// 3. Decay core-layer entries (core trace only)
/// 4. Rebalance layers
///
/// The caller persists the mutated entries; partial visibility of the
/// intermediate strengths is acceptable, the cycle's timestamp advances
/// with the per-entry updates.
pub fn run_cycle<R: Rng>(
    entries: &mut [MemoryEntry],
    dt_days: f64,
    now: DateTime<Utc>,
    rng: &mut R,
    config: &EngramConfig,
) -> ConsolidationStats {
    let start = Instant::now();
    let mut stats = ConsolidationStats::default();

    // Step 1: consolidate the working layer
    for entry in entries.iter_mut() {
        if entry.layer == MemoryLayer::Working && !entry.pinned {
            consolidate_entry(entry, dt_days, now, config);
            stats.stepped += 1;
        }
    }

    // Step 2: interleaved replay of archived entries
    let archived: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.layer == MemoryLayer::Archive)
        .map(|(i, _)| i)
        .collect();
    if !archived.is_empty() {
        let n_replay = ((archived.len() as f64 * config.interleave_ratio) as usize)
            .max(1)
            .min(archived.len());
        let sample: Vec<usize> = archived
            .choose_multiple(rng, n_replay)
            .copied()
            .collect();
        for i in sample {
            replay_entry(&mut entries[i], now, config);
            stats.replayed += 1;
        }
    }

    // Step 3: core layer decays with μ₂ only
    for entry in entries.iter_mut() {
        if entry.layer == MemoryLayer::Core && !entry.pinned {
            apply_decay(entry, dt_days, 0.0, config.mu2);
            stats.core_decayed += 1;
        }
    }

    // Step 4: rebalance layers
    for entry in entries.iter_mut() {
        if let Some(layer) = rebalanced_layer(entry, config) {
            match layer {
                MemoryLayer::Core => stats.promoted += 1,
                MemoryLayer::Archive => stats.archived += 1,
                MemoryLayer::Working => {}
            }
            entry.layer = layer;
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as i64;
    stats
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> EngramConfig {
        EngramConfig::default()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_step_transfers_then_decays() {
        let cfg = config();
        let now = Utc::now();
        let mut entry = MemoryEntry::new("step me", MemoryType::Factual);
        entry.importance = 0.5;

        consolidate_entry(&mut entry, 1.0, now, &cfg);

        // transfer = 0.08 * (0.2 + 0.25) * 1.0, then core decays by e^-0.005
        let expected_core = 0.08 * 0.45 * (-0.005f64).exp();
        assert!((entry.core_strength - expected_core).abs() < 1e-12);
        assert!((entry.working_strength - (-0.15f64).exp()).abs() < 1e-12);
        assert_eq!(entry.consolidation_count, 1);
        assert_eq!(entry.last_consolidated, Some(now));
    }

    #[test]
    fn test_pinned_entry_skips_step() {
        let cfg = config();
        let mut entry = MemoryEntry::new("pinned", MemoryType::Emotional);
        entry.pinned = true;

        consolidate_entry(&mut entry, 1.0, Utc::now(), &cfg);

        assert_eq!(entry.working_strength, 1.0);
        assert_eq!(entry.core_strength, 0.0);
        assert_eq!(entry.consolidation_count, 0);
    }

    #[test]
    fn test_half_steps_approximate_full_step() {
        // Two Δt/2 cycles land within 1% of one Δt cycle on total strength.
        let cfg = config();
        let now = Utc::now();
        let mut full = MemoryEntry::new("full", MemoryType::Factual);
        full.importance = 0.7;
        let mut halved = full.clone();

        consolidate_entry(&mut full, 1.0, now, &cfg);
        consolidate_entry(&mut halved, 0.5, now, &cfg);
        consolidate_entry(&mut halved, 0.5, now, &cfg);

        let relative =
            (full.total_strength() - halved.total_strength()).abs() / full.total_strength();
        assert!(relative < 0.01, "relative error {}", relative);
    }

    #[test]
    fn test_high_importance_promotes_within_five_cycles() {
        let cfg = config();
        let now = Utc::now();
        let mut entries = vec![{
            let mut e = MemoryEntry::new("important", MemoryType::Factual);
            e.importance = 0.9;
            e
        }];
        let mut rng = rng();

        for cycle in 0..7 {
            run_cycle(&mut entries, 1.0, now, &mut rng, &cfg);
            if cycle >= 4 {
                assert_eq!(entries[0].layer, MemoryLayer::Core, "cycle {}", cycle);
            }
        }
    }

    #[test]
    fn test_weak_working_entry_archives() {
        let cfg = config();
        let mut entries = vec![{
            let mut e = MemoryEntry::new("weak", MemoryType::Episodic);
            e.working_strength = 0.05;
            e.core_strength = 0.01;
            e
        }];

        run_cycle(&mut entries, 1.0, Utc::now(), &mut rng(), &cfg);
        assert_eq!(entries[0].layer, MemoryLayer::Archive);
    }

    #[test]
    fn test_replay_strictly_increases_archived_core() {
        let cfg = config();
        let now = Utc::now();
        let mut entries = vec![{
            let mut e = MemoryEntry::new("dormant", MemoryType::Factual);
            e.layer = MemoryLayer::Archive;
            e.working_strength = 0.0;
            e.core_strength = 0.02;
            e
        }];
        let mut rng = rng();

        let mut previous = entries[0].core_strength;
        for _ in 0..3 {
            let stats = run_cycle(&mut entries, 1.0, now, &mut rng, &cfg);
            assert_eq!(stats.replayed, 1);
            assert!(entries[0].core_strength > previous);
            previous = entries[0].core_strength;
        }
    }

    #[test]
    fn test_replay_sampling_deterministic_with_seed() {
        let cfg = EngramConfig {
            interleave_ratio: 0.5,
            ..EngramConfig::default()
        };
        let now = Utc::now();
        let make = || -> Vec<MemoryEntry> {
            (0..10)
                .map(|i| {
                    let mut e = MemoryEntry::new(format!("archived {}", i), MemoryType::Factual);
                    e.layer = MemoryLayer::Archive;
                    e
                })
                .collect()
        };

        let mut a = make();
        let mut b = make();
        run_cycle(&mut a, 1.0, now, &mut StdRng::seed_from_u64(42), &cfg);
        run_cycle(&mut b, 1.0, now, &mut StdRng::seed_from_u64(42), &cfg);

        let replayed = |entries: &[MemoryEntry]| -> Vec<i64> {
            entries.iter().map(|e| e.consolidation_count).collect()
        };
        assert_eq!(replayed(&a), replayed(&b));
    }

    #[test]
    fn test_pinned_always_rebalances_to_core() {
        let cfg = config();
        let mut entry = MemoryEntry::new("pinned", MemoryType::Emotional);
        entry.pinned = true;
        entry.working_strength = 0.0;
        entry.core_strength = 0.0;

        assert_eq!(rebalanced_layer(&entry, &cfg), Some(MemoryLayer::Core));
        entry.layer = MemoryLayer::Core;
        assert_eq!(rebalanced_layer(&entry, &cfg), None);
    }
}
