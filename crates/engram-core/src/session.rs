//! Session Working Memory
//!
//! A per-session bounded set of recently active memory ids (Miller's
//! 7 +/- 2) with time-based decay. Before paying for a full recall, the
//! gate probes cheaply and compares the probe against what is already
//! active (plus its Hebbian neighborhood): on a continuous topic the
//! active set is simply projected back, cutting full-recall invocations
//! sharply while still catching topic drift.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngramConfig;
use crate::memory::{RecallOptions, RecallResult};
use crate::search::SearchEngine;
use crate::storage::{Store, StoreResult};

// ============================================================================
// GATE DECISION
// ============================================================================

/// Why the gate decided for or against a full recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    /// Nothing active in the session - recall needed
    EmptyWm,
    /// The cheap probe matched nothing - recall needed
    EmptyProbe,
    /// Probe overlaps too little with the active set - topic changed
    TopicChange,
    /// Probe stays within the active set and its neighborhood
    TopicContinuous,
}

impl GateReason {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GateReason::EmptyWm => "empty_wm",
            GateReason::EmptyProbe => "empty_probe",
            GateReason::TopicChange => "topic_change",
            GateReason::TopicContinuous => "topic_continuous",
        }
    }
}

impl std::fmt::Display for GateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the recall gate
#[derive(Debug, Clone, Copy)]
pub struct GateDecision {
    /// Whether a full recall should run
    pub needs_recall: bool,
    /// Why
    pub reason: GateReason,
    /// Probe overlap with the active set, in [0, 1]
    pub overlap: f64,
}

/// Result of a gated session recall
#[derive(Debug, Clone)]
pub struct SessionRecallResult {
    /// Ranked results - fresh on a full recall, projected from the active
    /// set otherwise
    pub results: Vec<RecallResult>,
    /// The gate's reasoning
    pub reason: GateReason,
    /// Whether a full recall actually ran
    pub performed_full_recall: bool,
}

// ============================================================================
// SESSION WORKING MEMORY
// ============================================================================

/// Bounded, decaying set of active memory ids for one session
#[derive(Debug, Clone)]
pub struct SessionWorkingMemory {
    /// Active ids with their activation instants, most recent last
    items: Vec<(String, DateTime<Utc>)>,
    capacity: usize,
    decay_secs: f64,
}

impl SessionWorkingMemory {
    /// Create a session set with the given capacity and decay window.
    /// A decay window of zero disables time-based expiry (pure-capacity
    /// LRU).
    pub fn new(capacity: usize, decay_secs: f64) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
            decay_secs,
        }
    }

    /// Create a session set from the engine configuration
    pub fn from_config(config: &EngramConfig) -> Self {
        Self::new(config.session_capacity, config.session_decay_secs)
    }

    /// Number of active ids after the most recent prune
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is active
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currently active ids
    pub fn active_ids(&self) -> Vec<String> {
        self.items.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Mark ids active at `now`, then prune expired and over-capacity items
    pub fn activate(&mut self, ids: &[String], now: DateTime<Utc>) {
        for id in ids {
            if let Some(slot) = self.items.iter_mut().find(|(existing, _)| existing == id) {
                slot.1 = now;
            } else {
                self.items.push((id.clone(), now));
            }
        }
        self.prune(now);
    }

    /// Drop expired items, then trim to capacity keeping the most recent
    pub fn prune(&mut self, now: DateTime<Utc>) {
        if self.decay_secs > 0.0 {
            let window = Duration::milliseconds((self.decay_secs * 1000.0) as i64);
            self.items.retain(|(_, t)| now - *t < window);
        }
        if self.items.len() > self.capacity {
            self.items.sort_by_key(|(_, t)| *t);
            let excess = self.items.len() - self.capacity;
            self.items.drain(..excess);
        }
    }

    /// Decide whether a query warrants a full recall.
    ///
    /// Runs a cheap probe (no graph expansion) and measures its overlap
    /// with the active set union its Hebbian neighborhood.
    pub fn needs_recall<S: Store + ?Sized>(
        &mut self,
        query: &str,
        store: &S,
        config: &EngramConfig,
        now: DateTime<Utc>,
    ) -> StoreResult<GateDecision> {
        self.prune(now);
        if self.is_empty() {
            return Ok(GateDecision {
                needs_recall: true,
                reason: GateReason::EmptyWm,
                overlap: 0.0,
            });
        }

        let mut known: HashSet<String> = self.active_ids().into_iter().collect();
        for id in self.active_ids() {
            for link in store.hebbian_neighbors(&id, None)? {
                known.insert(link.target_id);
            }
        }

        let probe_opts = RecallOptions {
            limit: config.session_probe_limit,
            graph_expand: false,
            ..Default::default()
        };
        let probe = SearchEngine::new(store, config).search_at(query, &probe_opts, now)?;
        if probe.is_empty() {
            return Ok(GateDecision {
                needs_recall: true,
                reason: GateReason::EmptyProbe,
                overlap: 0.0,
            });
        }

        let hits = probe
            .iter()
            .filter(|r| known.contains(&r.entry.id))
            .count();
        let overlap = hits as f64 / probe.len() as f64;

        if overlap < config.session_overlap_threshold {
            Ok(GateDecision {
                needs_recall: true,
                reason: GateReason::TopicChange,
                overlap,
            })
        } else {
            Ok(GateDecision {
                needs_recall: false,
                reason: GateReason::TopicContinuous,
                overlap,
            })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
