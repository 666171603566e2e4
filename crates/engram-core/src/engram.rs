//! Engram façade - the host-facing memory API
//!
//! Owns the store and orchestrates every operation: add, recall,
//! consolidate, forgetting, reward, sessions, and stats. This is the only
//! component that writes access-log rows; everything downstream reads
//! them.
//!
//! Lock discipline: a single reader/writer lock over the whole store.
//! Mutations (add, consolidate, reward, forget, prune, pin, downscale)
//! serialize behind the write guard; recall and other reads share the
//! read guard. Recall's own post-ranking writes (access log, Hebbian
//! strengthening, suppression) ride the shared guard and are serialized
//! per-statement by the store itself.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::anomaly::BaselineTracker;
use crate::config::EngramConfig;
use crate::consolidation::{run_cycle, synaptic_downscale};
use crate::error::{EngramError, Result};
use crate::forgetting::{effective_strength, should_forget, suppression_multiplier};
use crate::memory::{
    AddInput, ConsolidationStats, DownscaleStats, LayerStats, MemoryEntry, MemoryLayer,
    MemoryStats, MemoryType, RecallOptions, RecallResult, TypeStats,
};
use crate::reward::{apply_reward, detect_feedback, Polarity};
use crate::search::SearchEngine;
use crate::session::{SessionRecallResult, SessionWorkingMemory};
use crate::storage::{SqliteStore, Store, StoreError};

/// Main interface to the Engram memory system.
///
/// Generic over the storage backend; [`SqliteStore`] is the reference
/// implementation.
pub struct Engram<S: Store = SqliteStore> {
    store: S,
    config: EngramConfig,
    lock: RwLock<()>,
    tracker: Mutex<BaselineTracker>,
    sessions: Mutex<HashMap<String, SessionWorkingMemory>>,
    rng: Mutex<StdRng>,
}

impl Engram<SqliteStore> {
    /// Open (or create) an engram database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_store(SqliteStore::open(path)?, EngramConfig::default())
    }

    /// Open with an explicit configuration
    pub fn open_with_config(path: impl AsRef<Path>, config: EngramConfig) -> Result<Self> {
        Self::with_store(SqliteStore::open(path)?, config)
    }

    /// Open in the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::with_store(SqliteStore::open_default()?, EngramConfig::default())
    }

    /// Open a non-persistent in-memory instance
    pub fn open_in_memory() -> Result<Self> {
        Self::with_store(SqliteStore::open_in_memory()?, EngramConfig::default())
    }

    /// Open a non-persistent in-memory instance with a configuration
    pub fn in_memory_with_config(config: EngramConfig) -> Result<Self> {
        Self::with_store(SqliteStore::open_in_memory()?, config)
    }
}

impl<S: Store> Engram<S> {
    /// Wrap an existing store. The config is validated once here.
    pub fn with_store(store: S, config: EngramConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.replay_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tracker = BaselineTracker::new(config.anomaly_window_size);
        Ok(Self {
            store,
            config,
            lock: RwLock::new(()),
            tracker: Mutex::new(tracker),
            sessions: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &EngramConfig {
        &self.config
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, ()>> {
        self.lock
            .read()
            .map_err(|_| EngramError::Storage(StoreError::Init("Engine lock poisoned".into())))
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, ()>> {
        self.lock
            .write()
            .map_err(|_| EngramError::Storage(StoreError::Init("Engine lock poisoned".into())))
    }

    fn tracker_guard(&self) -> Result<MutexGuard<'_, BaselineTracker>> {
        self.tracker
            .lock()
            .map_err(|_| EngramError::Storage(StoreError::Init("Tracker lock poisoned".into())))
    }

    // ========================================================================
    // ADD / GET
    // ========================================================================

    /// Store a new memory and return its id.
    ///
    /// The entry starts in the working layer with a full hippocampal trace
    /// (`working_strength = 1.0`, `core_strength = 0.0`) and one access-log
    /// row. With `contradicts` set, the referenced memory gets its
    /// `contradicted_by` back-reference in the same call.
    pub fn add(&self, input: AddInput) -> Result<String> {
        let _guard = self.write_guard()?;

        if input.content.trim().is_empty() {
            return Err(EngramError::invalid_input("content must be non-empty"));
        }
        if let Some(importance) = input.importance {
            if !(0.0..=1.0).contains(&importance) {
                return Err(EngramError::InvalidInput(format!(
                    "importance must be in [0, 1], got {}",
                    importance
                )));
            }
        }

        // Resolve the contradiction target before publishing anything
        let contradicted = match &input.contradicts {
            Some(target_id) => Some(self.store.get(target_id)?.ok_or_else(|| {
                EngramError::InvalidInput(format!("contradicts unknown memory: {}", target_id))
            })?),
            None => None,
        };

        let mut entry = MemoryEntry::new(input.content, input.memory_type);
        if let Some(importance) = input.importance {
            entry.importance = importance;
        }
        entry.context = input.context;
        entry.pinned = input.pinned;
        entry.contradicts = input.contradicts.clone();
        entry.access_count = 1;

        // Publish the entry before its first access-log row
        self.store.add(&entry)?;
        self.store.record_access(&entry.id, entry.created_at)?;

        if let Some(mut target) = contradicted {
            target.contradicted_by = Some(entry.id.clone());
            self.store.update(&target)?;
        }

        for (node, relation) in &input.entities {
            self.store.add_graph_link(&entry.id, node, relation)?;
        }

        self.tracker_guard()?.update("encoding_rate", 1.0);
        tracing::debug!(id = %entry.id, memory_type = %entry.memory_type, "memory added");

        Ok(entry.id)
    }

    /// Fetch an entry by id, without recording an access
    pub fn get(&self, id: &str) -> Result<Option<MemoryEntry>> {
        let _guard = self.read_guard()?;
        Ok(self.store.get(id)?)
    }

    // ========================================================================
    // RECALL
    // ========================================================================

    /// Retrieve relevant memories, ranked by ACT-R activation.
    ///
    /// Every returned memory gets a new access-log row, every returned
    /// pair a Hebbian strengthening, and the top result suppresses its
    /// same-type competitors (retrieval-induced forgetting).
    pub fn recall(&self, query: &str, opts: &RecallOptions) -> Result<Vec<RecallResult>> {
        let _guard = self.read_guard()?;
        self.recall_locked(query, opts, Utc::now())
    }

    fn recall_locked(
        &self,
        query: &str,
        opts: &RecallOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecallResult>> {
        let engine = SearchEngine::new(&self.store, &self.config);
        let mut results = engine.search_at(query, opts, now)?;

        // Access bookkeeping: one log row per returned id
        for result in &mut results {
            result.entry.access_count += 1;
            result.entry.last_accessed = now;
            self.store.record_access(&result.entry.id, now)?;
            self.store.update(&result.entry)?;
        }

        // Hebbian strengthening between every returned pair
        for i in 0..results.len() {
            for j in (i + 1)..results.len() {
                self.store.strengthen_link(
                    &results[i].entry.id,
                    &results[j].entry.id,
                    self.config.hebbian_ceiling,
                )?;
            }
        }

        // Retrieval-induced forgetting
        let suppressor_count = if self.config.suppress_all_results {
            results.len()
        } else {
            results.len().min(1)
        };
        for suppressor in results.iter().take(suppressor_count) {
            self.suppress_competitors(&suppressor.entry)?;
        }

        self.tracker_guard()?
            .update("retrieval_count", results.len() as f64);

        Ok(results)
    }

    fn suppress_competitors(&self, retrieved: &MemoryEntry) -> Result<()> {
        for mut competitor in self.store.all()? {
            if let Some(multiplier) =
                suppression_multiplier(retrieved, &competitor, &self.config)
            {
                competitor.working_strength *= multiplier;
                self.store.update(&competitor)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // CONSOLIDATION & FORGETTING
    // ========================================================================

    /// Run one consolidation cycle over `dt_days` of simulated time.
    ///
    /// Steps the working layer through the Memory-Chain dynamics, replays
    /// a sample of the archive, decays the core layer, and rebalances
    /// layers. Call periodically - once per "day" of agent operation, or
    /// after significant learning sessions.
    pub fn consolidate(&self, dt_days: f64) -> Result<ConsolidationStats> {
        if !(dt_days > 0.0 && dt_days.is_finite()) {
            return Err(EngramError::Config(format!(
                "dt_days must be > 0, got {}",
                dt_days
            )));
        }
        let _guard = self.write_guard()?;
        let now = Utc::now();

        let mut entries = self.store.all()?;
        let stats = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| EngramError::Storage(StoreError::Init("RNG lock poisoned".into())))?;
            run_cycle(&mut entries, dt_days, now, &mut *rng, &self.config)
        };

        for entry in &entries {
            self.store.update(entry)?;
        }

        tracing::debug!(
            stepped = stats.stepped,
            replayed = stats.replayed,
            promoted = stats.promoted,
            archived = stats.archived,
            "consolidation cycle complete"
        );
        Ok(stats)
    }

    /// Global synaptic downscaling: multiply both traces of every
    /// non-pinned entry by `factor` in (0, 1]. Keeps reward and replay
    /// growth bounded without reordering memories.
    pub fn downscale(&self, factor: f64) -> Result<DownscaleStats> {
        let _guard = self.write_guard()?;
        let mut entries = self.store.all()?;
        let stats = synaptic_downscale(&mut entries, factor)?;
        for entry in &entries {
            self.store.update(entry)?;
        }
        Ok(stats)
    }

    /// Permanently remove a memory.
    ///
    /// Cascades to its access log, graph links, Hebbian links in both
    /// directions, and contradiction back-references.
    pub fn forget(&self, id: &str) -> Result<()> {
        let _guard = self.write_guard()?;
        if !self.store.delete(id)? {
            return Err(EngramError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Archive every non-pinned entry whose effective strength has fallen
    /// below `threshold`. Content is retained; archived entries just stop
    /// surfacing in default recall. Returns the archived ids.
    pub fn prune(&self, threshold: f64) -> Result<Vec<String>> {
        let _guard = self.write_guard()?;
        let now = Utc::now();
        let mut pruned = Vec::new();

        for mut entry in self.store.all()? {
            if entry.layer != MemoryLayer::Archive
                && should_forget(&entry, threshold, now, &self.config)
            {
                entry.layer = MemoryLayer::Archive;
                self.store.update(&entry)?;
                pruned.push(entry.id);
            }
        }

        if !pruned.is_empty() {
            tracing::debug!(count = pruned.len(), "pruned weak memories to archive");
        }
        Ok(pruned)
    }

    // ========================================================================
    // REWARD
    // ========================================================================

    /// Process natural-language feedback as a reward signal, using the
    /// configured magnitude and recency window.
    pub fn reward(&self, feedback: &str) -> Result<(Polarity, f64)> {
        self.reward_with(
            feedback,
            self.config.reward_recent_n,
            self.config.reward_magnitude,
        )
    }

    /// Process feedback with explicit parameters.
    ///
    /// Detects polarity from the configured wordlists and applies a
    /// discounted importance/strength modulation to the `recent_n` most
    /// recently accessed memories. Neutral or low-confidence detections
    /// are a no-op. Returns what was detected either way.
    pub fn reward_with(
        &self,
        feedback: &str,
        recent_n: usize,
        magnitude: f64,
    ) -> Result<(Polarity, f64)> {
        let _guard = self.write_guard()?;

        let (polarity, detection_confidence) = detect_feedback(
            feedback,
            &self.config.positive_signals,
            &self.config.negative_signals,
        );
        if polarity == Polarity::Neutral
            || detection_confidence < self.config.min_feedback_confidence
        {
            return Ok((polarity, detection_confidence));
        }

        let mut entries = self.store.all()?;
        entries.sort_by(|a, b| {
            b.last_accessed
                .cmp(&a.last_accessed)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        entries.truncate(recent_n);

        apply_reward(&mut entries, polarity, magnitude, &self.config);
        for entry in &entries {
            self.store.update(entry)?;
        }

        tracing::debug!(%polarity, affected = entries.len(), "reward applied");
        Ok((polarity, detection_confidence))
    }

    // ========================================================================
    // PIN / CONTRADICTION
    // ========================================================================

    /// Pin a memory - it won't decay, archive, or downscale
    pub fn pin(&self, id: &str) -> Result<()> {
        self.set_pinned(id, true)
    }

    /// Unpin a memory - it resumes normal decay
    pub fn unpin(&self, id: &str) -> Result<()> {
        self.set_pinned(id, false)
    }

    fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        let _guard = self.write_guard()?;
        let mut entry = self
            .store
            .get(id)?
            .ok_or_else(|| EngramError::NotFound(id.to_string()))?;
        entry.pinned = pinned;
        self.store.update(&entry)?;
        Ok(())
    }

    /// Record that memory `a` contradicts memory `b` (bidirectional edge)
    pub fn link_contradiction(&self, a: &str, b: &str) -> Result<()> {
        let _guard = self.write_guard()?;
        let mut first = self
            .store
            .get(a)?
            .ok_or_else(|| EngramError::NotFound(a.to_string()))?;
        let mut second = self
            .store
            .get(b)?
            .ok_or_else(|| EngramError::NotFound(b.to_string()))?;

        first.contradicts = Some(second.id.clone());
        second.contradicted_by = Some(first.id.clone());
        self.store.update(&first)?;
        self.store.update(&second)?;
        Ok(())
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    /// Gated recall for a conversation session.
    ///
    /// Consults the session's working-memory gate first: on a continuous
    /// topic the active entries are projected back with fresh confidence
    /// and no access-log rows; otherwise a full recall runs and its
    /// results are activated into the session set.
    pub fn session_recall(
        &self,
        session_id: &str,
        query: &str,
        opts: &RecallOptions,
    ) -> Result<SessionRecallResult> {
        let _guard = self.read_guard()?;
        let now = Utc::now();

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| EngramError::Storage(StoreError::Init("Session lock poisoned".into())))?;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionWorkingMemory::from_config(&self.config));

        let decision = session.needs_recall(query, &self.store, &self.config, now)?;

        if decision.needs_recall {
            let results = self.recall_locked(query, opts, now)?;
            let ids: Vec<String> = results.iter().map(|r| r.entry.id.clone()).collect();
            session.activate(&ids, now);
            return Ok(SessionRecallResult {
                results,
                reason: decision.reason,
                performed_full_recall: true,
            });
        }

        // Continuous topic: project the active set, no access logging
        let max_effective = self
            .store
            .all()?
            .iter()
            .map(|e| effective_strength(e, now, &self.config))
            .fold(f64::NEG_INFINITY, f64::max);
        let max_effective = (max_effective > 0.0).then_some(max_effective);

        let mut results = Vec::new();
        for id in session.active_ids() {
            if let Some(entry) = self.store.get(&id)? {
                let access_times = self.store.access_times(&id)?;
                let activation = crate::activation::retrieval_activation(
                    &entry,
                    &access_times,
                    &[],
                    now,
                    &self.config,
                );
                let strength = effective_strength(&entry, now, &self.config);
                let conf = crate::confidence::confidence(&entry, max_effective, now, &self.config);
                results.push(RecallResult {
                    entry,
                    activation,
                    strength,
                    confidence: conf,
                });
            }
        }
        results.sort_by(|a, b| {
            b.activation
                .partial_cmp(&a.activation)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(opts.limit);

        Ok(SessionRecallResult {
            results,
            reason: decision.reason,
            performed_full_recall: false,
        })
    }

    /// Drop a session's working-memory set
    pub fn clear_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| EngramError::Storage(StoreError::Init("Session lock poisoned".into())))?;
        sessions.remove(session_id);
        Ok(())
    }

    /// Ids of sessions with a live working-memory set
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| EngramError::Storage(StoreError::Init("Session lock poisoned".into())))?;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    // ========================================================================
    // STATS / EXPORT / CLOSE
    // ========================================================================

    /// Memory-system statistics: counts and average strengths by layer and
    /// type, pinned and Hebbian counts, and the tracked anomaly metrics.
    pub fn stats(&self) -> Result<MemoryStats> {
        let _guard = self.read_guard()?;
        let now = Utc::now();
        let entries = self.store.all()?;

        let mut stats = MemoryStats {
            total_memories: entries.len() as i64,
            pinned: entries.iter().filter(|e| e.pinned).count() as i64,
            hebbian_links: self.store.hebbian_link_count()?,
            anomaly_metrics: self.tracker_guard()?.metrics(),
            oldest_memory: entries.iter().map(|e| e.created_at).min(),
            newest_memory: entries.iter().map(|e| e.created_at).max(),
            ..Default::default()
        };

        for layer in MemoryLayer::ALL {
            let members: Vec<&MemoryEntry> =
                entries.iter().filter(|e| e.layer == layer).collect();
            if members.is_empty() {
                stats.by_layer.insert(layer.as_str().to_string(), LayerStats::default());
                continue;
            }
            let n = members.len() as f64;
            stats.by_layer.insert(
                layer.as_str().to_string(),
                LayerStats {
                    count: members.len() as i64,
                    avg_working: members.iter().map(|e| e.working_strength).sum::<f64>() / n,
                    avg_core: members.iter().map(|e| e.core_strength).sum::<f64>() / n,
                    avg_importance: members.iter().map(|e| e.importance).sum::<f64>() / n,
                },
            );
        }

        for memory_type in MemoryType::ALL {
            let members: Vec<&MemoryEntry> = entries
                .iter()
                .filter(|e| e.memory_type == memory_type)
                .collect();
            if members.is_empty() {
                continue;
            }
            let n = members.len() as f64;
            stats.by_type.insert(
                memory_type.as_str().to_string(),
                TypeStats {
                    count: members.len() as i64,
                    avg_strength: members
                        .iter()
                        .map(|e| effective_strength(e, now, &self.config))
                        .sum::<f64>()
                        / n,
                    avg_importance: members.iter().map(|e| e.importance).sum::<f64>() / n,
                },
            );
        }

        Ok(stats)
    }

    /// Whether a value for an operational metric deviates from its rolling
    /// baseline by more than the configured sigma threshold
    pub fn is_anomalous(&self, metric: &str, value: f64) -> Result<bool> {
        let tracker = self.tracker_guard()?;
        Ok(tracker.is_anomaly(
            metric,
            value,
            self.config.anomaly_sigma_threshold,
            self.config.anomaly_min_samples,
        ))
    }

    /// Copy the logical database to a file
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let _guard = self.read_guard()?;
        self.store.export(path.as_ref())?;
        Ok(())
    }

    /// Flush and consume the façade. The only operation that invalidates
    /// the instance.
    pub fn close(self) -> Result<()> {
        let _guard = self.write_guard()?;
        self.store.close()?;
        Ok(())
    }
}
