//! Activation-ranked retrieval pipeline
//!
//! Builds the candidate set (FTS probe or full scan, plus Hebbian and
//! entity-graph expansion), filters it, scores every candidate by ACT-R
//! retrieval activation, and returns the ranked, confidence-decorated
//! top K.
//!
//! The engine never writes: access logging, Hebbian strengthening, and
//! retrieval-induced suppression are the façade's job, which lets the
//! session gate run cheap probes without polluting the access history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::activation::retrieval_activation;
use crate::config::EngramConfig;
use crate::confidence::confidence;
use crate::forgetting::effective_strength;
use crate::memory::{MemoryEntry, MemoryLayer, RecallOptions, RecallResult};
use crate::search::keyword::{query_tokens, sanitize_fts_query};
use crate::storage::{Store, StoreResult};

/// Candidate pool fetched from FTS before ranking
const FTS_CANDIDATE_LIMIT: usize = 64;

/// Read-only retrieval engine over a store
pub struct SearchEngine<'a, S: Store + ?Sized> {
    store: &'a S,
    config: &'a EngramConfig,
}

impl<'a, S: Store + ?Sized> SearchEngine<'a, S> {
    /// Create an engine borrowing the store and config
    pub fn new(store: &'a S, config: &'a EngramConfig) -> Self {
        Self { store, config }
    }

    /// Rank memories for a query at the current instant
    pub fn search(&self, query: &str, opts: &RecallOptions) -> StoreResult<Vec<RecallResult>> {
        self.search_at(query, opts, Utc::now())
    }

    /// Rank memories for a query at an explicit instant
    pub fn search_at(
        &self,
        query: &str,
        opts: &RecallOptions,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<RecallResult>> {
        let tokens = query_tokens(query);

        // Step 1: candidate set - FTS probe, or the full non-archived set
        // when the query carries no searchable tokens
        let mut candidates: HashMap<String, MemoryEntry> = HashMap::new();
        if tokens.is_empty() {
            for entry in self.store.all()? {
                candidates.insert(entry.id.clone(), entry);
            }
        } else {
            let fts_query = sanitize_fts_query(query);
            let pool = FTS_CANDIDATE_LIMIT.max(opts.limit * 4);
            for entry in self.store.search_fts(&fts_query, pool)? {
                candidates.insert(entry.id.clone(), entry);
            }
        }

        // Step 2: graph expansion - Hebbian neighbors of every candidate,
        // plus entries mentioning entities named in the query
        if opts.graph_expand {
            let seed_ids: Vec<String> = candidates.keys().cloned().collect();
            for id in &seed_ids {
                for link in self.store.hebbian_neighbors(id, None)? {
                    if !candidates.contains_key(&link.target_id) {
                        if let Some(entry) = self.store.get(&link.target_id)? {
                            candidates.insert(link.target_id, entry);
                        }
                    }
                }
            }

            for entity in self.query_entities(&tokens)? {
                for entry in self.store.search_by_entity(&entity)? {
                    candidates.entry(entry.id.clone()).or_insert(entry);
                }
            }
        }

        // Step 3: layer / contradiction / type filters
        candidates.retain(|_, entry| {
            if entry.layer == MemoryLayer::Archive && !opts.include_archive {
                return false;
            }
            if entry.contradicted_by.is_some() && !opts.include_contradicted {
                return false;
            }
            if let Some(types) = &opts.types {
                if !types.contains(&entry.memory_type) {
                    return false;
                }
            }
            true
        });

        // Step 4: score and drop sub-threshold candidates. Salience is
        // normalized against the store-wide maximum effective strength.
        let max_effective = self
            .store
            .all()?
            .iter()
            .map(|e| effective_strength(e, now, self.config))
            .fold(f64::NEG_INFINITY, f64::max);
        let max_effective = (max_effective > 0.0).then_some(max_effective);

        let keywords: Vec<String> = match &opts.context_keywords {
            Some(kw) => kw.clone(),
            None => tokens.clone(),
        };

        let mut scored: Vec<RecallResult> = Vec::new();
        for (_, entry) in candidates {
            let access_times = self.store.access_times(&entry.id)?;
            let activation =
                retrieval_activation(&entry, &access_times, &keywords, now, self.config);
            if activation < self.config.min_activation {
                continue;
            }

            let conf = confidence(&entry, max_effective, now, self.config);
            if conf.combined < opts.min_confidence {
                continue;
            }

            let strength = effective_strength(&entry, now, self.config);
            scored.push(RecallResult {
                entry,
                activation,
                strength,
                confidence: conf,
            });
        }

        // Step 5: rank - activation, then importance, then recency
        scored.sort_by(|a, b| {
            b.activation
                .partial_cmp(&a.activation)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.entry
                        .importance
                        .partial_cmp(&a.entry.importance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| b.entry.last_accessed.cmp(&a.entry.last_accessed))
        });
        scored.truncate(opts.limit);

        Ok(scored)
    }

    /// Entities the query names, matched case-insensitively against the
    /// graph's known node ids
    fn query_entities(&self, tokens: &[String]) -> StoreResult<Vec<String>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut matched = Vec::new();
        for entity in self.store.known_entities()? {
            let entity_lower = entity.to_lowercase();
            if tokens.iter().any(|t| *t == entity_lower) {
                // expand through the graph up to the configured hop cap
                for related in self
                    .store
                    .related_entities(&entity, self.config.entity_hops)?
                {
                    matched.push(related);
                }
                matched.push(entity);
            }
        }
        matched.sort();
        matched.dedup();
        Ok(matched)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryType;
    use crate::storage::SqliteStore;
    use chrono::Duration;

    fn config() -> EngramConfig {
        EngramConfig::default()
    }

    fn seeded(store: &SqliteStore, content: &str, memory_type: MemoryType) -> MemoryEntry {
        let entry = MemoryEntry::new(content, memory_type);
        store.add(&entry).unwrap();
        store.record_access(&entry.id, entry.created_at).unwrap();
        entry
    }

    #[test]
    fn test_empty_store_returns_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let engine = SearchEngine::new(&store, &cfg);
        let results = engine.search("anything", &RecallOptions::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_keyword_match_ranks_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let coffee = seeded(&store, "the user prefers espresso", MemoryType::Relational);
        seeded(&store, "deploys run on fridays", MemoryType::Factual);

        let engine = SearchEngine::new(&store, &cfg);
        let results = engine.search("espresso", &RecallOptions::default()).unwrap();
        assert_eq!(results[0].entry.id, coffee.id);
    }

    #[test]
    fn test_stop_word_query_falls_back_to_full_scan() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        seeded(&store, "alpha memory", MemoryType::Factual);
        seeded(&store, "beta memory", MemoryType::Factual);

        let engine = SearchEngine::new(&store, &cfg);
        let results = engine
            .search("what is the", &RecallOptions::default())
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_archive_excluded_by_default() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let mut dormant = MemoryEntry::new("dormant fact", MemoryType::Factual);
        dormant.layer = MemoryLayer::Archive;
        store.add(&dormant).unwrap();
        store.record_access(&dormant.id, dormant.created_at).unwrap();

        let engine = SearchEngine::new(&store, &cfg);
        assert!(engine.search("dormant", &RecallOptions::default()).unwrap().is_empty());

        let opts = RecallOptions {
            include_archive: true,
            ..Default::default()
        };
        assert_eq!(engine.search("dormant", &opts).unwrap().len(), 1);
    }

    #[test]
    fn test_contradicted_excluded_by_default() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let mut contested = MemoryEntry::new("contested claim", MemoryType::Factual);
        contested.contradicted_by = Some("someone".to_string());
        store.add(&contested).unwrap();
        store.record_access(&contested.id, contested.created_at).unwrap();

        let engine = SearchEngine::new(&store, &cfg);
        assert!(engine.search("contested", &RecallOptions::default()).unwrap().is_empty());

        let opts = RecallOptions {
            include_contradicted: true,
            ..Default::default()
        };
        assert_eq!(engine.search("contested", &opts).unwrap().len(), 1);
    }

    #[test]
    fn test_type_filter() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        seeded(&store, "shared keyword fact", MemoryType::Factual);
        seeded(&store, "shared keyword feeling", MemoryType::Emotional);

        let engine = SearchEngine::new(&store, &cfg);
        let opts = RecallOptions {
            types: Some(vec![MemoryType::Emotional]),
            ..Default::default()
        };
        let results = engine.search("shared keyword", &opts).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.memory_type, MemoryType::Emotional);
    }

    #[test]
    fn test_hebbian_expansion_pulls_in_neighbors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let seed = seeded(&store, "espresso brewing notes", MemoryType::Procedural);
        let neighbor = seeded(&store, "grinder burr settings", MemoryType::Procedural);
        store.strengthen_link(&seed.id, &neighbor.id, 10.0).unwrap();

        let engine = SearchEngine::new(&store, &cfg);
        let results = engine.search("espresso", &RecallOptions::default()).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.entry.id.as_str()).collect();
        assert!(ids.contains(&seed.id.as_str()));
        assert!(ids.contains(&neighbor.id.as_str()));

        let opts = RecallOptions {
            graph_expand: false,
            ..Default::default()
        };
        let unexpanded = engine.search("espresso", &opts).unwrap();
        assert_eq!(unexpanded.len(), 1);
    }

    #[test]
    fn test_entity_expansion_from_query() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let tagged = seeded(&store, "sprint planning went long", MemoryType::Episodic);
        store.add_graph_link(&tagged.id, "alice", "attended").unwrap();

        let engine = SearchEngine::new(&store, &cfg);
        let results = engine.search("alice", &RecallOptions::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.id, tagged.id);
    }

    #[test]
    fn test_recency_and_frequency_rank_higher() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        let now = Utc::now();

        // m1: added early, practiced five times
        let m1 = seeded(&store, "first topic memory", MemoryType::Factual);
        for i in 0..5 {
            store
                .record_access(&m1.id, now + Duration::seconds(10 + i))
                .unwrap();
        }
        // m2: added later, recalled once
        let m2 = seeded(&store, "second topic memory", MemoryType::Factual);
        store
            .record_access(&m2.id, now + Duration::seconds(300))
            .unwrap();

        let engine = SearchEngine::new(&store, &cfg);
        let results = engine
            .search_at("", &RecallOptions::default(), now + Duration::seconds(600))
            .unwrap();
        assert_eq!(results[0].entry.id, m1.id);
        assert_eq!(results[1].entry.id, m2.id);
    }

    #[test]
    fn test_limit_truncates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cfg = config();
        for i in 0..10 {
            seeded(&store, &format!("filler memory {}", i), MemoryType::Factual);
        }

        let engine = SearchEngine::new(&store, &cfg);
        let opts = RecallOptions {
            limit: 3,
            ..Default::default()
        };
        assert_eq!(engine.search("", &opts).unwrap().len(), 3);
    }
}
