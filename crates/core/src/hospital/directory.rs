//! The published hospital directory.
//!
//! Readers take an `Arc` to the current [`DirectorySnapshot`] and search it without holding any
//! lock. An import builds a complete replacement off to the side and [`HospitalDirectory::publish`]
//! swaps it in, so a search sees either the old set or the new one, never a mix.

use crate::error::{MediMapError, MediMapResult};
use crate::hospital::record::HospitalRecord;
use crate::hospital::recommend::{recommend, RecommendQuery, Recommendations};
use crate::hospital::search::{search, SearchQuery, SearchResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// An immutable, fully-validated set of hospitals.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    generation: u64,
    published_at: DateTime<Utc>,
    records: Vec<HospitalRecord>,
}

impl DirectorySnapshot {
    /// Monotonic publish counter, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn records(&self) -> &[HospitalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search(&self, query: &SearchQuery, top_n: usize) -> SearchResult {
        search(&self.records, query, top_n)
    }

    pub fn recommend(&self, query: &RecommendQuery, top_n: usize) -> Recommendations {
        recommend(&self.records, query, top_n)
    }

    /// Summary counts over the snapshot.
    pub fn stats(&self) -> DirectoryStats {
        let mut by_level = BTreeMap::new();
        for record in &self.records {
            *by_level.entry(record.level.get()).or_insert(0) += 1;
        }

        let beds: Vec<u32> = self.records.iter().filter_map(|r| r.bed_count).collect();
        let average_bed_count = if beds.is_empty() {
            None
        } else {
            let total: u64 = beds.iter().map(|b| u64::from(*b)).sum();
            Some((total as f64 / beds.len() as f64 * 10.0).round() / 10.0)
        };

        DirectoryStats {
            total_hospitals: self.records.len(),
            by_level,
            with_emergency_services: self.records.iter().filter(|r| r.emergency_services).count(),
            average_bed_count,
            unique_facilities: self.facilities().len(),
            unique_specialties: self.specialties().len(),
            generation: self.generation,
            published_at: self.published_at,
        }
    }

    /// Distinct facility names, sorted.
    pub fn facilities(&self) -> Vec<String> {
        distinct(self.records.iter().flat_map(|r| r.facilities.iter()))
    }

    /// Distinct specialty names, sorted.
    pub fn specialties(&self) -> Vec<String> {
        distinct(self.records.iter().flat_map(|r| r.specialties.iter()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Directory summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryStats {
    pub total_hospitals: usize,
    /// Count per level, keyed by level number. Levels with no hospitals are absent.
    pub by_level: BTreeMap<u8, usize>,
    pub with_emergency_services: usize,
    /// Mean over records that report a bed count, to one decimal place.
    pub average_bed_count: Option<f64>,
    pub unique_facilities: usize,
    pub unique_specialties: usize,
    pub generation: u64,
    pub published_at: DateTime<Utc>,
}

/// Shared handle to the current snapshot.
#[derive(Debug, Default)]
pub struct HospitalDirectory {
    current: RwLock<Option<Arc<DirectorySnapshot>>>,
}

impl HospitalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory already holding `records`.
    pub fn with_records(records: Vec<HospitalRecord>) -> Self {
        let directory = Self::new();
        directory.publish(records);
        directory
    }

    /// Replaces the current snapshot with `records` and returns the new snapshot.
    pub fn publish(&self, records: Vec<HospitalRecord>) -> Arc<DirectorySnapshot> {
        let mut current = self.current.write();
        let generation = current.as_ref().map_or(1, |s| s.generation + 1);
        let snapshot = Arc::new(DirectorySnapshot {
            generation,
            published_at: Utc::now(),
            records,
        });
        *current = Some(Arc::clone(&snapshot));
        tracing::info!(
            generation,
            hospitals = snapshot.len(),
            "published hospital directory"
        );
        snapshot
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::EmptyDirectory`] if nothing has been published yet.
    pub fn snapshot(&self) -> MediMapResult<Arc<DirectorySnapshot>> {
        self.current
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(MediMapError::EmptyDirectory)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Searches the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::EmptyDirectory`] if nothing has been published yet.
    pub fn search(&self, query: &SearchQuery, top_n: usize) -> MediMapResult<SearchResult> {
        Ok(self.snapshot()?.search(query, top_n))
    }

    /// Recommends from the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::EmptyDirectory`] if nothing has been published yet.
    pub fn recommend(&self, query: &RecommendQuery, top_n: usize) -> MediMapResult<Recommendations> {
        Ok(self.snapshot()?.recommend(query, top_n))
    }

    pub fn stats(&self) -> MediMapResult<DirectoryStats> {
        Ok(self.snapshot()?.stats())
    }

    pub fn facilities(&self) -> MediMapResult<Vec<String>> {
        Ok(self.snapshot()?.facilities())
    }

    pub fn specialties(&self) -> MediMapResult<Vec<String>> {
        Ok(self.snapshot()?.specialties())
    }
}
