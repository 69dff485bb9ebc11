//! Bounded in-memory prediction history

use crate::models::{Modality, PredictionResult};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Default number of predictions retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub modality: Modality,
    #[serde(flatten)]
    pub result: PredictionResult,
}

/// Most recent predictions, oldest evicted first
pub struct PredictionHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl PredictionHistory {
    /// A zero capacity is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a result, returning the new length
    pub async fn record(&self, modality: Modality, result: PredictionResult) -> usize {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(HistoryEntry {
            modality,
            result,
        });
        entries.len()
    }

    /// Entries in insertion order
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn find(&self, prediction_id: &str) -> Option<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.result.prediction_id == prediction_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop all entries, returning how many were removed
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }
}

impl Default for PredictionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
