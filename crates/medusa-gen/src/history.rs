//! In-memory session history of completed generations

use crate::job::now_iso8601;
use crate::provider::{GenerateResult, Modality};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 50;

/// One completed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub prompt: String,
    pub provider: String,
    pub asset_url: String,
    pub modality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Bounded record of generations within a session, newest first
#[derive(Debug)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record a completed generation, evicting the oldest entry when full
    pub fn record(&mut self, result: &GenerateResult, modality: Modality) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(HistoryEntry {
            timestamp: now_iso8601(),
            prompt: result.prompt_used.clone(),
            provider: result.provider.clone(),
            asset_url: result.asset_url.clone(),
            modality: modality.to_string(),
            content_hash: result.metadata.get("content_hash").cloned(),
        });
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(limit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}
