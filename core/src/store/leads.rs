// Lead list store with capacity degradation
//
// Snapshots are serialized to JSON, lz4-compressed, and written under a
// single key. When the medium rejects a write for quota, the snapshot is
// retried at 10 lists, then at 5; the in-memory collection is never cut
// down by that ladder, only the bytes on the medium are.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::message::types::Platform;
use crate::store::compress::Compression;
use crate::store::medium::{MediumError, StorageMedium};
use crate::store::{current_timestamp_ms, StoreError};

/// Retention cap: only the most recently updated lists are kept
pub const MAX_LEAD_LISTS: usize = 10;

/// Last-resort snapshot size when even the capped snapshot will not fit
const FALLBACK_LISTS: usize = 5;

/// Key the whole snapshot lives under
pub const LEAD_STORAGE_KEY: &str = "lead-storage";

/// How a mapped column should be read when contacting a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    Username,
    ProfileUrl,
}

/// Ties one imported column to one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMapping {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: HandleKind,
}

/// One imported row, keyed by column name
pub type LeadRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadList {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub leads: Vec<LeadRow>,
    pub platform_mappings: BTreeMap<Platform, PlatformMapping>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Partial edit of a stored list; `None` fields are left alone
#[derive(Debug, Clone, Default)]
pub struct LeadListUpdate {
    pub name: Option<String>,
    pub leads: Option<Vec<LeadRow>>,
    pub platform_mappings: Option<BTreeMap<Platform, PlatformMapping>>,
}

pub struct LeadListStore {
    medium: Arc<dyn StorageMedium>,
    compression: Arc<dyn Compression>,
    lists: Vec<LeadList>,
}

impl LeadListStore {
    /// Open the store over a medium. Unreadable or corrupt persisted
    /// state is logged and replaced with an empty collection, so this
    /// never fails.
    pub fn open(medium: Arc<dyn StorageMedium>, compression: Arc<dyn Compression>) -> Self {
        let lists = load_snapshot(medium.as_ref(), compression.as_ref());
        Self {
            medium,
            compression,
            lists,
        }
    }

    /// Create a list, apply retention, and persist.
    ///
    /// Returns the created list so callers can hand its id back out.
    /// With the cap already full the least recently updated list drops
    /// out of the collection.
    pub fn add_list(
        &mut self,
        name: String,
        columns: Vec<String>,
        leads: Vec<LeadRow>,
        platform_mappings: BTreeMap<Platform, PlatformMapping>,
    ) -> Result<LeadList, StoreError> {
        let now = current_timestamp_ms();
        let list = LeadList {
            id: Uuid::new_v4().to_string(),
            name,
            columns,
            leads,
            platform_mappings,
            created_at: now,
            updated_at: now,
        };

        self.lists.push(list.clone());
        self.lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.lists.truncate(MAX_LEAD_LISTS);
        self.persist()?;
        Ok(list)
    }

    /// Apply a partial edit and refresh `updated_at`. An unknown id is
    /// a no-op and issues no write.
    pub fn update_list(&mut self, id: &str, update: LeadListUpdate) -> Result<(), StoreError> {
        let list = match self.lists.iter_mut().find(|l| l.id == id) {
            Some(list) => list,
            None => return Ok(()),
        };

        if let Some(name) = update.name {
            list.name = name;
        }
        if let Some(leads) = update.leads {
            list.leads = leads;
        }
        if let Some(mappings) = update.platform_mappings {
            list.platform_mappings = mappings;
        }
        list.updated_at = current_timestamp_ms();
        self.persist()
    }

    /// Remove a list. An unknown id is a no-op and issues no write.
    pub fn delete_list(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.lists.len();
        self.lists.retain(|l| l.id != id);
        if self.lists.len() == before {
            return Ok(());
        }
        self.persist()
    }

    pub fn get_list(&self, id: &str) -> Option<&LeadList> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// Resolve the contact handle for one lead on one platform, via the
    /// list's column mapping. Any missing link in the chain is `None`.
    pub fn get_lead_value(
        &self,
        list_id: &str,
        row_index: usize,
        platform: Platform,
    ) -> Option<&str> {
        let list = self.get_list(list_id)?;
        let mapping = list.platform_mappings.get(&platform)?;
        let row = list.leads.get(row_index)?;
        row.get(&mapping.column).map(String::as_str)
    }

    /// Re-apply retention to a collection that grew past the cap, for
    /// instance one loaded from an oversized snapshot. Under the cap
    /// nothing happens and nothing is written.
    pub fn clear_old_lists(&mut self) -> Result<(), StoreError> {
        if self.lists.len() <= MAX_LEAD_LISTS {
            return Ok(());
        }
        self.lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.lists.truncate(MAX_LEAD_LISTS);
        self.persist()
    }

    pub fn lists(&self) -> &[LeadList] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Write the snapshot, degrading on quota pressure.
    ///
    /// The first failure must be a quota rejection to start the ladder;
    /// anything else propagates untouched. Once the ladder is running,
    /// any retry failure moves to the 5-list fallback, whose own error
    /// is the caller's problem.
    fn persist(&self) -> Result<(), StoreError> {
        match self.write_snapshot(&self.lists) {
            Ok(()) => Ok(()),
            Err(StoreError::Medium(MediumError::QuotaExceeded { .. })) => {
                warn!(
                    "lead snapshot of {} lists over quota, retrying with the newest {}",
                    self.lists.len(),
                    MAX_LEAD_LISTS
                );
                let trimmed = newest_lists(&self.lists, MAX_LEAD_LISTS);
                match self.write_snapshot(&trimmed) {
                    Ok(()) => Ok(()),
                    Err(retry_err) => {
                        warn!(
                            "capped lead snapshot still failed ({}), falling back to the newest {}",
                            retry_err, FALLBACK_LISTS
                        );
                        let fallback = newest_lists(&self.lists, FALLBACK_LISTS);
                        self.write_snapshot(&fallback)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    fn write_snapshot(&self, lists: &[LeadList]) -> Result<(), StoreError> {
        let json = serde_json::to_vec(lists).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let compressed = self.compression.compress(&json);
        self.medium
            .put(LEAD_STORAGE_KEY, &compressed)
            .map_err(StoreError::Medium)
    }
}

/// The `keep` most recently updated lists, newest first
fn newest_lists(lists: &[LeadList], keep: usize) -> Vec<LeadList> {
    let mut snapshot = lists.to_vec();
    snapshot.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    snapshot.truncate(keep);
    snapshot
}

fn load_snapshot(medium: &dyn StorageMedium, compression: &dyn Compression) -> Vec<LeadList> {
    let bytes = match medium.get(LEAD_STORAGE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("failed to read lead storage, starting empty: {}", e);
            return Vec::new();
        }
    };

    let json = match compression.decompress(&bytes) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to decompress lead storage, starting empty: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_slice(&json) {
        Ok(lists) => lists,
        Err(e) => {
            warn!("failed to parse lead storage, starting empty: {}", e);
            Vec::new()
        }
    }
}
