// Campaign store
//
// Campaigns are small and few, so the snapshot is plain JSON under one
// key with no compression and no retention cap. Insertion order is kept.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::message::types::{Platform, SequenceMessage};
use crate::store::medium::StorageMedium;
use crate::store::{current_timestamp_ms, StoreError};

/// Key the campaign snapshot lives under
pub const CAMPAIGN_STORAGE_KEY: &str = "campaign-storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily send budget, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBudget {
    pub min: u32,
    pub max: u32,
}

/// When a campaign is allowed to send. Times are "HH:MM" wall clock in
/// the named timezone; no validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub timezone: String,
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub messages_per_day: Option<MessageBudget>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            days: Vec::new(),
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            messages_per_day: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub sequence: Vec<SequenceMessage>,
    pub lead_list_ids: Vec<String>,
    pub accounts: Vec<String>,
    pub schedule: Schedule,
    pub status: CampaignStatus,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Everything a new campaign carries before the store stamps it
#[derive(Debug, Clone, Default)]
pub struct CampaignDraft {
    pub name: String,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub sequence: Vec<SequenceMessage>,
    pub lead_list_ids: Vec<String>,
    pub accounts: Vec<String>,
    pub schedule: Schedule,
}

/// Partial edit of a stored campaign; `None` fields are left alone
#[derive(Debug, Clone, Default)]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sequence: Option<Vec<SequenceMessage>>,
    pub lead_list_ids: Option<Vec<String>>,
    pub accounts: Option<Vec<String>>,
    pub schedule: Option<Schedule>,
    pub status: Option<CampaignStatus>,
}

pub struct CampaignStore {
    medium: Arc<dyn StorageMedium>,
    campaigns: Vec<Campaign>,
}

impl CampaignStore {
    /// Open the store over a medium. Corrupt persisted state is logged
    /// and replaced with an empty collection, so this never fails.
    pub fn open(medium: Arc<dyn StorageMedium>) -> Self {
        let campaigns = load_snapshot(medium.as_ref());
        Self { medium, campaigns }
    }

    /// Stamp a draft with an id and timestamps and persist it. New
    /// campaigns always start as drafts.
    pub fn add_campaign(&mut self, draft: CampaignDraft) -> Result<Campaign, StoreError> {
        let now = current_timestamp_ms();
        let campaign = Campaign {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            platforms: draft.platforms,
            sequence: draft.sequence,
            lead_list_ids: draft.lead_list_ids,
            accounts: draft.accounts,
            schedule: draft.schedule,
            status: CampaignStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        self.campaigns.push(campaign.clone());
        self.persist()?;
        Ok(campaign)
    }

    /// Apply a partial edit and refresh `updated_at`. An unknown id is
    /// a no-op and issues no write.
    pub fn update_campaign(&mut self, id: &str, update: CampaignUpdate) -> Result<(), StoreError> {
        let campaign = match self.campaigns.iter_mut().find(|c| c.id == id) {
            Some(campaign) => campaign,
            None => return Ok(()),
        };

        if let Some(name) = update.name {
            campaign.name = name;
        }
        if let Some(description) = update.description {
            campaign.description = description;
        }
        if let Some(sequence) = update.sequence {
            campaign.sequence = sequence;
        }
        if let Some(lead_list_ids) = update.lead_list_ids {
            campaign.lead_list_ids = lead_list_ids;
        }
        if let Some(accounts) = update.accounts {
            campaign.accounts = accounts;
        }
        if let Some(schedule) = update.schedule {
            campaign.schedule = schedule;
        }
        if let Some(status) = update.status {
            campaign.status = status;
        }
        campaign.updated_at = current_timestamp_ms();
        self.persist()
    }

    /// Remove a campaign. An unknown id is a no-op and issues no write.
    pub fn delete_campaign(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.campaigns.len();
        self.campaigns.retain(|c| c.id != id);
        if self.campaigns.len() == before {
            return Ok(());
        }
        self.persist()
    }

    pub fn get_campaign(&self, id: &str) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| c.id == id)
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json =
            serde_json::to_vec(&self.campaigns).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.medium
            .put(CAMPAIGN_STORAGE_KEY, &json)
            .map_err(StoreError::Medium)
    }
}

fn load_snapshot(medium: &dyn StorageMedium) -> Vec<Campaign> {
    let bytes = match medium.get(CAMPAIGN_STORAGE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("failed to read campaign storage, starting empty: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(campaigns) => campaigns,
        Err(e) => {
            warn!("failed to parse campaign storage, starting empty: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::medium::MemoryMedium;

    fn open_store() -> (CampaignStore, MemoryMedium) {
        let medium = MemoryMedium::new();
        let store = CampaignStore::open(Arc::new(medium.clone()));
        (store, medium)
    }

    fn sample_draft() -> CampaignDraft {
        CampaignDraft {
            name: "spring push".to_string(),
            description: "first touch for the spring list".to_string(),
            platforms: vec![Platform::Instagram],
            sequence: vec![SequenceMessage::message(Platform::Instagram)],
            lead_list_ids: vec!["list-1".to_string()],
            accounts: vec!["@brand".to_string()],
            schedule: Schedule::default(),
        }
    }

    fn stored_blob(medium: &MemoryMedium) -> Vec<u8> {
        medium.get(CAMPAIGN_STORAGE_KEY).unwrap().unwrap()
    }

    #[test]
    fn test_add_campaign_starts_as_draft() {
        let (mut store, _medium) = open_store();

        let campaign = store.add_campaign(sample_draft()).unwrap();

        assert!(!campaign.id.is_empty());
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.created_at, campaign.updated_at);
        assert!(campaign.created_at > 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_applies_fields_and_status() {
        let (mut store, _medium) = open_store();
        let campaign = store.add_campaign(sample_draft()).unwrap();

        store.campaigns[0].created_at = 1;
        store.campaigns[0].updated_at = 1;

        store
            .update_campaign(
                &campaign.id,
                CampaignUpdate {
                    name: Some("summer push".to_string()),
                    status: Some(CampaignStatus::Active),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = store.get_campaign(&campaign.id).unwrap();
        assert_eq!(updated.name, "summer push");
        assert_eq!(updated.status, CampaignStatus::Active);
        assert_eq!(updated.description, campaign.description);
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn test_update_unknown_id_issues_no_write() {
        let (mut store, medium) = open_store();
        store.add_campaign(sample_draft()).unwrap();

        let before = stored_blob(&medium);
        store
            .update_campaign(
                "missing",
                CampaignUpdate {
                    name: Some("ignored".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(stored_blob(&medium), before);
    }

    #[test]
    fn test_delete_campaign_drops_and_persists() {
        let (mut store, medium) = open_store();
        let campaign = store.add_campaign(sample_draft()).unwrap();

        store.delete_campaign(&campaign.id).unwrap();
        assert!(store.is_empty());

        let before = stored_blob(&medium);
        store.delete_campaign("missing").unwrap();
        assert_eq!(stored_blob(&medium), before);
    }

    #[test]
    fn test_reopen_restores_campaigns() {
        let (mut store, medium) = open_store();
        let campaign = store.add_campaign(sample_draft()).unwrap();

        let reopened = CampaignStore::open(Arc::new(medium));
        assert_eq!(reopened.campaigns(), store.campaigns());
        assert_eq!(
            reopened.get_campaign(&campaign.id).unwrap().name,
            "spring push"
        );
    }

    #[test]
    fn test_open_survives_corrupt_blob() {
        let medium = MemoryMedium::new();
        medium.put(CAMPAIGN_STORAGE_KEY, b"{ not json").unwrap();

        let mut store = CampaignStore::open(Arc::new(medium));
        assert!(store.is_empty());

        store.add_campaign(sample_draft()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(CampaignStatus::Paused.to_string(), "paused");
    }

    #[test]
    fn test_schedule_default_window() {
        let schedule = Schedule::default();
        assert_eq!(schedule.timezone, "UTC");
        assert_eq!(schedule.start_time, "09:00");
        assert_eq!(schedule.end_time, "17:00");
        assert!(schedule.days.is_empty());
        assert!(schedule.messages_per_day.is_none());
    }
}
