// Store state across reopens of the same sled path
//
// Each scope stands in for one process lifetime: open, mutate, drop.

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::TempDir;

use leadflow_core::{
    CampaignDraft, CampaignStatus, CampaignStore, CampaignUpdate, HandleKind, LeadListStore,
    LeadRow, Lz4Compression, Platform, PlatformMapping, SequenceMessage, SledMedium,
    StorageMedium, LEAD_STORAGE_KEY,
};

fn lead_rows() -> Vec<LeadRow> {
    let mut row = LeadRow::new();
    row.insert("handle".to_string(), "@alice".to_string());
    row.insert("name".to_string(), "Alice".to_string());
    vec![row]
}

fn instagram_mapping() -> BTreeMap<Platform, PlatformMapping> {
    let mut mappings = BTreeMap::new();
    mappings.insert(
        Platform::Instagram,
        PlatformMapping {
            column: "handle".to_string(),
            kind: HandleKind::Username,
        },
    );
    mappings
}

#[test]
fn test_lead_lists_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    // First instance: import a list
    let list_id = {
        let medium = Arc::new(SledMedium::open(&path).unwrap());
        let mut store = LeadListStore::open(medium, Arc::new(Lz4Compression));
        let list = store
            .add_list(
                "spring outreach".to_string(),
                vec!["handle".to_string(), "name".to_string()],
                lead_rows(),
                instagram_mapping(),
            )
            .unwrap();
        list.id
    };

    // Second instance: the list and its mapping survived
    let medium = Arc::new(SledMedium::open(&path).unwrap());
    let store = LeadListStore::open(medium, Arc::new(Lz4Compression));

    assert_eq!(store.len(), 1);
    assert_eq!(store.get_list(&list_id).unwrap().name, "spring outreach");
    assert_eq!(
        store.get_lead_value(&list_id, 0, Platform::Instagram),
        Some("@alice")
    );
    assert_eq!(store.get_lead_value(&list_id, 0, Platform::LinkedIn), None);
}

#[test]
fn test_campaign_status_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    let campaign_id = {
        let medium = Arc::new(SledMedium::open(&path).unwrap());
        let mut store = CampaignStore::open(medium);
        let campaign = store
            .add_campaign(CampaignDraft {
                name: "spring push".to_string(),
                platforms: vec![Platform::Instagram],
                sequence: vec![SequenceMessage::message(Platform::Instagram)],
                ..Default::default()
            })
            .unwrap();
        store
            .update_campaign(
                &campaign.id,
                CampaignUpdate {
                    status: Some(CampaignStatus::Active),
                    ..Default::default()
                },
            )
            .unwrap();
        campaign.id
    };

    let medium = Arc::new(SledMedium::open(&path).unwrap());
    let store = CampaignStore::open(medium);

    let campaign = store.get_campaign(&campaign_id).unwrap();
    assert_eq!(campaign.status, CampaignStatus::Active);
    assert_eq!(campaign.sequence.len(), 1);
}

#[test]
fn test_both_stores_share_one_medium() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    {
        let medium = Arc::new(SledMedium::open(&path).unwrap());
        let mut leads = LeadListStore::open(medium.clone(), Arc::new(Lz4Compression));
        let mut campaigns = CampaignStore::open(medium.clone());

        leads
            .add_list(
                "shared".to_string(),
                vec!["handle".to_string()],
                lead_rows(),
                instagram_mapping(),
            )
            .unwrap();
        campaigns
            .add_campaign(CampaignDraft {
                name: "shared".to_string(),
                ..Default::default()
            })
            .unwrap();
    }

    let medium = Arc::new(SledMedium::open(&path).unwrap());
    let leads = LeadListStore::open(medium.clone(), Arc::new(Lz4Compression));
    let campaigns = CampaignStore::open(medium);

    assert_eq!(leads.len(), 1);
    assert_eq!(campaigns.len(), 1);
}

#[test]
fn test_corrupt_disk_snapshot_recovers_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    {
        let medium = Arc::new(SledMedium::open(&path).unwrap());
        medium.put(LEAD_STORAGE_KEY, b"torn write").unwrap();

        let mut store = LeadListStore::open(medium, Arc::new(Lz4Compression));
        assert!(store.is_empty());

        store
            .add_list(
                "recovered".to_string(),
                vec!["handle".to_string()],
                Vec::new(),
                BTreeMap::new(),
            )
            .unwrap();
    }

    let medium = Arc::new(SledMedium::open(&path).unwrap());
    let store = LeadListStore::open(medium, Arc::new(Lz4Compression));

    assert_eq!(store.len(), 1);
    assert_eq!(store.lists()[0].name, "recovered");
}
