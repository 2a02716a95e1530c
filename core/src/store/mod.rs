// Store module: lead list and campaign persistence

pub mod campaigns;
pub mod compress;
pub mod leads;
pub mod medium;

pub use campaigns::{
    Campaign, CampaignDraft, CampaignStatus, CampaignStore, CampaignUpdate, MessageBudget, Schedule,
};
pub use compress::{Compression, CompressionError, Lz4Compression};
pub use leads::{HandleKind, LeadList, LeadListStore, LeadListUpdate, LeadRow, PlatformMapping};
pub use medium::{MediumError, MemoryMedium, SledMedium, StorageMedium};

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Errors surfaced by the stores. Lookup misses are `Option::None`,
/// never an error; corrupt persisted state recovers to empty on load.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("storage medium error: {0}")]
    Medium(MediumError),
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Milliseconds since the Unix epoch, zero if the clock sits before it
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
