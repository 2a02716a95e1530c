// Leadflow core: lead list persistence and weighted message distribution
//
// "Would a campaign still send the right message to the right handle
//  after the medium threw QuotaExceeded at us?"
//
// Everything in here exists to make the answer yes.

pub mod message;
pub mod store;

pub use message::types::{
    ActionKind, MessageVariant, Platform, SequenceMessage, DEFAULT_WAIT_HOURS,
};
pub use message::variants::{
    add_variant, choose_variant, duplicate_variant, remove_variant, sequence_ready, total_weight,
    update_variant, weights_balanced, VariantError, VariantUpdate, FULL_WEIGHT,
};
pub use store::campaigns::{
    Campaign, CampaignDraft, CampaignStatus, CampaignStore, CampaignUpdate, MessageBudget, Schedule,
    CAMPAIGN_STORAGE_KEY,
};
pub use store::compress::{Compression, CompressionError, Lz4Compression};
pub use store::leads::{
    HandleKind, LeadList, LeadListStore, LeadListUpdate, LeadRow, PlatformMapping,
    LEAD_STORAGE_KEY, MAX_LEAD_LISTS,
};
pub use store::medium::{MediumError, MemoryMedium, SledMedium, StorageMedium};
pub use store::StoreError;
