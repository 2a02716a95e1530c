// Message module: sequence steps and weighted content variants

pub mod types;
pub mod variants;

pub use types::{ActionKind, MessageVariant, Platform, SequenceMessage};
pub use variants::{
    add_variant, choose_variant, duplicate_variant, remove_variant, sequence_ready, total_weight,
    update_variant, weights_balanced, VariantError, VariantUpdate,
};
