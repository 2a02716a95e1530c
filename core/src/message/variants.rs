// Weight distribution over message variants
//
// Every structural change hands each variant an even floor share of the
// full weight. Floor division can leave the total below 100; that drift
// is part of the contract and is never corrected here.

use rand::Rng;
use thiserror::Error;

use crate::message::types::{ActionKind, MessageVariant, SequenceMessage};

/// The weight a message's variants share at every mutation boundary
pub const FULL_WEIGHT: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("weights must total 100 before adding")]
    UnbalancedAdd,
    #[error("weights must total 100 before duplicating")]
    UnbalancedDuplicate,
    #[error("total weight exceeds 100")]
    WeightOverflow,
}

/// Partial edit of a single variant
#[derive(Debug, Clone, Default)]
pub struct VariantUpdate {
    pub content: Option<String>,
    pub weight: Option<u32>,
}

impl VariantUpdate {
    pub fn content(text: &str) -> Self {
        Self {
            content: Some(text.to_string()),
            weight: None,
        }
    }

    pub fn weight(weight: u32) -> Self {
        Self {
            content: None,
            weight: Some(weight),
        }
    }
}

/// Live sum of the collection's weights
pub fn total_weight(variants: &[MessageVariant]) -> u32 {
    variants.iter().fold(0, |acc, v| acc.saturating_add(v.weight))
}

/// Whether the weights currently sum to exactly [`FULL_WEIGHT`]
pub fn weights_balanced(variants: &[MessageVariant]) -> bool {
    total_weight(variants) == FULL_WEIGHT
}

/// Append a fresh empty variant, handing every slot an even floor share.
///
/// Rejected while the live sum is off 100, which keeps a drifted
/// collection (99 after a third of 33s, say) from drifting further.
pub fn add_variant(variants: &[MessageVariant]) -> Result<Vec<MessageVariant>, VariantError> {
    if !weights_balanced(variants) {
        return Err(VariantError::UnbalancedAdd);
    }

    let share = FULL_WEIGHT / (variants.len() as u32 + 1);
    let mut next: Vec<MessageVariant> = variants
        .iter()
        .map(|v| MessageVariant {
            weight: share,
            ..v.clone()
        })
        .collect();
    next.push(MessageVariant::new("", share));
    Ok(next)
}

/// Apply a partial edit to the variant with `id`.
///
/// A weight-carrying edit is rejected when the proposed total would
/// exceed 100; content-only edits always pass. An unknown `id` changes
/// nothing and is not an error.
pub fn update_variant(
    variants: &[MessageVariant],
    id: &str,
    update: VariantUpdate,
) -> Result<Vec<MessageVariant>, VariantError> {
    if let Some(weight) = update.weight {
        let proposed = variants.iter().fold(0u32, |acc, v| {
            acc.saturating_add(if v.id == id { weight } else { v.weight })
        });
        if proposed > FULL_WEIGHT {
            return Err(VariantError::WeightOverflow);
        }
    }

    Ok(variants
        .iter()
        .map(|v| {
            if v.id != id {
                return v.clone();
            }
            let mut edited = v.clone();
            if let Some(ref content) = update.content {
                edited.content = content.clone();
            }
            if let Some(weight) = update.weight {
                edited.weight = weight;
            }
            edited
        })
        .collect())
}

/// Drop the variant with `id` and hand every survivor an even floor
/// share.
///
/// A message always keeps at least one variant: with a single element
/// the collection comes back unchanged. The reweighting runs whether or
/// not `id` matched, so a miss still flattens drifted weights.
pub fn remove_variant(variants: &[MessageVariant], id: &str) -> Vec<MessageVariant> {
    if variants.len() <= 1 {
        return variants.to_vec();
    }

    let survivors: Vec<MessageVariant> = variants.iter().filter(|v| v.id != id).cloned().collect();
    if survivors.is_empty() {
        return variants.to_vec();
    }

    let share = FULL_WEIGHT / survivors.len() as u32;
    survivors
        .into_iter()
        .map(|v| MessageVariant { weight: share, ..v })
        .collect()
}

/// Append a copy of `source`'s content under a fresh id, rebalancing
/// exactly like [`add_variant`].
pub fn duplicate_variant(
    variants: &[MessageVariant],
    source: &MessageVariant,
) -> Result<Vec<MessageVariant>, VariantError> {
    if !weights_balanced(variants) {
        return Err(VariantError::UnbalancedDuplicate);
    }

    let share = FULL_WEIGHT / (variants.len() as u32 + 1);
    let mut next: Vec<MessageVariant> = variants
        .iter()
        .map(|v| MessageVariant {
            weight: share,
            ..v.clone()
        })
        .collect();
    next.push(MessageVariant::new(&source.content, share));
    Ok(next)
}

/// Weighted draw over the live weights. Zero-weight variants are never
/// picked; an empty or all-zero collection yields `None`.
pub fn choose_variant<'a, R: Rng + ?Sized>(
    variants: &'a [MessageVariant],
    rng: &mut R,
) -> Option<&'a MessageVariant> {
    let total = total_weight(variants);
    if total == 0 {
        return None;
    }

    let mut roll = rng.gen_range(0..total);
    for variant in variants {
        if roll < variant.weight {
            return Some(variant);
        }
        roll -= variant.weight;
    }
    None
}

/// Whether every message step's variants sum to exactly 100. Wait,
/// follow-up, and end steps do not participate.
pub fn sequence_ready(sequence: &[SequenceMessage]) -> bool {
    sequence
        .iter()
        .filter(|step| step.action == ActionKind::Message)
        .all(|step| weights_balanced(&step.variants))
}
