//! Placeable descriptors: the one item/fluid type every layout pass consumes.
//!
//! Upstream recipe data describes stacks in several shapes (`item` as a string or a
//! nested `{ id }`, a bare `id`, `fluid` + `amount`). They are normalized into
//! [`Placeable`] once, during deserialization, and never re-shaped downstream.
#![allow(dead_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceableKind {
    Item,
    Fluid,
}

/// An item or fluid to be shown in a panel slot.
///
/// `count` is the stack size for items and the amount for fluids.
/// `chance` is in `(0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct Placeable {
    pub kind: PlaceableKind,
    pub identifier: String,
    pub count: u32,
    pub chance: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    #[error("descriptor names no item, fluid, or identifier")]
    MissingIdentifier,

    #[error("descriptor identifier is empty")]
    EmptyIdentifier,

    #[error("descriptor names both an item and a fluid")]
    AmbiguousKind,

    #[error("descriptor kind {declared:?} contradicts its {implied:?} key")]
    ConflictingKind {
        declared: PlaceableKind,
        implied: PlaceableKind,
    },

    #[error("descriptor count must be positive")]
    ZeroCount,

    #[error("descriptor chance {0} is outside (0, 1]")]
    InvalidChance(f32),

    #[error("malformed descriptor: {0}")]
    Malformed(String),
}

impl Placeable {
    pub fn item(identifier: impl Into<String>, count: u32) -> Self {
        Placeable {
            kind: PlaceableKind::Item,
            identifier: identifier.into(),
            count,
            chance: 1.0,
        }
    }

    pub fn fluid(identifier: impl Into<String>, amount: u32) -> Self {
        Placeable {
            kind: PlaceableKind::Fluid,
            identifier: identifier.into(),
            count: amount,
            chance: 1.0,
        }
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance;
        self
    }

    /// Normalizes one loosely shaped JSON descriptor.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DescriptorError> {
        let raw: RawDescriptor =
            serde_json::from_value(value).map_err(|e| DescriptorError::Malformed(e.to_string()))?;
        Placeable::try_from(raw)
    }
}

/// Renders as `"{count}x {identifier}"`, the stack string the machine recipe API takes.
impl fmt::Display for Placeable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.count, self.identifier)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Boundary shape
// ────────────────────────────────────────────────────────────────────────────

/// Every field any accepted descriptor shape may carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDescriptor {
    kind: Option<PlaceableKind>,
    identifier: Option<String>,
    item: Option<ItemRef>,
    id: Option<String>,
    fluid: Option<String>,
    count: Option<u32>,
    amount: Option<u32>,
    chance: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ItemRef {
    Id(String),
    Nested { id: String },
}

impl ItemRef {
    fn into_id(self) -> String {
        match self {
            ItemRef::Id(id) | ItemRef::Nested { id } => id,
        }
    }
}

impl TryFrom<RawDescriptor> for Placeable {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        // `item` takes precedence over a sibling `id`.
        let item = raw.item.map(ItemRef::into_id).or(raw.id);

        let (implied, identifier) = match (raw.identifier, item, raw.fluid) {
            (Some(identifier), None, None) => (None, identifier),
            (None, Some(item), None) => (Some(PlaceableKind::Item), item),
            (None, None, Some(fluid)) => (Some(PlaceableKind::Fluid), fluid),
            (None, None, None) => return Err(DescriptorError::MissingIdentifier),
            _ => return Err(DescriptorError::AmbiguousKind),
        };

        let kind = match (raw.kind, implied) {
            (Some(declared), Some(implied)) if declared != implied => {
                return Err(DescriptorError::ConflictingKind { declared, implied })
            }
            (Some(kind), _) | (None, Some(kind)) => kind,
            (None, None) => PlaceableKind::Item,
        };

        let identifier = identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(DescriptorError::EmptyIdentifier);
        }

        let count = raw.count.or(raw.amount).unwrap_or(1);
        if count == 0 {
            return Err(DescriptorError::ZeroCount);
        }

        let chance = raw.chance.unwrap_or(1.0);
        if !(chance > 0.0 && chance <= 1.0) {
            return Err(DescriptorError::InvalidChance(chance));
        }

        Ok(Placeable {
            kind,
            identifier,
            count,
            chance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_string_defaults_count_and_chance() {
        let p = Placeable::from_value(json!({ "item": "minecraft:iron_ingot" })).unwrap();
        assert_eq!(p, Placeable::item("minecraft:iron_ingot", 1));
        assert_eq!(p.chance, 1.0);
    }

    #[test]
    fn test_nested_item_id() {
        let p = Placeable::from_value(json!({
            "item": { "id": "create:crushed_raw_iron" },
            "count": 2,
            "chance": 0.75
        }))
        .unwrap();
        assert_eq!(p.kind, PlaceableKind::Item);
        assert_eq!(p.identifier, "create:crushed_raw_iron");
        assert_eq!(p.count, 2);
        assert!((p.chance - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_bare_id_is_item() {
        let p = Placeable::from_value(json!({ "id": "create:experience_nugget", "count": 3 }))
            .unwrap();
        assert_eq!(p, Placeable::item("create:experience_nugget", 3));
    }

    #[test]
    fn test_item_wins_over_id() {
        let p = Placeable::from_value(json!({ "item": "a:first", "id": "b:second" })).unwrap();
        assert_eq!(p.identifier, "a:first");
    }

    #[test]
    fn test_fluid_amount() {
        let p = Placeable::from_value(json!({ "fluid": "minecraft:lava", "amount": 250 })).unwrap();
        assert_eq!(p, Placeable::fluid("minecraft:lava", 250));
    }

    #[test]
    fn test_canonical_shape_roundtrips() {
        let original = Placeable::fluid("mekanism:hydrogen", 10).with_chance(0.5);
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(value["kind"], "fluid");
        let parsed: Placeable = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_missing_identifier() {
        let err = Placeable::from_value(json!({ "count": 2 })).unwrap_err();
        assert_eq!(err, DescriptorError::MissingIdentifier);
    }

    #[test]
    fn test_item_and_fluid_is_ambiguous() {
        let err = Placeable::from_value(json!({ "item": "a:b", "fluid": "c:d" })).unwrap_err();
        assert_eq!(err, DescriptorError::AmbiguousKind);
    }

    #[test]
    fn test_declared_kind_must_match_key() {
        let err = Placeable::from_value(json!({ "kind": "item", "fluid": "minecraft:water" }))
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::ConflictingKind {
                declared: PlaceableKind::Item,
                implied: PlaceableKind::Fluid
            }
        );
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = Placeable::from_value(json!({ "item": "a:b", "count": 0 })).unwrap_err();
        assert_eq!(err, DescriptorError::ZeroCount);
    }

    #[test]
    fn test_chance_out_of_range_rejected() {
        for chance in [0.0, -0.5, 1.5] {
            let err =
                Placeable::from_value(json!({ "item": "a:b", "chance": chance })).unwrap_err();
            assert!(matches!(err, DescriptorError::InvalidChance(_)), "chance {chance}");
        }
    }

    #[test]
    fn test_blank_identifier_rejected() {
        let err = Placeable::from_value(json!({ "item": "   " })).unwrap_err();
        assert_eq!(err, DescriptorError::EmptyIdentifier);
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        let err = Placeable::from_value(json!({ "item": "a:b", "count": "two" })).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[test]
    fn test_display_matches_stack_string() {
        assert_eq!(
            Placeable::item("minecraft:gravel", 4).to_string(),
            "4x minecraft:gravel"
        );
    }
}
