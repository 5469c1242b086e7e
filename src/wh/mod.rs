//! Game-rule objects ("Wh" entities) and the envelope they are stored in.

mod character;
mod common;
mod generation;
mod item;
mod mutation;
mod property;
mod spell;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::claims::Claims;
use crate::id::WhId;
use crate::ownership::{self, Owner};

pub use character::{DEFAULT_SPECIES, SPECIES, STATUS_TIERS, WhCharacter};
pub use common::{Attributes, IdNumber, Modifiers, SOURCE_CODES, Source};
pub use generation::{CLASSES, ClassItems, GenerationProps, RandomTalent};
pub use item::{
    AMMUNITION_GROUPS, ARMOUR_GROUPS, ARMOUR_LOCATIONS, Ammunition, Armour, Container, Grimoire,
    GrimoireFull, ITEM_HANDS, ITEM_TYPES, ItemFullView, MELEE_GROUPS, MELEE_REACH, Melee,
    RANGED_GROUPS, Ranged, WhItem,
};
pub use mutation::{MUTATION_TYPES, WhMutation};
pub use property::{PROPERTY_TYPES, WhProperty};
pub use spell::WhSpell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhKind {
    Mutation,
    Spell,
    Property,
    Item,
    Character,
}

impl WhKind {
    pub const ALL: [WhKind; 5] = [
        WhKind::Mutation,
        WhKind::Spell,
        WhKind::Property,
        WhKind::Item,
        WhKind::Character,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WhKind::Mutation => "mutation",
            WhKind::Spell => "spell",
            WhKind::Property => "property",
            WhKind::Item => "item",
            WhKind::Character => "character",
        }
    }
}

impl fmt::Display for WhKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WhKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown wh kind: {s}"))
    }
}

/// Closed set of payloads. Serialized without a tag: the kind travels in the
/// URL and in the storage row, never inside the object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WhPayload {
    Mutation(WhMutation),
    Spell(WhSpell),
    Property(WhProperty),
    Item(WhItem),
    Character(WhCharacter),
}

impl WhPayload {
    pub fn from_value(kind: WhKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            WhKind::Mutation => WhPayload::Mutation(serde_json::from_value(value)?),
            WhKind::Spell => WhPayload::Spell(serde_json::from_value(value)?),
            WhKind::Property => WhPayload::Property(serde_json::from_value(value)?),
            WhKind::Item => WhPayload::Item(serde_json::from_value(value)?),
            WhKind::Character => WhPayload::Character(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> WhKind {
        match self {
            WhPayload::Mutation(_) => WhKind::Mutation,
            WhPayload::Spell(_) => WhKind::Spell,
            WhPayload::Property(_) => WhKind::Property,
            WhPayload::Item(_) => WhKind::Item,
            WhPayload::Character(_) => WhKind::Character,
        }
    }

    pub fn shared(&self) -> bool {
        match self {
            WhPayload::Mutation(m) => m.shared,
            WhPayload::Spell(s) => s.shared,
            WhPayload::Property(p) => p.shared,
            WhPayload::Item(i) => i.shared,
            WhPayload::Character(c) => c.shared,
        }
    }
}

/// Stored envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Wh {
    pub id: WhId,
    pub owner: Owner,
    pub payload: WhPayload,
}

impl Wh {
    pub fn kind(&self) -> WhKind {
        self.payload.kind()
    }

    pub fn shared(&self) -> bool {
        self.payload.shared()
    }
}

/// Envelope as returned to a caller, with `canEdit` computed for that caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhView {
    pub id: WhId,
    pub owner_id: Owner,
    pub can_edit: bool,
    #[serde(flatten)]
    pub object: WhPayload,
}

impl WhView {
    pub fn for_claims(wh: Wh, claims: &Claims) -> Self {
        let can_edit = ownership::can_edit(claims, &wh.owner);
        Self {
            id: wh.id,
            owner_id: wh.owner,
            can_edit,
            object: wh.payload,
        }
    }
}
