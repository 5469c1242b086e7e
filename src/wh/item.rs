use serde::{Deserialize, Serialize};

use super::WhView;
use super::common::Source;
use crate::id::WhId;
use crate::ownership::Owner;

pub const ITEM_TYPES: &[i32] = &[0, 1, 2, 3, 4, 5, 6];
pub const ITEM_HANDS: &[i32] = &[1, 2];
pub const MELEE_REACH: &[i32] = &[0, 1, 2, 3, 4, 5, 6];
pub const MELEE_GROUPS: &[i32] = &[0, 1, 2, 3, 4, 5, 6, 7];
pub const RANGED_GROUPS: &[i32] = &[0, 1, 2, 3, 4, 5, 6, 7];
pub const AMMUNITION_GROUPS: &[i32] = &[0, 1, 2, 3, 4];
pub const ARMOUR_GROUPS: &[i32] = &[0, 1, 2, 3, 4];
pub const ARMOUR_LOCATIONS: &[i32] = &[0, 1, 2, 3];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Melee {
    pub hands: i32,
    pub dmg: i32,
    pub dmg_sb_mult: f64,
    pub reach: i32,
    pub group: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ranged {
    pub hands: i32,
    pub dmg: i32,
    pub dmg_sb_mult: f64,
    pub rng: i32,
    pub rng_sb_mult: f64,
    pub group: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ammunition {
    pub dmg: i32,
    pub rng: i32,
    pub rng_mult: f64,
    pub group: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Armour {
    pub points: i32,
    pub location: Vec<i32>,
    pub group: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Container {
    pub capacity: i32,
    pub wearable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grimoire {
    pub spells: Vec<WhId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub enc: f64,
    pub properties: Vec<WhId>,
    #[serde(rename = "type")]
    pub item_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melee: Option<Melee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranged: Option<Ranged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ammunition: Option<Ammunition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armour: Option<Armour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grimoire: Option<Grimoire>,
    pub shared: bool,
    pub source: Source,
}

impl WhItem {
    pub fn spell_ids(&self) -> &[WhId] {
        self.grimoire
            .as_ref()
            .map(|g| g.spells.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GrimoireFull {
    pub spells: Vec<WhView>,
}

/// Item with its property and spell references replaced by the objects the
/// caller is allowed to see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFullView {
    pub id: WhId,
    pub owner_id: Owner,
    pub can_edit: bool,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub enc: f64,
    pub properties: Vec<WhView>,
    #[serde(rename = "type")]
    pub item_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melee: Option<Melee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranged: Option<Ranged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ammunition: Option<Ammunition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armour: Option<Armour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grimoire: Option<GrimoireFull>,
    pub shared: bool,
    pub source: Source,
}

impl ItemFullView {
    /// `properties` and `spells` must already be visibility-filtered.
    pub fn assemble(
        id: WhId,
        owner_id: Owner,
        can_edit: bool,
        item: WhItem,
        properties: Vec<WhView>,
        spells: Vec<WhView>,
    ) -> Self {
        let grimoire = item.grimoire.map(|_| GrimoireFull { spells });
        Self {
            id,
            owner_id,
            can_edit,
            name: item.name,
            description: item.description,
            price: item.price,
            enc: item.enc,
            properties,
            item_type: item.item_type,
            melee: item.melee,
            ranged: item.ranged,
            ammunition: item.ammunition,
            armour: item.armour,
            container: item.container,
            grimoire,
            shared: item.shared,
            source: item.source,
        }
    }
}
