use serde::{Deserialize, Serialize};

use super::common::{Attributes, IdNumber};
use crate::id::WhId;

/// Species and regional variant codes: two digits of species, two of variant.
pub const SPECIES: &[&str] = &[
    "0000", "0001", "0002", "0003", "0004", "0005", "0006", "0007", "0008", "0009", "0010",
    "0011", "0012", "0013", // human
    "0100", "0101", "0102", "0103", "0104", "0105", "0106", "0107", "0108", "0109", "0110",
    "0111", "0112", // halfling
    "0200", "0201", "0202", "0203", "0204", // dwarf
    "0300", // high elf
    "0400", // wood elf
    "0500", // gnome
    "0600", // ogre
];

pub const DEFAULT_SPECIES: &str = "0000";

/// Brass, silver, gold.
pub const STATUS_TIERS: &[i32] = &[0, 1, 2];

fn default_species() -> String {
    DEFAULT_SPECIES.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhCharacter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub equipped_items: Vec<IdNumber>,
    #[serde(default)]
    pub carried_items: Vec<IdNumber>,
    #[serde(default)]
    pub stored_items: Vec<IdNumber>,
    #[serde(default)]
    pub skills: Vec<IdNumber>,
    #[serde(default)]
    pub talents: Vec<IdNumber>,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default)]
    pub base_attributes: Attributes,
    #[serde(default)]
    pub attribute_advances: Attributes,
    #[serde(default)]
    pub career_path: Vec<WhId>,
    #[serde(default)]
    pub career: Option<WhId>,
    #[serde(default)]
    pub fate: i32,
    #[serde(default)]
    pub fortune: i32,
    #[serde(default)]
    pub resilience: i32,
    #[serde(default)]
    pub resolve: i32,
    #[serde(default)]
    pub current_exp: i32,
    #[serde(default)]
    pub spent_exp: i32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub standing: i32,
    #[serde(default)]
    pub brass: i32,
    #[serde(default)]
    pub silver: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub spells: Vec<WhId>,
    #[serde(default)]
    pub sin: i32,
    #[serde(default)]
    pub corruption: i32,
    #[serde(default)]
    pub mutations: Vec<WhId>,
    #[serde(default)]
    pub shared: bool,
}

impl Default for WhCharacter {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            notes: String::new(),
            equipped_items: Vec::new(),
            carried_items: Vec::new(),
            stored_items: Vec::new(),
            skills: Vec::new(),
            talents: Vec::new(),
            species: default_species(),
            base_attributes: Attributes::default(),
            attribute_advances: Attributes::default(),
            career_path: Vec::new(),
            career: None,
            fate: 0,
            fortune: 0,
            resilience: 0,
            resolve: 0,
            current_exp: 0,
            spent_exp: 0,
            status: 0,
            standing: 0,
            brass: 0,
            silver: 0,
            gold: 0,
            spells: Vec::new(),
            sin: 0,
            corruption: 0,
            mutations: Vec::new(),
            shared: false,
        }
    }
}
