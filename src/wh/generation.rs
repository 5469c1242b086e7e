use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::IdNumber;
use crate::id::WhId;

/// Career class codes: academics, burghers, courtiers, peasants, rangers,
/// riverfolk, rogues, warriors.
pub const CLASSES: &[&str] = &["0", "1", "2", "3", "4", "5", "6", "7"];

/// Starting equipment handed out with a career class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassItems {
    pub equipped: Vec<IdNumber>,
    pub carried: Vec<IdNumber>,
}

/// One row of the random talent table, rolled on a d100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomTalent {
    pub id: WhId,
    pub min_roll: i32,
    pub max_roll: i32,
}

/// Tables the character generator rolls against. A single document, read by
/// everyone and written only when seeding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationProps {
    pub name: String,
    pub class_items: BTreeMap<String, ClassItems>,
    pub random_talents: Vec<RandomTalent>,
    /// Species code to talent groups; a group with several ids means "pick one".
    pub species_talents: BTreeMap<String, Vec<Vec<WhId>>>,
    pub species_skills: BTreeMap<String, Vec<WhId>>,
}
