use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::WhId;

/// Source book code ("0" custom, "1" core rulebook, ...) to page reference.
pub type Source = BTreeMap<String, String>;

pub const SOURCE_CODES: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(rename = "WS")]
    pub ws: i32,
    #[serde(rename = "BS")]
    pub bs: i32,
    #[serde(rename = "S")]
    pub s: i32,
    #[serde(rename = "T")]
    pub t: i32,
    #[serde(rename = "I")]
    pub i: i32,
    #[serde(rename = "Ag")]
    pub ag: i32,
    #[serde(rename = "Dex")]
    pub dex: i32,
    #[serde(rename = "Int")]
    pub int: i32,
    #[serde(rename = "WP")]
    pub wp: i32,
    #[serde(rename = "Fel")]
    pub fel: i32,
}

impl Attributes {
    pub fn values(&self) -> [i32; 10] {
        [
            self.ws, self.bs, self.s, self.t, self.i, self.ag, self.dex, self.int, self.wp, self.fel,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub size: i32,
    pub movement: i32,
    pub attributes: Attributes,
}

/// Reference to another object together with a count (items carried, skill advances).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdNumber {
    pub id: WhId,
    pub number: i32,
}
