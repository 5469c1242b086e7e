use serde::{Deserialize, Serialize};

use super::common::Source;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhSpell {
    pub name: String,
    pub description: String,
    /// Casting number, -1 for spells that are not cast.
    pub cn: i32,
    pub range: String,
    pub target: String,
    pub duration: String,
    pub shared: bool,
    pub source: Source,
}
