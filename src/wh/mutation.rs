use serde::{Deserialize, Serialize};

use super::common::{Modifiers, Source};

pub const MUTATION_TYPES: &[i32] = &[0, 1];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhMutation {
    pub name: String,
    pub description: String,
    /// 0 physical, 1 mental.
    #[serde(rename = "type")]
    pub mutation_type: i32,
    pub modifiers: Modifiers,
    pub shared: bool,
    pub source: Source,
}
