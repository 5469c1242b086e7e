use serde::{Deserialize, Serialize};

use super::common::Source;

pub const PROPERTY_TYPES: &[i32] = &[0, 1];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhProperty {
    pub name: String,
    pub description: String,
    /// 0 quality, 1 flaw.
    #[serde(rename = "type")]
    pub property_type: i32,
    /// Item types this property can be attached to.
    pub applicable_to: Vec<i32>,
    pub shared: bool,
    pub source: Source,
}
