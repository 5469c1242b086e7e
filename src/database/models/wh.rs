use sqlx::FromRow;
use sqlx::types::Json;

use crate::database::StoreError;
use crate::ownership::Owner;
use crate::wh::{Wh, WhKind, WhPayload};

#[derive(Debug, FromRow)]
pub struct WhRow {
    pub id: String,
    pub kind: String,
    pub owner_id: String,
    pub payload: Json<serde_json::Value>,
}

impl TryFrom<WhRow> for Wh {
    type Error = StoreError;

    fn try_from(row: WhRow) -> Result<Self, Self::Error> {
        let kind: WhKind = row.kind.parse().map_err(StoreError::Internal)?;
        let payload = WhPayload::from_value(kind, row.payload.0)
            .map_err(|e| StoreError::Internal(format!("corrupt {kind} {}: {e}", row.id)))?;
        Ok(Wh {
            id: row.id.into(),
            owner: Owner::from(row.owner_id),
            payload,
        })
    }
}
