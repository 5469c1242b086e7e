use serde::Deserialize;

use crate::error::{AppError, ServiceError};
use crate::wh::{WhKind, WhPayload};

#[derive(Debug, Default, Deserialize)]
pub struct FullQuery {
    #[serde(default)]
    pub full: bool,
}

/// Unknown kinds are reported as missing resources.
pub fn parse_kind(kind: &str) -> Result<WhKind, AppError> {
    kind.parse().map_err(|_| ServiceError::NotFound.into())
}

pub fn parse_payload(kind: WhKind, body: serde_json::Value) -> Result<WhPayload, AppError> {
    WhPayload::from_value(kind, body)
        .map_err(|e| ServiceError::invalid(format!("malformed {kind}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_kind_is_not_found() {
        assert!(matches!(parse_kind("spell"), Ok(WhKind::Spell)));
        assert!(matches!(
            parse_kind("dragon"),
            Err(AppError::Service(ServiceError::NotFound))
        ));
    }

    #[test]
    fn malformed_body_is_invalid_arguments() {
        let err = parse_payload(WhKind::Spell, json!({ "name": 7 })).unwrap_err();
        assert!(matches!(
            err,
            AppError::Service(ServiceError::InvalidArguments(_))
        ));
    }
}
