use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{AppState, claims::Claims, error::AppError};

/// Attaches `Claims` to every request. No header means anonymous; a header
/// that does not hold a valid access token is rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .typed_try_get::<Authorization<Bearer>>()
        .map_err(|_| AppError::InvalidToken)?;

    let claims = match header {
        None => Claims::anonymous(),
        Some(auth) => state
            .users
            .credentials()
            .verify_access(auth.token())
            .map_err(|e| {
                tracing::debug!("rejected bearer token: {}", e);
                AppError::InvalidToken
            })?,
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
