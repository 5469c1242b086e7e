use axum::{extract::State, response::IntoResponse};

use super::model::{TokenRequest, TokenResponse};
use crate::{AppState, error::AppError, routes::AppForm, utils::success_to_api_response};

/// Password login. Returns a bearer token carrying the user's claims.
#[axum::debug_handler]
pub async fn token(
    State(state): State<AppState>,
    AppForm(req): AppForm<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let authenticated = state.users.authenticate(&req.username, &req.password).await?;
    let issued = state
        .users
        .credentials()
        .issue_access(&authenticated.claims)?;

    tracing::info!(user_id = %authenticated.user.id, "token issued");
    Ok(success_to_api_response(TokenResponse {
        access_token: issued.token,
        token_type: "bearer",
        expires_at: issued.expires_at.timestamp(),
    }))
}
