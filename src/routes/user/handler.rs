use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
};

use super::model::{
    CreateUserRequest, ExistsResponse, ResetPasswordRequest, SendResetPasswordRequest,
    UpdateClaimsRequest, UpdateCredentialsRequest, UpdateUserRequest,
};
use crate::{
    AppState,
    claims::Claims,
    error::{AppError, ServiceError},
    id::UserId,
    routes::{AppJson, RemoteAddr},
    services::{ClaimsUpdate, Credentials, Profile},
    utils::success_to_api_response,
};

async fn check_captcha(state: &AppState, token: &str, remote_addr: &str) -> Result<(), AppError> {
    let passed = state
        .captcha
        .verify(token, remote_addr)
        .await
        .map_err(ServiceError::internal)?;
    if !passed {
        return Err(ServiceError::invalid("captcha verification failed").into());
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    RemoteAddr(remote_addr): RemoteAddr,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_captcha(&state, &req.captcha, &remote_addr).await?;
    let user = state
        .users
        .create(
            Credentials {
                username: req.username,
                password: req.password,
            },
            Profile {
                shared_accounts: req.shared_accounts,
            },
        )
        .await?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let id = claims.require_user()?.clone();
    Ok(success_to_api_response(state.users.get(&claims, &id).await?))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_to_api_response(state.users.get(&claims, &id).await?))
}

#[axum::debug_handler]
pub async fn user_exists(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exists = state.users.exists(&username).await?;
    Ok(success_to_api_response(ExistsResponse { exists }))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_to_api_response(state.users.list(&claims).await?))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = Profile {
        shared_accounts: req.shared_accounts,
    };
    Ok(success_to_api_response(
        state.users.update(&claims, &id, profile).await?,
    ))
}

#[axum::debug_handler]
pub async fn update_credentials(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
    AppJson(req): AppJson<UpdateCredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = Credentials {
        username: req.username,
        password: req.password,
    };
    let user = state
        .users
        .update_credentials(&claims, &id, &req.current_password, new)
        .await?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn update_claims(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
    AppJson(req): AppJson<UpdateClaimsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = ClaimsUpdate { admin: req.admin };
    Ok(success_to_api_response(
        state.users.update_claims(&claims, &id, update).await?,
    ))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    state.users.delete(&claims, &id).await?;
    Ok(success_to_api_response(()))
}

#[axum::debug_handler]
pub async fn send_reset_password(
    State(state): State<AppState>,
    RemoteAddr(remote_addr): RemoteAddr,
    AppJson(req): AppJson<SendResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_captcha(&state, &req.captcha, &remote_addr).await?;
    state.users.send_reset_password(&req.username).await?;
    Ok(success_to_api_response(()))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .users
        .reset_password(&req.token, &req.password)
        .await?;
    Ok(success_to_api_response(()))
}
