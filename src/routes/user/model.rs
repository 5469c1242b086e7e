use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub shared_accounts: Vec<String>,
    #[serde(default)]
    pub captcha: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub shared_accounts: Vec<String>,
}

/// Empty `username` or `password` keeps the stored value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub current_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClaimsRequest {
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendResetPasswordRequest {
    pub username: String,
    #[serde(default)]
    pub captcha: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}
