//! Authentication payloads and the credential pair

use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Access token plus refresh token
///
/// Serializes as the body of `POST /Auth/refresh-token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Response of login, register and refresh-token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nombre: String,
}

impl AuthResponse {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair::new(self.token.clone(), self.refresh_token.clone())
    }

    pub fn user(&self) -> UserProfile {
        UserProfile::new(self.user_id, self.email.clone(), self.nombre.clone())
    }
}

/// Body of `POST /Auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /Auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /Auth/change-password`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
