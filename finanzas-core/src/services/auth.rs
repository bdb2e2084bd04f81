//! Auth service - `/Auth`

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::api::envelope::decode_record;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{
    AuthResponse, ChangePasswordRequest, CredentialPair, LoginRequest, RegisterRequest,
    UserProfile,
};

pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        decode_record(self.client.post("/Auth/login", credentials)?)
    }

    pub fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse> {
        decode_record(self.client.post("/Auth/register", profile)?)
    }

    /// Exchange a credential pair; never triggers the client's 401 recovery
    pub fn refresh_token(&self, pair: &CredentialPair) -> Result<AuthResponse> {
        self.client.refresh(pair)
    }

    pub fn profile(&self) -> Result<UserProfile> {
        decode_record(self.client.get("/Auth/profile")?)
    }

    pub fn change_password(&self, request: &ChangePasswordRequest) -> Result<JsonValue> {
        self.client.post("/Auth/change-password", request)
    }
}
