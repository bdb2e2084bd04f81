//! User domain model

use serde::{Deserialize, Serialize};

/// Profile of the authenticated user
///
/// This is the shape mirrored into durable storage under the `user` key,
/// so a restart can show who is logged in without calling the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub nombre: String,
}

impl UserProfile {
    pub fn new(id: i64, email: impl Into<String>, nombre: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            nombre: nombre.into(),
        }
    }

    /// Display name, falling back to the email when the backend sent none
    pub fn display_name(&self) -> &str {
        if self.nombre.trim().is_empty() {
            &self.email
        } else {
            &self.nombre
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = UserProfile::new(7, "a@b.com", "Ana");
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.display_name(), "Ana");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = UserProfile::new(7, "a@b.com", "");
        assert_eq!(user.display_name(), "a@b.com");
    }

    #[test]
    fn test_storage_shape() {
        let user = UserProfile::new(7, "a@b.com", "Ana");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "email": "a@b.com", "nombre": "Ana" })
        );
    }
}
