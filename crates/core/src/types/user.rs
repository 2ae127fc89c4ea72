//! User and authentication payloads.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::id::{CartId, UserId};

/// A storefront user, as embedded in the login response.
///
/// The backend strips the password before responding; there is deliberately
/// no password field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(serialize_with = "serialize_password")]
    pub password: SecretString,
}

/// Response body for `POST /users/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

fn serialize_password<S>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use secrecy::ExposeSecret;
    serializer.serialize_str(password.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serializes_password() {
        let req = LoginRequest {
            username: "alice".to_string(),
            password: SecretString::from("hunter2hunter2"),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["password"], "hunter2hunter2");
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest {
            username: "alice".to_string(),
            password: SecretString::from("hunter2hunter2"),
        };
        let debug = format!("{req:?}");
        assert!(!debug.contains("hunter2hunter2"));
    }

    #[test]
    fn test_login_response_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"id": 1, "username": "alice", "cart_id": 2}
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "jwt-token");
        assert_eq!(resp.user.username, "alice");
        assert_eq!(resp.user.cart_id, Some(CartId::new(2)));
    }
}
