//! Wire and domain types for the member portal API.
//!
//! The backend speaks `snake_case` JSON; the domain types used by the rest of
//! the workspace (and persisted as session snapshots) are serialized in
//! `camelCase`. The client owns the translation in both directions, so wire
//! DTOs stay private to this crate wherever possible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Response envelope
// =============================================================================

/// Response envelope returned by every backend operation.
///
/// `{"status": "success", "data": ..., "message"?}` or
/// `{"status": "error", "message", "errors"?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success {
        data: T,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        errors: Option<ErrorFlags>,
    },
}

impl<T> ApiResponse<T> {
    /// Synthesize an error envelope for a failure that never produced one
    /// (network error, unparseable body).
    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// The envelope message, success or error.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiResponse::Success { message, .. } | ApiResponse::Error { message, .. } => {
                message.as_deref()
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success { data, message } => ApiResponse::Success {
                data: f(data),
                message,
            },
            ApiResponse::Error { message, errors } => ApiResponse::Error { message, errors },
        }
    }
}

/// Structured exception flags the backend attaches to error envelopes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorFlags {
    pub unauthorized: bool,
    pub bad_request: bool,
    pub data_not_found: bool,
    pub internal_server_error: bool,
    pub data_duplicate: bool,
    pub query_error: bool,
    pub invalid_password_length: bool,
}

// =============================================================================
// Domain types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// The one admin predicate. Role checks go through here, never through
    /// string comparison at call sites.
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// The authenticated account. Persisted as a camelCase JSON snapshot next to
/// the bearer token; owned exclusively by the session manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub uuid: String,
    pub email: String,
    pub is_email_verified: bool,
    pub is_detail_completed: bool,
    pub full_name: String,
    pub phone_number: String,
    pub gender: Gender,
    pub birth_date: String,
    pub university: String,
    pub address: String,
    pub birth_place: String,
    pub initial_name: String,
    pub role: UserRole,
    pub registration_date: DateTime<Utc>,
}

/// A registration record in the member directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub birth_date: String,
    pub address: String,
    pub registration_date: DateTime<Utc>,
}

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `PUT /user/me` body.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub initial_name: String,
    pub full_name: String,
    pub university: String,
    pub phone_number: String,
}

/// `POST /members` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub birth_date: String,
    pub address: String,
}

// =============================================================================
// Response payloads
// =============================================================================

/// Account fields as returned by `/auth/*` and `/user/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    pub uuid: String,
    pub email: String,
    pub is_email_verified: bool,
    pub is_detail_completed: bool,
}

/// `POST /auth/login` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub account: Account,
    pub token: String,
}

/// Profile detail fields. The backend omits fields that have not been filled
/// in yet, so everything is optional here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub initial_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// `GET /user/me` (and `PUT /user/me`) success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserData {
    pub account: Account,
    pub details: ProfileDetails,
}

/// Member record as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MemberWire {
    #[serde(deserialize_with = "string_from_any")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub birth_date: String,
    pub address: String,
    pub registration_date: DateTime<Utc>,
}

impl From<MemberWire> for Member {
    fn from(wire: MemberWire) -> Self {
        Member {
            id: wire.id,
            full_name: wire.full_name,
            email: wire.email,
            phone_number: wire.phone_number,
            gender: wire.gender,
            birth_date: wire.birth_date,
            address: wire.address,
            registration_date: wire.registration_date,
        }
    }
}

/// The backend is inconsistent about numeric ids (`/members` returns strings,
/// account ids come back as numbers). Accept both as strings.
fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_success_and_error() {
        let ok: ApiResponse<Vec<String>> =
            serde_json::from_str(r#"{"status":"success","data":["a"],"message":"ok"}"#)
                .expect("success envelope");
        assert!(ok.is_success());
        assert_eq!(ok.message(), Some("ok"));

        let err: ApiResponse<Vec<String>> = serde_json::from_str(
            r#"{"status":"error","message":"Email sudah terdaftar","errors":{"data_duplicate":true}}"#,
        )
        .expect("error envelope");
        assert!(!err.is_success());
        assert_eq!(err.message(), Some("Email sudah terdaftar"));
        match err {
            ApiResponse::Error { errors, .. } => {
                let flags = errors.expect("errors bag");
                assert!(flags.data_duplicate);
                assert!(!flags.unauthorized);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn delete_envelope_accepts_null_data() {
        let ok: ApiResponse<()> =
            serde_json::from_str(r#"{"status":"success","data":null}"#).expect("null data");
        assert!(ok.is_success());
    }

    #[test]
    fn member_wire_translates_to_camel_case_snapshot() {
        let wire: MemberWire = serde_json::from_str(
            r#"{
                "id": 7,
                "full_name": "Budi Santoso",
                "email": "budi@example.com",
                "phone_number": "081234567890",
                "gender": "male",
                "birth_date": "1999-04-01",
                "address": "Jl. Sudirman 1",
                "registration_date": "2024-05-01T08:00:00Z"
            }"#,
        )
        .expect("wire member");
        let member = Member::from(wire);
        assert_eq!(member.id, "7");

        let snapshot = serde_json::to_value(&member).expect("snapshot");
        assert!(snapshot.get("fullName").is_some());
        assert!(snapshot.get("full_name").is_none());
    }

    #[test]
    fn role_serializes_uppercase_and_gates_admin() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
        assert!(!UserRole::default().is_admin());
    }
}
