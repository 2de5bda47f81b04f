use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mvi::SliceState;
use crate::session::credentials::BearerToken;

/// Request lifecycle status, shared by the session and resource slices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Idle => "idle",
            AuthStatus::Loading => "loading",
            AuthStatus::Succeeded => "succeeded",
            AuthStatus::Failed => "failed",
        }
    }
}

/// Coarse lifecycle phase derived from the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Profile of the signed-in admin. Unknown backend fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn merge(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(role) = patch.role {
            self.role = Some(role);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        self.extra.extend(patch.extra);
    }
}

/// The authenticated actor.
///
/// `token` is set exactly when a login succeeded (or was rehydrated) and no
/// logout has happened since.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<BearerToken>,
    pub user: Option<UserProfile>,
    pub status: AuthStatus,
    pub error: Option<String>,
}

impl SliceState for Session {}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.status == AuthStatus::Loading {
            SessionPhase::Authenticating
        } else if self.token.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
