//! Admin domain model

use serde::{Deserialize, Serialize};

use super::position::AdminPosition;
use super::product::default_active;

/// Admin fields that are stored as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub admin_full_name: String,
    /// Natural key
    pub admin_username: String,
    #[serde(default)]
    pub admin_position: AdminPosition,
    #[serde(default = "default_active")]
    pub admin_is_active: bool,
}

/// An admin row without its credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub admin_id: i64,
    #[serde(flatten)]
    pub profile: AdminProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
    #[serde(flatten)]
    pub profile: AdminProfile,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdate {
    #[serde(flatten)]
    pub profile: AdminProfile,
    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminWithPassword {
    #[serde(flatten)]
    pub admin: Admin,
    pub admin_password: String,
}

impl AdminProfile {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.admin_username.trim().is_empty() {
            return Err("admin username cannot be empty");
        }
        if self.admin_username == "new_admin" {
            return Err("admin username new_admin is reserved");
        }
        if self.admin_full_name.trim().is_empty() {
            return Err("admin full name cannot be empty");
        }
        Ok(())
    }
}

impl Admin {
    pub fn username(&self) -> &str {
        &self.profile.admin_username
    }
}
