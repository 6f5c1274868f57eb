//! Canteen staff domain model

use serde::{Deserialize, Serialize};

use super::position::CanteenPosition;
use super::product::default_active;

/// Staff fields that are stored as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub staff_full_name: String,
    pub staff_contact_number: String,
    /// Natural key
    pub staff_username: String,
    pub staff_address: String,
    pub staff_position: CanteenPosition,
    #[serde(default = "default_active")]
    pub staff_is_active: bool,
}

/// A staff row without its credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub staff_id: i64,
    #[serde(flatten)]
    pub profile: StaffProfile,
}

/// Create payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    #[serde(flatten)]
    pub profile: StaffProfile,
    pub staff_password: String,
}

/// Update payload; the password is replaced only when present
#[derive(Debug, Clone, Deserialize)]
pub struct StaffUpdate {
    #[serde(flatten)]
    pub profile: StaffProfile,
    #[serde(default)]
    pub staff_password: Option<String>,
}

/// Keyed read result with the recovered password spliced in
#[derive(Debug, Clone, Serialize)]
pub struct StaffWithPassword {
    #[serde(flatten)]
    pub staff: Staff,
    pub staff_password: String,
}

impl StaffProfile {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.staff_username.trim().is_empty() {
            return Err("staff username cannot be empty");
        }
        if self.staff_username == "new_staff" {
            return Err("staff username new_staff is reserved");
        }
        if self.staff_full_name.trim().is_empty() {
            return Err("staff full name cannot be empty");
        }
        Ok(())
    }
}

impl Staff {
    pub fn username(&self) -> &str {
        &self.profile.staff_username
    }
}
