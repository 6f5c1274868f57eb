//! Staff service - canteen staff accounts with recoverable passwords

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{CredentialCodec, NewStaff, Staff, StaffUpdate, StaffWithPassword};
use crate::ports::RecordStore;

/// Service for staff operations
pub struct StaffService {
    store: Arc<dyn RecordStore>,
    codec: Arc<CredentialCodec>,
}

impl StaffService {
    pub fn new(store: Arc<dyn RecordStore>, codec: Arc<CredentialCodec>) -> Self {
        Self { store, codec }
    }

    /// All staff without credential fields
    pub async fn list(&self) -> Result<Vec<Staff>> {
        let staff = self.store.list_staff().await?;
        if staff.is_empty() {
            return Err(Error::not_found("No staff records exist"));
        }
        Ok(staff)
    }

    /// One staff member with the password recovered
    pub async fn get(&self, username: &str) -> Result<StaffWithPassword> {
        let found = self
            .store
            .find_staff(username)
            .await?
            .ok_or_else(|| Error::not_found("Username does not exist."))?;

        let staff_password = self.codec.recover_stored(&found.credential)?;
        Ok(StaffWithPassword {
            staff: found.record,
            staff_password,
        })
    }

    pub async fn create(&self, payload: NewStaff) -> Result<Staff> {
        payload.profile.validate().map_err(Error::validation)?;

        if self
            .store
            .find_staff(&payload.profile.staff_username)
            .await?
            .is_some()
        {
            return Err(Error::conflict("Username is already taken"));
        }

        let credential = self.codec.protect(&payload.staff_password)?;
        let staff = self.store.insert_staff(&payload.profile, &credential).await?;
        tracing::info!(staff_id = staff.staff_id, "staff created");
        Ok(staff)
    }

    /// Replace the profile; the stored credential changes only when a password is given
    pub async fn update(&self, current_username: &str, payload: StaffUpdate) -> Result<Staff> {
        payload.profile.validate().map_err(Error::validation)?;

        let existing = self
            .store
            .find_staff(current_username)
            .await?
            .ok_or_else(|| Error::not_found("Staff does not exist."))?;

        if payload.profile.staff_username != current_username {
            if let Some(other) = self.store.find_staff(&payload.profile.staff_username).await? {
                if other.record.staff_id != existing.record.staff_id {
                    return Err(Error::conflict("Username is already taken"));
                }
            }
        }

        let credential = payload
            .staff_password
            .as_deref()
            .map(|secret| self.codec.protect(secret))
            .transpose()?;

        let staff = self
            .store
            .update_staff(current_username, &payload.profile, credential.as_ref())
            .await?
            .ok_or_else(|| Error::not_found("Staff does not exist."))?;
        tracing::info!(
            staff_id = staff.staff_id,
            password_changed = credential.is_some(),
            "staff updated"
        );
        Ok(staff)
    }
}
