//! Admin service - back-office accounts

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Admin, AdminUpdate, AdminWithPassword, CredentialCodec, NewAdmin};
use crate::ports::RecordStore;

/// Service for admin operations
pub struct AdminService {
    store: Arc<dyn RecordStore>,
    codec: Arc<CredentialCodec>,
}

impl AdminService {
    pub fn new(store: Arc<dyn RecordStore>, codec: Arc<CredentialCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        let admins = self.store.list_admins().await?;
        if admins.is_empty() {
            return Err(Error::not_found("No admin records found"));
        }
        Ok(admins)
    }

    pub async fn get(&self, username: &str) -> Result<AdminWithPassword> {
        let found = self
            .store
            .find_admin(username)
            .await?
            .ok_or_else(|| Error::not_found("Admin does not exist."))?;

        let admin_password = self.codec.recover_stored(&found.credential)?;
        Ok(AdminWithPassword {
            admin: found.record,
            admin_password,
        })
    }

    pub async fn create(&self, payload: NewAdmin) -> Result<Admin> {
        payload.profile.validate().map_err(Error::validation)?;

        if self
            .store
            .find_admin(&payload.profile.admin_username)
            .await?
            .is_some()
        {
            return Err(Error::conflict("Username is already taken"));
        }

        let credential = self.codec.protect(&payload.admin_password)?;
        let admin = self.store.insert_admin(&payload.profile, &credential).await?;
        tracing::info!(admin_id = admin.admin_id, "admin created");
        Ok(admin)
    }

    pub async fn update(&self, current_username: &str, payload: AdminUpdate) -> Result<Admin> {
        payload.profile.validate().map_err(Error::validation)?;

        let existing = self
            .store
            .find_admin(current_username)
            .await?
            .ok_or_else(|| Error::not_found("Admin does not exist."))?;

        if payload.profile.admin_username != current_username {
            if let Some(other) = self.store.find_admin(&payload.profile.admin_username).await? {
                if other.record.admin_id != existing.record.admin_id {
                    return Err(Error::conflict("Username is already taken"));
                }
            }
        }

        let credential = payload
            .admin_password
            .as_deref()
            .map(|secret| self.codec.protect(secret))
            .transpose()?;

        let admin = self
            .store
            .update_admin(current_username, &payload.profile, credential.as_ref())
            .await?
            .ok_or_else(|| Error::not_found("Admin does not exist."))?;
        tracing::info!(
            admin_id = admin.admin_id,
            password_changed = credential.is_some(),
            "admin updated"
        );
        Ok(admin)
    }
}
