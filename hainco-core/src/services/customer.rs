//! Customer service - mobile app accounts keyed by email

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{
    CredentialCodec, Customer, CustomerProfile, CustomerUpdate, CustomerWithPassword, NewCustomer,
};
use crate::ports::RecordStore;

/// Service for customer operations
///
/// Emails are trimmed and lower-cased before they are stored or looked up.
pub struct CustomerService {
    store: Arc<dyn RecordStore>,
    codec: Arc<CredentialCodec>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn RecordStore>, codec: Arc<CredentialCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn list(&self) -> Result<Vec<Customer>> {
        let customers = self.store.list_customers().await?;
        if customers.is_empty() {
            return Err(Error::not_found("No customer records exist"));
        }
        Ok(customers)
    }

    pub async fn get(&self, email: &str) -> Result<CustomerWithPassword> {
        let email = CustomerProfile::normalize_email(email);
        let found = self
            .store
            .find_customer(&email)
            .await?
            .ok_or_else(|| Error::not_found("Account does not exist."))?;

        let customer_password = self.codec.recover_stored(&found.credential)?;
        Ok(CustomerWithPassword {
            customer: found.record,
            customer_password,
        })
    }

    pub async fn create(&self, mut payload: NewCustomer) -> Result<Customer> {
        payload.profile.validate().map_err(Error::validation)?;
        payload.profile.customer_email =
            CustomerProfile::normalize_email(&payload.profile.customer_email);

        if self
            .store
            .find_customer(&payload.profile.customer_email)
            .await?
            .is_some()
        {
            return Err(Error::conflict("Email is already taken"));
        }

        let credential = self.codec.protect(&payload.customer_password)?;
        let customer = self
            .store
            .insert_customer(&payload.profile, &credential)
            .await?;
        tracing::info!(customer_id = customer.customer_id, "customer created");
        Ok(customer)
    }

    pub async fn update(&self, current_email: &str, mut payload: CustomerUpdate) -> Result<Customer> {
        payload.profile.validate().map_err(Error::validation)?;
        payload.profile.customer_email =
            CustomerProfile::normalize_email(&payload.profile.customer_email);
        let current_email = CustomerProfile::normalize_email(current_email);

        let existing = self
            .store
            .find_customer(&current_email)
            .await?
            .ok_or_else(|| Error::not_found("Customer does not exist."))?;

        if payload.profile.customer_email != current_email {
            if let Some(other) = self
                .store
                .find_customer(&payload.profile.customer_email)
                .await?
            {
                if other.record.customer_id != existing.record.customer_id {
                    return Err(Error::conflict("Email is already taken"));
                }
            }
        }

        let credential = payload
            .customer_password
            .as_deref()
            .map(|secret| self.codec.protect(secret))
            .transpose()?;

        let customer = self
            .store
            .update_customer(&current_email, &payload.profile, credential.as_ref())
            .await?
            .ok_or_else(|| Error::not_found("Customer does not exist."))?;
        tracing::info!(
            customer_id = customer.customer_id,
            password_changed = credential.is_some(),
            "customer updated"
        );
        Ok(customer)
    }
}
