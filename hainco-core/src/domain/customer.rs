//! Customer domain model

use serde::{Deserialize, Serialize};

use super::product::default_active;

/// Customer fields that are stored as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_first_name: String,
    #[serde(default)]
    pub customer_middle_name: Option<String>,
    pub customer_last_name: String,
    /// Natural key
    pub customer_email: String,
    pub customer_contact_number: String,
    #[serde(default = "default_active")]
    pub customer_is_active: bool,
}

/// A customer row without its credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    #[serde(flatten)]
    pub profile: CustomerProfile,
    pub customer_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUpdate {
    #[serde(flatten)]
    pub profile: CustomerProfile,
    #[serde(default)]
    pub customer_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerWithPassword {
    #[serde(flatten)]
    pub customer: Customer,
    pub customer_password: String,
}

impl CustomerProfile {
    /// Normalize the email so lookups are case-insensitive
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.customer_email.trim();
        if email.is_empty() {
            return Err("customer email cannot be empty");
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err("customer email is not a valid address"),
        }
        if self.customer_first_name.trim().is_empty() || self.customer_last_name.trim().is_empty() {
            return Err("customer name cannot be empty");
        }
        Ok(())
    }
}

impl Customer {
    pub fn email(&self) -> &str {
        &self.profile.customer_email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> CustomerProfile {
        CustomerProfile {
            customer_first_name: "Juan".to_string(),
            customer_middle_name: None,
            customer_last_name: "Dela Cruz".to_string(),
            customer_email: email.to_string(),
            customer_contact_number: "09998887777".to_string(),
            customer_is_active: true,
        }
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(
            CustomerProfile::normalize_email("  Juan@Example.COM "),
            "juan@example.com"
        );
    }

    #[test]
    fn test_customer_validation() {
        assert!(profile("juan@example.com").validate().is_ok());
        assert!(profile("").validate().is_err());
        assert!(profile("not-an-email").validate().is_err());
        assert!(profile("@example.com").validate().is_err());
    }
}
