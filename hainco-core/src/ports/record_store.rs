//! Record store port - database abstraction

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{
    Admin, AdminProfile, Credentialed, Customer, CustomerProfile, NewTransaction, Product,
    ProductInput, Staff, StaffProfile, StoredCredential, TableRowCount, Transaction,
};

/// Storage abstraction for the five canteen resources
///
/// Implementations bind every caller-supplied value as a query parameter.
/// Natural-key collisions surface as [`Error::Conflict`](crate::Error::Conflict).
/// `update_*` methods return `Ok(None)` when the current key does not exist.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // === Products ===

    /// All products ordered by id
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn find_product(&self, product_code: &str) -> Result<Option<Product>>;

    async fn insert_product(&self, product: &ProductInput) -> Result<Product>;

    async fn update_product(
        &self,
        current_code: &str,
        product: &ProductInput,
    ) -> Result<Option<Product>>;

    // === Staff ===

    async fn list_staff(&self) -> Result<Vec<Staff>>;

    async fn find_staff(&self, username: &str) -> Result<Option<Credentialed<Staff>>>;

    async fn insert_staff(
        &self,
        profile: &StaffProfile,
        credential: &StoredCredential,
    ) -> Result<Staff>;

    /// Replace profile fields, and the credential when one is given
    async fn update_staff(
        &self,
        current_username: &str,
        profile: &StaffProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Staff>>;

    // === Customers ===

    async fn list_customers(&self) -> Result<Vec<Customer>>;

    async fn find_customer(&self, email: &str) -> Result<Option<Credentialed<Customer>>>;

    async fn insert_customer(
        &self,
        profile: &CustomerProfile,
        credential: &StoredCredential,
    ) -> Result<Customer>;

    async fn update_customer(
        &self,
        current_email: &str,
        profile: &CustomerProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Customer>>;

    // === Admins ===

    async fn list_admins(&self) -> Result<Vec<Admin>>;

    async fn find_admin(&self, username: &str) -> Result<Option<Credentialed<Admin>>>;

    async fn insert_admin(
        &self,
        profile: &AdminProfile,
        credential: &StoredCredential,
    ) -> Result<Admin>;

    async fn update_admin(
        &self,
        current_username: &str,
        profile: &AdminProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Admin>>;

    // === Transactions ===

    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    async fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    // === Diagnostics ===

    /// Row counts in the order product, staff, customer, admin, transaction
    async fn count_rows(&self) -> Result<Vec<TableRowCount>>;
}
