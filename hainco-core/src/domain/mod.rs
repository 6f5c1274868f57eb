//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod admin;
pub mod credential;
mod customer;
mod meta;
pub mod position;
mod product;
pub mod result;
mod staff;
mod transaction;

pub use admin::{Admin, AdminProfile, AdminUpdate, AdminWithPassword, NewAdmin};
pub use credential::{CodecError, CredentialCodec, DecodingFault, StoredCredential};
pub use customer::{Customer, CustomerProfile, CustomerUpdate, CustomerWithPassword, NewCustomer};
pub use meta::TableRowCount;
pub use position::{AdminPosition, CanteenPosition, TransactionType};
pub use product::{Product, ProductInput};
pub use staff::{NewStaff, Staff, StaffProfile, StaffUpdate, StaffWithPassword};
pub use transaction::{NewTransaction, Transaction};

/// A stored record together with its protected password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentialed<T> {
    pub record: T,
    pub credential: StoredCredential,
}
