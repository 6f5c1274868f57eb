//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each resource
//! has its own service; all of them share one injected record store.

mod admin;
mod customer;
pub mod logging;
mod meta;
pub mod migration;
mod product;
mod staff;
mod transaction;

pub use admin::AdminService;
pub use customer::CustomerService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use meta::MetaService;
pub use migration::{MigrationResult, MigrationService};
pub use product::ProductService;
pub use staff::StaffService;
pub use transaction::TransactionService;
