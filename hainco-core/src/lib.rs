//! Hain.co Core - business logic for the canteen backend
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Product, Staff, Customer, Admin, Transaction)
//!   and the reversible credential codec
//! - **ports**: Trait definitions for external dependencies (RecordStore)
//! - **services**: Business logic orchestration, one service per resource
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::RecordStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Admin, CodecError, CredentialCodec, Customer, NewTransaction, Product, Staff,
    StoredCredential, TableRowCount, Transaction,
};
pub use services::{EntryPoint, LogEntry, LogEvent, LoggingService};

/// Main context for Hain.co operations
///
/// Holds the configuration, the shared record store and codec, and one
/// service per resource. Every service receives the same store handle.
pub struct HaincoContext {
    pub config: Config,
    pub data_dir: Option<PathBuf>,
    pub store: Arc<dyn RecordStore>,
    pub codec: Arc<CredentialCodec>,
    pub product_service: ProductService,
    pub staff_service: StaffService,
    pub customer_service: CustomerService,
    pub admin_service: AdminService,
    pub transaction_service: TransactionService,
    pub meta_service: MetaService,
}

impl HaincoContext {
    /// Open the database in `data_dir`, run migrations and build services
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(data_dir, config)
    }

    /// Same as [`new`](Self::new) with an already resolved configuration
    pub fn with_config(data_dir: &Path, config: Config) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join(&config.database_file);
        let repository = DuckDbRepository::new(&db_path)?;
        repository.ensure_schema()?;

        let key = config.credential_key_bytes(data_dir)?;
        let codec = Arc::new(CredentialCodec::new(&key));

        let mut context = Self::with_store(config, Arc::new(repository), codec);
        context.data_dir = Some(data_dir.to_path_buf());
        Ok(context)
    }

    /// Build a context over an existing store
    pub fn with_store(
        config: Config,
        store: Arc<dyn RecordStore>,
        codec: Arc<CredentialCodec>,
    ) -> Self {
        Self {
            product_service: ProductService::new(Arc::clone(&store)),
            staff_service: StaffService::new(Arc::clone(&store), Arc::clone(&codec)),
            customer_service: CustomerService::new(Arc::clone(&store), Arc::clone(&codec)),
            admin_service: AdminService::new(Arc::clone(&store), Arc::clone(&codec)),
            transaction_service: TransactionService::new(Arc::clone(&store)),
            meta_service: MetaService::new(Arc::clone(&store)),
            config,
            data_dir: None,
            store,
            codec,
        }
    }

    /// In-memory context for tests and demos
    pub fn in_memory(server_key: &[u8]) -> Result<Self> {
        let repository = DuckDbRepository::open_in_memory()?;
        repository.ensure_schema()?;
        Ok(Self::with_store(
            Config::default(),
            Arc::new(repository),
            Arc::new(CredentialCodec::new(server_key)),
        ))
    }
}
