//! DuckDB record store implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use duckdb::types::Type;
use duckdb::{params, Connection, OptionalExt};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Admin, AdminPosition, AdminProfile, CanteenPosition, Credentialed, Customer, CustomerProfile,
    NewTransaction, Product, ProductInput, Staff, StaffProfile, StoredCredential, TableRowCount,
    Transaction, TransactionType,
};
use crate::ports::RecordStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Resource tables in row-count order
pub const RESOURCE_TABLES: [&str; 5] = [
    "hainco_product",
    "hainco_staff",
    "hainco_customer",
    "hainco_admin",
    "hainco_transaction",
];

const PRODUCT_COLUMNS: &str = "product_id, product_name, product_price::VARCHAR, \
    product_image_link, product_stock, product_description, product_type, \
    product_is_active, product_code";

const STAFF_COLUMNS: &str = "staff_id, staff_full_name, staff_contact_number, staff_username, \
    staff_address, staff_position, staff_is_active";

const CUSTOMER_COLUMNS: &str = "customer_id, customer_first_name, customer_middle_name, \
    customer_last_name, customer_email, customer_contact_number, customer_is_active";

const ADMIN_COLUMNS: &str =
    "admin_id, admin_full_name, admin_username, admin_position, admin_is_active";

const TRANSACTION_COLUMNS: &str = "transaction_id, transaction_agent, transaction_description, \
    transaction_type, transaction_amount::VARCHAR, transaction_date::VARCHAR";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

fn is_unique_violation(err: &duckdb::Error) -> bool {
    let msg = err.to_string();
    msg.contains("Duplicate key") || msg.contains("violates unique constraint")
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::database(err.to_string())
    }
}

/// Map a write failure, turning natural-key collisions into a conflict
fn write_error(err: duckdb::Error, conflict_detail: &str) -> Error {
    if is_unique_violation(&err) {
        Error::conflict(conflict_detail)
    } else {
        Error::from(err)
    }
}

/// DuckDB-backed [`RecordStore`]
///
/// All access goes through a single connection guarded by a mutex.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when another process still holds the file (for example a
    /// previous server instance that is shutting down).
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            "database busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(Error::from).unwrap_or_else(|| {
            Error::database(format!(
                "Failed to open database after {} retries",
                MAX_RETRIES
            ))
        }))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> std::result::Result<Connection, duckdb::Error> {
        // Extension autoloading stays off; nothing here needs it
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Names of migrations not yet applied
    pub fn pending_migrations(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        MigrationService::new(&conn).get_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::info!(applied = result.applied.len(), "database schema upgraded");
        }
        Ok(())
    }

    // === Products ===

    fn list_products_blocking(&self) -> Result<Vec<Product>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hainco_product ORDER BY product_id",
            PRODUCT_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_product)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn find_product_blocking(&self, product_code: &str) -> Result<Option<Product>> {
        let conn = self.conn()?;
        let product = conn
            .query_row(
                &format!(
                    "SELECT {} FROM hainco_product WHERE product_code = ?",
                    PRODUCT_COLUMNS
                ),
                [product_code],
                row_to_product,
            )
            .optional()?;
        Ok(product)
    }

    fn insert_product_blocking(&self, product: &ProductInput) -> Result<Product> {
        let conn = self.conn()?;
        let product_id: i64 = conn
            .query_row(
                "INSERT INTO hainco_product (
                    product_name, product_price, product_image_link, product_stock,
                    product_description, product_type, product_is_active, product_code
                ) VALUES (?, CAST(? AS DECIMAL(12, 2)), ?, ?, ?, ?, ?, ?)
                RETURNING product_id",
                params![
                    product.product_name,
                    product.product_price.to_string(),
                    product.product_image_link,
                    product.product_stock,
                    product.product_description,
                    product.product_type,
                    product.product_is_active,
                    product.product_code,
                ],
                |row| row.get(0),
            )
            .map_err(|e| write_error(e, "Product code is already taken"))?;

        fetch_by_id(&conn, "hainco_product", PRODUCT_COLUMNS, "product_id", product_id, row_to_product)
    }

    fn update_product_blocking(
        &self,
        current_code: &str,
        product: &ProductInput,
    ) -> Result<Option<Product>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(product_id) = id_for_key(
            &tx,
            "SELECT product_id FROM hainco_product WHERE product_code = ?",
            current_code,
        )?
        else {
            return Ok(None);
        };

        if product.product_code != current_code {
            tx.execute(
                "UPDATE hainco_product SET product_code = ? WHERE product_id = ?",
                params![product.product_code, product_id],
            )
            .map_err(|e| write_error(e, "Product code is already taken"))?;
        }

        tx.execute(
            "UPDATE hainco_product SET
                product_name = ?, product_price = CAST(? AS DECIMAL(12, 2)),
                product_image_link = ?, product_stock = ?, product_description = ?,
                product_type = ?, product_is_active = ?
             WHERE product_id = ?",
            params![
                product.product_name,
                product.product_price.to_string(),
                product.product_image_link,
                product.product_stock,
                product.product_description,
                product.product_type,
                product.product_is_active,
                product_id,
            ],
        )?;

        let updated =
            fetch_by_id(&tx, "hainco_product", PRODUCT_COLUMNS, "product_id", product_id, row_to_product)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    // === Staff ===

    fn list_staff_blocking(&self) -> Result<Vec<Staff>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hainco_staff ORDER BY staff_id",
            STAFF_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_staff)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn find_staff_blocking(&self, username: &str) -> Result<Option<Credentialed<Staff>>> {
        let conn = self.conn()?;
        let staff = conn
            .query_row(
                &format!(
                    "SELECT {}, staff_password_hash, staff_password_salt
                     FROM hainco_staff WHERE staff_username = ?",
                    STAFF_COLUMNS
                ),
                [username],
                |row| with_credential(row, row_to_staff, 7),
            )
            .optional()?;
        Ok(staff)
    }

    fn insert_staff_blocking(
        &self,
        profile: &StaffProfile,
        credential: &StoredCredential,
    ) -> Result<Staff> {
        let conn = self.conn()?;
        let staff_id: i64 = conn
            .query_row(
                "INSERT INTO hainco_staff (
                    staff_full_name, staff_contact_number, staff_username, staff_address,
                    staff_password_hash, staff_password_salt, staff_position, staff_is_active
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING staff_id",
                params![
                    profile.staff_full_name,
                    profile.staff_contact_number,
                    profile.staff_username,
                    profile.staff_address,
                    credential.stored_value,
                    credential.salt,
                    profile.staff_position.code(),
                    profile.staff_is_active,
                ],
                |row| row.get(0),
            )
            .map_err(|e| write_error(e, "Username is already taken"))?;

        fetch_by_id(&conn, "hainco_staff", STAFF_COLUMNS, "staff_id", staff_id, row_to_staff)
    }

    fn update_staff_blocking(
        &self,
        current_username: &str,
        profile: &StaffProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Staff>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(staff_id) = id_for_key(
            &tx,
            "SELECT staff_id FROM hainco_staff WHERE staff_username = ?",
            current_username,
        )?
        else {
            return Ok(None);
        };

        if profile.staff_username != current_username {
            tx.execute(
                "UPDATE hainco_staff SET staff_username = ? WHERE staff_id = ?",
                params![profile.staff_username, staff_id],
            )
            .map_err(|e| write_error(e, "Username is already taken"))?;
        }

        tx.execute(
            "UPDATE hainco_staff SET
                staff_full_name = ?, staff_contact_number = ?, staff_address = ?,
                staff_position = ?, staff_is_active = ?,
                staff_password_hash = COALESCE(?, staff_password_hash),
                staff_password_salt = COALESCE(?, staff_password_salt)
             WHERE staff_id = ?",
            params![
                profile.staff_full_name,
                profile.staff_contact_number,
                profile.staff_address,
                profile.staff_position.code(),
                profile.staff_is_active,
                credential.map(|c| &c.stored_value),
                credential.map(|c| &c.salt),
                staff_id,
            ],
        )?;

        let updated = fetch_by_id(&tx, "hainco_staff", STAFF_COLUMNS, "staff_id", staff_id, row_to_staff)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    // === Customers ===

    fn list_customers_blocking(&self) -> Result<Vec<Customer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hainco_customer ORDER BY customer_id",
            CUSTOMER_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_customer)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn find_customer_blocking(&self, email: &str) -> Result<Option<Credentialed<Customer>>> {
        let conn = self.conn()?;
        let customer = conn
            .query_row(
                &format!(
                    "SELECT {}, customer_password_hash, customer_password_salt
                     FROM hainco_customer WHERE customer_email = ?",
                    CUSTOMER_COLUMNS
                ),
                [email],
                |row| with_credential(row, row_to_customer, 7),
            )
            .optional()?;
        Ok(customer)
    }

    fn insert_customer_blocking(
        &self,
        profile: &CustomerProfile,
        credential: &StoredCredential,
    ) -> Result<Customer> {
        let conn = self.conn()?;
        let customer_id: i64 = conn
            .query_row(
                "INSERT INTO hainco_customer (
                    customer_first_name, customer_middle_name, customer_last_name,
                    customer_email, customer_password_hash, customer_password_salt,
                    customer_contact_number, customer_is_active
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING customer_id",
                params![
                    profile.customer_first_name,
                    profile.customer_middle_name,
                    profile.customer_last_name,
                    profile.customer_email,
                    credential.stored_value,
                    credential.salt,
                    profile.customer_contact_number,
                    profile.customer_is_active,
                ],
                |row| row.get(0),
            )
            .map_err(|e| write_error(e, "Email is already taken"))?;

        fetch_by_id(&conn, "hainco_customer", CUSTOMER_COLUMNS, "customer_id", customer_id, row_to_customer)
    }

    fn update_customer_blocking(
        &self,
        current_email: &str,
        profile: &CustomerProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Customer>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(customer_id) = id_for_key(
            &tx,
            "SELECT customer_id FROM hainco_customer WHERE customer_email = ?",
            current_email,
        )?
        else {
            return Ok(None);
        };

        if profile.customer_email != current_email {
            tx.execute(
                "UPDATE hainco_customer SET customer_email = ? WHERE customer_id = ?",
                params![profile.customer_email, customer_id],
            )
            .map_err(|e| write_error(e, "Email is already taken"))?;
        }

        tx.execute(
            "UPDATE hainco_customer SET
                customer_first_name = ?, customer_middle_name = ?, customer_last_name = ?,
                customer_contact_number = ?, customer_is_active = ?,
                customer_password_hash = COALESCE(?, customer_password_hash),
                customer_password_salt = COALESCE(?, customer_password_salt)
             WHERE customer_id = ?",
            params![
                profile.customer_first_name,
                profile.customer_middle_name,
                profile.customer_last_name,
                profile.customer_contact_number,
                profile.customer_is_active,
                credential.map(|c| &c.stored_value),
                credential.map(|c| &c.salt),
                customer_id,
            ],
        )?;

        let updated = fetch_by_id(&tx, "hainco_customer", CUSTOMER_COLUMNS, "customer_id", customer_id, row_to_customer)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    // === Admins ===

    fn list_admins_blocking(&self) -> Result<Vec<Admin>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hainco_admin ORDER BY admin_id",
            ADMIN_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_admin)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn find_admin_blocking(&self, username: &str) -> Result<Option<Credentialed<Admin>>> {
        let conn = self.conn()?;
        let admin = conn
            .query_row(
                &format!(
                    "SELECT {}, admin_password_hash, admin_password_salt
                     FROM hainco_admin WHERE admin_username = ?",
                    ADMIN_COLUMNS
                ),
                [username],
                |row| with_credential(row, row_to_admin, 5),
            )
            .optional()?;
        Ok(admin)
    }

    fn insert_admin_blocking(
        &self,
        profile: &AdminProfile,
        credential: &StoredCredential,
    ) -> Result<Admin> {
        let conn = self.conn()?;
        let admin_id: i64 = conn
            .query_row(
                "INSERT INTO hainco_admin (
                    admin_full_name, admin_username, admin_password_hash,
                    admin_password_salt, admin_position, admin_is_active
                ) VALUES (?, ?, ?, ?, ?, ?)
                RETURNING admin_id",
                params![
                    profile.admin_full_name,
                    profile.admin_username,
                    credential.stored_value,
                    credential.salt,
                    profile.admin_position.code(),
                    profile.admin_is_active,
                ],
                |row| row.get(0),
            )
            .map_err(|e| write_error(e, "Username is already taken"))?;

        fetch_by_id(&conn, "hainco_admin", ADMIN_COLUMNS, "admin_id", admin_id, row_to_admin)
    }

    fn update_admin_blocking(
        &self,
        current_username: &str,
        profile: &AdminProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Admin>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(admin_id) = id_for_key(
            &tx,
            "SELECT admin_id FROM hainco_admin WHERE admin_username = ?",
            current_username,
        )?
        else {
            return Ok(None);
        };

        if profile.admin_username != current_username {
            tx.execute(
                "UPDATE hainco_admin SET admin_username = ? WHERE admin_id = ?",
                params![profile.admin_username, admin_id],
            )
            .map_err(|e| write_error(e, "Username is already taken"))?;
        }

        tx.execute(
            "UPDATE hainco_admin SET admin_full_name = ?, admin_position = ?, admin_is_active = ?,
                admin_password_hash = COALESCE(?, admin_password_hash),
                admin_password_salt = COALESCE(?, admin_password_salt)
             WHERE admin_id = ?",
            params![
                profile.admin_full_name,
                profile.admin_position.code(),
                profile.admin_is_active,
                credential.map(|c| &c.stored_value),
                credential.map(|c| &c.salt),
                admin_id,
            ],
        )?;

        let updated = fetch_by_id(&tx, "hainco_admin", ADMIN_COLUMNS, "admin_id", admin_id, row_to_admin)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    // === Transactions ===

    fn list_transactions_blocking(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hainco_transaction ORDER BY transaction_id",
            TRANSACTION_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn insert_transaction_blocking(&self, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;
        let transaction_id: i64 = conn.query_row(
            "INSERT INTO hainco_transaction (
                transaction_agent, transaction_description, transaction_type,
                transaction_amount, transaction_date
            ) VALUES (?, ?, ?, CAST(? AS DECIMAL(12, 2)), CAST(? AS TIMESTAMP))
            RETURNING transaction_id",
            params![
                tx.transaction_agent,
                tx.transaction_description,
                tx.transaction_type.code(),
                tx.transaction_amount.to_string(),
                tx.transaction_date.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ],
            |row| row.get(0),
        )?;

        fetch_by_id(
            &conn,
            "hainco_transaction",
            TRANSACTION_COLUMNS,
            "transaction_id",
            transaction_id,
            row_to_transaction,
        )
    }

    // === Diagnostics ===

    fn count_rows_blocking(&self) -> Result<Vec<TableRowCount>> {
        let conn = self.conn()?;
        RESOURCE_TABLES
            .iter()
            .map(|table| -> Result<TableRowCount> {
                // Table names are compile-time constants
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
                Ok(TableRowCount::new(*table, count))
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for DuckDbRepository {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.list_products_blocking()
    }

    async fn find_product(&self, product_code: &str) -> Result<Option<Product>> {
        self.find_product_blocking(product_code)
    }

    async fn insert_product(&self, product: &ProductInput) -> Result<Product> {
        self.insert_product_blocking(product)
    }

    async fn update_product(
        &self,
        current_code: &str,
        product: &ProductInput,
    ) -> Result<Option<Product>> {
        self.update_product_blocking(current_code, product)
    }

    async fn list_staff(&self) -> Result<Vec<Staff>> {
        self.list_staff_blocking()
    }

    async fn find_staff(&self, username: &str) -> Result<Option<Credentialed<Staff>>> {
        self.find_staff_blocking(username)
    }

    async fn insert_staff(
        &self,
        profile: &StaffProfile,
        credential: &StoredCredential,
    ) -> Result<Staff> {
        self.insert_staff_blocking(profile, credential)
    }

    async fn update_staff(
        &self,
        current_username: &str,
        profile: &StaffProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Staff>> {
        self.update_staff_blocking(current_username, profile, credential)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.list_customers_blocking()
    }

    async fn find_customer(&self, email: &str) -> Result<Option<Credentialed<Customer>>> {
        self.find_customer_blocking(email)
    }

    async fn insert_customer(
        &self,
        profile: &CustomerProfile,
        credential: &StoredCredential,
    ) -> Result<Customer> {
        self.insert_customer_blocking(profile, credential)
    }

    async fn update_customer(
        &self,
        current_email: &str,
        profile: &CustomerProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Customer>> {
        self.update_customer_blocking(current_email, profile, credential)
    }

    async fn list_admins(&self) -> Result<Vec<Admin>> {
        self.list_admins_blocking()
    }

    async fn find_admin(&self, username: &str) -> Result<Option<Credentialed<Admin>>> {
        self.find_admin_blocking(username)
    }

    async fn insert_admin(
        &self,
        profile: &AdminProfile,
        credential: &StoredCredential,
    ) -> Result<Admin> {
        self.insert_admin_blocking(profile, credential)
    }

    async fn update_admin(
        &self,
        current_username: &str,
        profile: &AdminProfile,
        credential: Option<&StoredCredential>,
    ) -> Result<Option<Admin>> {
        self.update_admin_blocking(current_username, profile, credential)
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.list_transactions_blocking()
    }

    async fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        self.insert_transaction_blocking(tx)
    }

    async fn count_rows(&self) -> Result<Vec<TableRowCount>> {
        self.count_rows_blocking()
    }
}

// Helper functions

fn id_for_key(conn: &Connection, sql: &str, key: &str) -> Result<Option<i64>> {
    Ok(conn.query_row(sql, [key], |row| row.get(0)).optional()?)
}

fn fetch_by_id<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id_column: &str,
    id: i64,
    map: fn(&duckdb::Row<'_>) -> duckdb::Result<T>,
) -> Result<T> {
    let sql = format!("SELECT {} FROM {} WHERE {} = ?", columns, table, id_column);
    Ok(conn.query_row(&sql, [id], map)?)
}

fn with_credential<T>(
    row: &duckdb::Row<'_>,
    map: fn(&duckdb::Row<'_>) -> duckdb::Result<T>,
    credential_idx: usize,
) -> duckdb::Result<Credentialed<T>> {
    Ok(Credentialed {
        record: map(row)?,
        credential: StoredCredential {
            stored_value: row.get(credential_idx)?,
            salt: row.get(credential_idx + 1)?,
        },
    })
}

fn row_to_product(row: &duckdb::Row<'_>) -> duckdb::Result<Product> {
    Ok(Product {
        product_id: row.get(0)?,
        details: ProductInput {
            product_name: row.get(1)?,
            product_price: parse_decimal(row, 2)?,
            product_image_link: row.get(3)?,
            product_stock: row.get(4)?,
            product_description: row.get(5)?,
            product_type: row.get(6)?,
            product_is_active: row.get(7)?,
            product_code: row.get(8)?,
        },
    })
}

fn row_to_staff(row: &duckdb::Row<'_>) -> duckdb::Result<Staff> {
    Ok(Staff {
        staff_id: row.get(0)?,
        profile: StaffProfile {
            staff_full_name: row.get(1)?,
            staff_contact_number: row.get(2)?,
            staff_username: row.get(3)?,
            staff_address: row.get(4)?,
            staff_position: parse_code::<CanteenPosition>(row, 5)?,
            staff_is_active: row.get(6)?,
        },
    })
}

fn row_to_customer(row: &duckdb::Row<'_>) -> duckdb::Result<Customer> {
    Ok(Customer {
        customer_id: row.get(0)?,
        profile: CustomerProfile {
            customer_first_name: row.get(1)?,
            customer_middle_name: row.get(2)?,
            customer_last_name: row.get(3)?,
            customer_email: row.get(4)?,
            customer_contact_number: row.get(5)?,
            customer_is_active: row.get(6)?,
        },
    })
}

fn row_to_admin(row: &duckdb::Row<'_>) -> duckdb::Result<Admin> {
    Ok(Admin {
        admin_id: row.get(0)?,
        profile: AdminProfile {
            admin_full_name: row.get(1)?,
            admin_username: row.get(2)?,
            admin_position: parse_code::<AdminPosition>(row, 3)?,
            admin_is_active: row.get(4)?,
        },
    })
}

fn row_to_transaction(row: &duckdb::Row<'_>) -> duckdb::Result<Transaction> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        entry: NewTransaction {
            transaction_agent: row.get(1)?,
            transaction_description: row.get(2)?,
            transaction_type: parse_code::<TransactionType>(row, 3)?,
            transaction_amount: parse_decimal(row, 4)?,
            transaction_date: parse_naive_datetime(row, 5)?,
        },
    })
}

fn parse_code<T>(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<T>
where
    T: TryFrom<i64>,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let code: i64 = row.get(idx)?;
    T::try_from(code)
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::BigInt, Box::new(e)))
}

/// DECIMAL columns are selected as VARCHAR
fn parse_decimal(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s)
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// TIMESTAMP columns are selected as VARCHAR
fn parse_naive_datetime(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CredentialCodec;
    use chrono::NaiveDate;

    fn test_repo() -> DuckDbRepository {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn product(code: &str) -> ProductInput {
        ProductInput {
            product_name: "Pancit Canton".to_string(),
            product_price: Decimal::new(4550, 2),
            product_image_link: Some("https://cdn.example.com/pancit.png".to_string()),
            product_stock: 20,
            product_description: None,
            product_type: "noodles".to_string(),
            product_is_active: true,
            product_code: code.to_string(),
        }
    }

    fn staff(username: &str) -> StaffProfile {
        StaffProfile {
            staff_full_name: "Maria Santos".to_string(),
            staff_contact_number: "09171234567".to_string(),
            staff_username: username.to_string(),
            staff_address: "Quezon City".to_string(),
            staff_position: CanteenPosition::Cashier,
            staff_is_active: true,
        }
    }

    // ========================================================================
    // Retry classification
    // ========================================================================

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(is_retryable_error("The process cannot access the file because it is being used by another process"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }

    // ========================================================================
    // Products
    // ========================================================================

    #[test]
    fn test_insert_and_find_product() {
        let repo = test_repo();
        let inserted = repo.insert_product_blocking(&product("NOOD-1")).unwrap();

        assert_eq!(inserted.product_id, 1);
        let found = repo.find_product_blocking("NOOD-1").unwrap().unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.details.product_price, Decimal::new(4550, 2));
        assert!(repo.find_product_blocking("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_product_code_is_conflict() {
        let repo = test_repo();
        repo.insert_product_blocking(&product("NOOD-1")).unwrap();

        let err = repo.insert_product_blocking(&product("NOOD-1")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_update_product_keeps_and_renames_code() {
        let repo = test_repo();
        repo.insert_product_blocking(&product("NOOD-1")).unwrap();

        let mut changed = product("NOOD-1");
        changed.product_stock = 3;
        let updated = repo.update_product_blocking("NOOD-1", &changed).unwrap().unwrap();
        assert_eq!(updated.details.product_stock, 3);

        let renamed = repo
            .update_product_blocking("NOOD-1", &product("NOOD-2"))
            .unwrap()
            .unwrap();
        assert_eq!(renamed.code(), "NOOD-2");
        assert!(repo.find_product_blocking("NOOD-1").unwrap().is_none());
    }

    #[test]
    fn test_failed_update_rolls_back_rename() {
        let repo = test_repo();
        repo.insert_product_blocking(&product("NOOD-1")).unwrap();

        let mut changed = product("NOOD-2");
        changed.product_price = Decimal::new(1_000_000_000_000, 0);
        assert!(repo.update_product_blocking("NOOD-1", &changed).is_err());

        let kept = repo.find_product_blocking("NOOD-1").unwrap().unwrap();
        assert_eq!(kept.details.product_price, Decimal::new(4550, 2));
        assert!(repo.find_product_blocking("NOOD-2").unwrap().is_none());
    }

    #[test]
    fn test_update_missing_product_returns_none() {
        let repo = test_repo();
        assert!(repo
            .update_product_blocking("ghost", &product("ghost"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_hostile_key_is_bound_not_interpolated() {
        let repo = test_repo();
        repo.insert_product_blocking(&product("NOOD-1")).unwrap();

        let found = repo
            .find_product_blocking("' OR '1'='1")
            .unwrap();
        assert!(found.is_none());
        assert_eq!(repo.list_products_blocking().unwrap().len(), 1);
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    #[test]
    fn test_staff_credential_round_trips_through_blob_columns() {
        let repo = test_repo();
        let codec = CredentialCodec::new(b"repo-test");
        let credential = codec.protect("hunter2").unwrap();

        repo.insert_staff_blocking(&staff("msantos"), &credential).unwrap();
        let found = repo.find_staff_blocking("msantos").unwrap().unwrap();

        assert_eq!(found.credential, credential);
        assert_eq!(codec.recover_stored(&found.credential).unwrap(), "hunter2");
        assert_eq!(found.record.profile.staff_position, CanteenPosition::Cashier);
    }

    #[test]
    fn test_update_staff_without_credential_keeps_salt() {
        let repo = test_repo();
        let codec = CredentialCodec::new(b"repo-test");
        let credential = codec.protect("hunter2").unwrap();
        repo.insert_staff_blocking(&staff("msantos"), &credential).unwrap();

        let mut profile = staff("msantos");
        profile.staff_is_active = false;
        repo.update_staff_blocking("msantos", &profile, None).unwrap().unwrap();

        let found = repo.find_staff_blocking("msantos").unwrap().unwrap();
        assert_eq!(found.credential.salt, credential.salt);
        assert!(!found.record.profile.staff_is_active);
    }

    #[test]
    fn test_update_staff_replaces_credential_with_rename() {
        let repo = test_repo();
        let codec = CredentialCodec::new(b"repo-test");
        repo.insert_staff_blocking(&staff("msantos"), &codec.protect("hunter2").unwrap())
            .unwrap();

        let replacement = codec.protect("letmein").unwrap();
        repo.update_staff_blocking("msantos", &staff("mdelacruz"), Some(&replacement))
            .unwrap()
            .unwrap();

        assert!(repo.find_staff_blocking("msantos").unwrap().is_none());
        let found = repo.find_staff_blocking("mdelacruz").unwrap().unwrap();
        assert_eq!(found.credential, replacement);
        assert_eq!(codec.recover_stored(&found.credential).unwrap(), "letmein");
    }

    #[test]
    fn test_staff_rename_onto_existing_username_is_conflict() {
        let repo = test_repo();
        let codec = CredentialCodec::new(b"repo-test");
        repo.insert_staff_blocking(&staff("first"), &codec.protect("a").unwrap()).unwrap();
        repo.insert_staff_blocking(&staff("second"), &codec.protect("b").unwrap()).unwrap();

        let err = repo
            .update_staff_blocking("second", &staff("first"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    // ========================================================================
    // Transactions and counts
    // ========================================================================

    #[test]
    fn test_insert_transaction_and_count_rows() {
        let repo = test_repo();
        let date = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(8, 15, 30)
            .unwrap();
        let tx = repo
            .insert_transaction_blocking(&NewTransaction {
                transaction_agent: "msantos".to_string(),
                transaction_description: Some("2x Pancit".to_string()),
                transaction_type: TransactionType::Order,
                transaction_amount: Decimal::new(9100, 2),
                transaction_date: date,
            })
            .unwrap();

        assert_eq!(tx.entry.transaction_date, date);
        assert_eq!(tx.entry.transaction_amount, Decimal::new(9100, 2));

        let counts = repo.count_rows_blocking().unwrap();
        let names: Vec<&str> = counts.iter().map(|c| c.table_name()).collect();
        assert_eq!(names, RESOURCE_TABLES.to_vec());
        assert_eq!(counts[4].row_count(), 1);
        assert_eq!(counts[0].row_count(), 0);
    }
}
